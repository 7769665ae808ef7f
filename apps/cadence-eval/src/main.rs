// crates.io
use clap::Parser;
// self
use cadence_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	cadence_eval::run(args)
}
