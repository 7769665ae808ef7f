use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use cadence_config::Interpreter;
use cadence_domain::{CommandInterpreter, Intent, IntentKind};

#[derive(Debug, Parser)]
#[command(
	version = cadence_cli::VERSION,
	rename_all = "kebab",
	styles = cadence_cli::styles(),
)]
pub struct Args {
	/// Service config whose `[interpreter]` section is evaluated. Defaults apply when omitted.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	/// Exit with an error when any case does not match its expectation.
	#[arg(long)]
	pub fail_on_mismatch: bool,
}

#[derive(Debug, Deserialize)]
pub struct Corpus {
	pub name: Option<String>,
	/// Reference time every case is interpreted against.
	#[serde(with = "time::serde::rfc3339")]
	pub now: OffsetDateTime,
	pub cases: Vec<CorpusCase>,
}

#[derive(Debug, Deserialize)]
pub struct CorpusCase {
	pub id: Option<String>,
	pub command: String,
	pub expect: Expectation,
}

#[derive(Debug, Deserialize)]
pub struct Expectation {
	pub kind: IntentKind,
	pub person: Option<String>,
	/// Wall-clock time as `HH:MM`.
	pub time: Option<String>,
	/// Days between the reference date and the scheduled date. Zero when omitted.
	pub day_offset: Option<i64>,
	pub agenda: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvalReport {
	pub corpus: CorpusInfo,
	pub summary: EvalSummary,
	pub cases: Vec<CaseReport>,
}

#[derive(Debug, Serialize)]
pub struct CorpusInfo {
	pub name: String,
	pub case_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub passed: usize,
	pub failed: usize,
	pub pass_rate: f64,
	/// Keyed by expected intent kind.
	pub by_kind: BTreeMap<&'static str, KindSummary>,
}

#[derive(Debug, Default, Serialize)]
pub struct KindSummary {
	pub cases: usize,
	pub passed: usize,
	pub pass_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
	pub id: String,
	pub command: String,
	pub passed: bool,
	pub expected_kind: IntentKind,
	pub actual: Intent,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rule: Option<&'static str>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub mismatches: Vec<String>,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let (interpreter_cfg, log_level) = match &args.config {
		Some(path) => {
			let config = cadence_config::load(path)?;

			(config.interpreter, config.service.log_level)
		},
		None => (Interpreter::default(), "info".to_string()),
	};

	cadence_cli::init_tracing(&log_level);

	let corpus = load_corpus(args.dataset.as_path())?;
	let interpreter = CommandInterpreter::new(&interpreter_cfg)?;
	let report = evaluate_corpus(&interpreter, &corpus);
	let json = serde_json::to_string_pretty(&report)?;

	println!("{json}");

	if args.fail_on_mismatch && report.summary.failed > 0 {
		return Err(eyre::eyre!(
			"{} of {} cases did not match.",
			report.summary.failed,
			report.corpus.case_count
		));
	}

	Ok(())
}

pub fn load_corpus(path: &Path) -> color_eyre::Result<Corpus> {
	let raw = fs::read_to_string(path)?;
	let corpus: Corpus = serde_json::from_str(&raw)?;

	if corpus.cases.is_empty() {
		return Err(eyre::eyre!("Corpus must include at least one case."));
	}

	Ok(corpus)
}

pub fn evaluate_corpus(interpreter: &CommandInterpreter, corpus: &Corpus) -> EvalReport {
	let cases = corpus
		.cases
		.iter()
		.enumerate()
		.map(|(idx, case)| evaluate_case(interpreter, corpus.now, idx, case))
		.collect::<Vec<_>>();

	EvalReport {
		corpus: CorpusInfo {
			name: corpus.name.clone().unwrap_or_else(|| "unnamed".to_string()),
			case_count: cases.len(),
		},
		summary: summarize(&cases),
		cases,
	}
}

fn evaluate_case(
	interpreter: &CommandInterpreter,
	now: OffsetDateTime,
	idx: usize,
	case: &CorpusCase,
) -> CaseReport {
	let evaluation = interpreter.evaluate(&case.command, now);
	let mismatches = compare(&case.expect, &evaluation.intent, now);
	let id = case.id.clone().unwrap_or_else(|| format!("case-{}", idx + 1));

	if !mismatches.is_empty() {
		tracing::debug!(%id, command = %case.command, ?mismatches, "Case did not match.");
	}

	CaseReport {
		id,
		command: case.command.clone(),
		passed: mismatches.is_empty(),
		expected_kind: case.expect.kind,
		actual: evaluation.intent,
		rule: evaluation.rule,
		mismatches,
	}
}

fn compare(expect: &Expectation, actual: &Intent, now: OffsetDateTime) -> Vec<String> {
	let mut mismatches = Vec::new();

	if actual.kind() != expect.kind {
		mismatches.push(format!(
			"kind: expected {}, got {}",
			expect.kind.as_str(),
			actual.kind().as_str()
		));

		return mismatches;
	}

	match actual {
		Intent::Schedule { person, when, agenda } => {
			check_field(&mut mismatches, "person", expect.person.as_deref(), Some(person.as_str()));
			check_field(
				&mut mismatches,
				"time",
				expect.time.as_deref(),
				Some(format!("{:02}:{:02}", when.hour(), when.minute()).as_str()),
			);
			check_field(&mut mismatches, "agenda", expect.agenda.as_deref(), agenda.as_deref());

			let day_offset = (when.date() - now.date()).whole_days();
			let expected_offset = expect.day_offset.unwrap_or(0);

			if day_offset != expected_offset {
				mismatches
					.push(format!("day_offset: expected {expected_offset}, got {day_offset}"));
			}
		},
		Intent::MissingTime { person } => {
			check_field(&mut mismatches, "person", expect.person.as_deref(), Some(person.as_str()));
		},
		Intent::Query { .. } | Intent::Unrecognized => {},
	}

	mismatches
}

fn check_field(
	mismatches: &mut Vec<String>,
	field: &str,
	expected: Option<&str>,
	actual: Option<&str>,
) {
	let Some(expected) = expected else {
		return;
	};

	if actual != Some(expected) {
		mismatches.push(format!("{field}: expected {expected:?}, got {actual:?}"));
	}
}

fn summarize(cases: &[CaseReport]) -> EvalSummary {
	let mut by_kind: BTreeMap<&'static str, KindSummary> = BTreeMap::new();

	for case in cases {
		let entry = by_kind.entry(case.expected_kind.as_str()).or_default();

		entry.cases += 1;

		if case.passed {
			entry.passed += 1;
		}
	}
	for summary in by_kind.values_mut() {
		summary.pass_rate = rate(summary.passed, summary.cases);
	}

	let passed = cases.iter().filter(|case| case.passed).count();

	EvalSummary {
		passed,
		failed: cases.len() - passed,
		pass_rate: rate(passed, cases.len()),
		by_kind,
	}
}

fn rate(passed: usize, total: usize) -> f64 {
	if total == 0 { 0.0 } else { passed as f64 / total as f64 }
}
