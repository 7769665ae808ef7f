mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Interpreter, Learning, Meridiem, MeridiemRule, Postgres, Security, Service, Storage,
	StorageBackend, default_meridiem_rules, default_query_phrases,
};

use std::{fs, path::Path};

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("service.log_level", &cfg.service.log_level),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	validate_storage(cfg)?;
	validate_interpreter(&cfg.interpreter)?;
	validate_learning(&cfg.learning)?;

	Ok(())
}

fn validate_storage(cfg: &Config) -> Result<()> {
	match (cfg.storage.backend, cfg.storage.postgres.as_ref()) {
		(StorageBackend::Postgres, None) => Err(Error::Validation {
			message: "storage.postgres is required when storage.backend is postgres.".to_string(),
		}),
		(StorageBackend::Postgres, Some(postgres)) => {
			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}

			Ok(())
		},
		(StorageBackend::Memory, _) => Ok(()),
	}
}

fn validate_interpreter(interpreter: &Interpreter) -> Result<()> {
	if interpreter.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
		return Err(Error::Validation {
			message: "interpreter.utc_offset_minutes must be within 18 hours of UTC.".to_string(),
		});
	}
	if interpreter.query_phrases.is_empty() {
		return Err(Error::Validation {
			message: "interpreter.query_phrases must be non-empty.".to_string(),
		});
	}
	if interpreter.query_phrases.iter().any(|phrase| phrase.trim().is_empty()) {
		return Err(Error::Validation {
			message: "interpreter.query_phrases must not contain blank phrases.".to_string(),
		});
	}

	for rule in &interpreter.meridiem_rules {
		if rule.min_hour == 0 || rule.max_hour > 12 || rule.min_hour > rule.max_hour {
			return Err(Error::Validation {
				message: format!(
					"interpreter.meridiem_rules range {}-{} must satisfy 1 <= min_hour <= max_hour <= 12.",
					rule.min_hour, rule.max_hour
				),
			});
		}
	}

	let mut ranges = interpreter
		.meridiem_rules
		.iter()
		.map(|rule| (rule.min_hour, rule.max_hour))
		.collect::<Vec<_>>();

	ranges.sort_unstable();

	for pair in ranges.windows(2) {
		if pair[1].0 <= pair[0].1 {
			return Err(Error::Validation {
				message: format!(
					"interpreter.meridiem_rules ranges {}-{} and {}-{} overlap.",
					pair[0].0, pair[0].1, pair[1].0, pair[1].1
				),
			});
		}
	}

	Ok(())
}

fn validate_learning(learning: &Learning) -> Result<()> {
	for (label, value) in [
		("learning.similarity_threshold", learning.similarity_threshold),
		("learning.initial_confidence", learning.initial_confidence),
		("learning.preempt_threshold", learning.preempt_threshold),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if learning.preempt_threshold < learning.similarity_threshold {
		return Err(Error::Validation {
			message: "learning.preempt_threshold must not be below learning.similarity_threshold."
				.to_string(),
		});
	}
	if learning.max_candidates == 0 {
		return Err(Error::Validation {
			message: "learning.max_candidates must be greater than zero.".to_string(),
		});
	}
	if learning.failed_commands_limit == 0 {
		return Err(Error::Validation {
			message: "learning.failed_commands_limit must be greater than zero.".to_string(),
		});
	}
	if learning.failed_commands_limit > learning.failed_commands_max_limit {
		return Err(Error::Validation {
			message:
				"learning.failed_commands_limit must not exceed learning.failed_commands_max_limit."
					.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for phrase in &mut cfg.interpreter.query_phrases {
		*phrase = phrase.trim().to_lowercase();
	}

	if cfg.storage.backend == StorageBackend::Memory
		&& cfg.storage.postgres.as_ref().map(|pg| pg.dsn.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.postgres = None;
	}
}
