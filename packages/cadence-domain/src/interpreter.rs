use std::fmt::{Display, Formatter};

use time::{Duration, OffsetDateTime, UtcOffset};
use unicode_normalization::UnicodeNormalization;

use crate::{
	intent::{Intent, QueryScope},
	matcher::{MatchOutcome, Matcher},
	time_token::{self, MeridiemPolicy, NormalizeError},
};
use cadence_config::Interpreter;

#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
	#[error("Failed to compile matcher rule: {0}")]
	Pattern(#[from] regex::Error),
	#[error("UTC offset of {minutes} minutes is out of range.")]
	Offset { minutes: i32 },
}

/// Why a command ended up unrecognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
	/// A schedule rule matched but its time token did not normalize.
	InvalidTime { token: String },
	NoPatternMatched,
}
impl Display for FailureReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidTime { token } => write!(f, "invalid time token {token:?}"),
			Self::NoPatternMatched => f.write_str("no pattern matched"),
		}
	}
}

/// Intent plus the trace of how it was reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
	pub intent: Intent,
	/// Name of the matcher rule that fired, if any.
	pub rule: Option<&'static str>,
	pub failure: Option<FailureReason>,
}

/// Deterministic text-to-intent interpreter. Holds no mutable state, so one instance can be
/// shared across threads.
#[derive(Debug)]
pub struct CommandInterpreter {
	matcher: Matcher,
	policy: MeridiemPolicy,
	offset: UtcOffset,
}
impl CommandInterpreter {
	pub fn new(cfg: &Interpreter) -> Result<Self, InterpreterError> {
		let offset = UtcOffset::from_whole_seconds(cfg.utc_offset_minutes * 60)
			.map_err(|_| InterpreterError::Offset { minutes: cfg.utc_offset_minutes })?;

		Ok(Self {
			matcher: Matcher::new(&cfg.query_phrases)?,
			policy: MeridiemPolicy::from_config(cfg),
			offset,
		})
	}

	/// Current time in the configured offset; the reference date for schedule intents.
	pub fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc().to_offset(self.offset)
	}

	pub fn interpret(&self, text: &str, now: OffsetDateTime) -> Intent {
		self.evaluate(text, now).intent
	}

	pub fn evaluate(&self, text: &str, now: OffsetDateTime) -> Evaluation {
		let normalized = normalize_command(text);

		match self.matcher.match_text(&normalized) {
			MatchOutcome::Query => Evaluation {
				intent: Intent::Query { scope: QueryScope::Meetings },
				rule: None,
				failure: None,
			},
			MatchOutcome::Schedule { rule, capture } => {
				match time_token::normalize_time_token(&capture.time_token, now, &self.policy) {
					Ok(mut when) => {
						if capture.tomorrow {
							when += Duration::days(1);
						}

						Evaluation {
							intent: Intent::Schedule {
								person: capture.person,
								when,
								agenda: capture.agenda,
							},
							rule: Some(rule),
							failure: None,
						}
					},
					Err(NormalizeError::InvalidTime { token }) => Evaluation {
						intent: Intent::Unrecognized,
						rule: Some(rule),
						failure: Some(FailureReason::InvalidTime { token }),
					},
				}
			},
			MatchOutcome::PersonOnly { rule, person } => Evaluation {
				intent: Intent::MissingTime { person },
				rule: Some(rule),
				failure: None,
			},
			MatchOutcome::NoMatch => Evaluation {
				intent: Intent::Unrecognized,
				rule: None,
				failure: Some(FailureReason::NoPatternMatched),
			},
		}
	}
}

/// NFKC-normalized, lower-cased, trimmed command text.
pub fn normalize_command(text: &str) -> String {
	text.nfkc().collect::<String>().to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn interpreter() -> CommandInterpreter {
		CommandInterpreter::new(&Interpreter::default()).expect("Expected default interpreter.")
	}

	#[test]
	fn normalization_folds_compatibility_forms() {
		assert_eq!(normalize_command("  Meet ＢＯＢ at ３pm "), "meet bob at 3pm");
	}

	#[test]
	fn invalid_time_is_unrecognized_not_missing_time() {
		let evaluation = interpreter()
			.evaluate("schedule meeting with john at 25", datetime!(2026-03-14 09:00 UTC));

		assert_eq!(evaluation.intent, Intent::Unrecognized);
		assert_eq!(evaluation.rule, Some("meeting_with"));
		assert_eq!(
			evaluation.failure,
			Some(FailureReason::InvalidTime { token: "25".to_string() })
		);
	}

	#[test]
	fn unmatched_text_reports_no_pattern() {
		let evaluation = interpreter().evaluate("hello there", datetime!(2026-03-14 09:00 UTC));

		assert_eq!(evaluation.intent, Intent::Unrecognized);
		assert_eq!(evaluation.failure, Some(FailureReason::NoPatternMatched));
		assert_eq!(
			evaluation.failure.map(|reason| reason.to_string()).as_deref(),
			Some("no pattern matched")
		);
	}

	#[test]
	fn rejects_out_of_range_offset() {
		let cfg = Interpreter { utc_offset_minutes: 30 * 60, ..Interpreter::default() };

		assert!(matches!(CommandInterpreter::new(&cfg), Err(InterpreterError::Offset { .. })));
	}
}
