use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CadenceService, RecordFailureRequest, Result, Suggestion};
use cadence_domain::{Intent, IntentKind, interpreter};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterpretRequest {
	pub command: String,
}

/// Where a suggestion came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStage {
	/// History matched before the rule cascade ran.
	History,
	/// The rule cascade failed and history offered the closest resolved command.
	Fallback,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Interpretation {
	Intent { intent: Intent },
	/// Needs confirmation by the caller before anything is scheduled.
	Suggestion { stage: SuggestionStage, suggestion: Suggestion },
}
impl Interpretation {
	pub fn intent(&self) -> Option<&Intent> {
		match self {
			Self::Intent { intent } => Some(intent),
			Self::Suggestion { .. } => None,
		}
	}

	pub fn suggestion(&self) -> Option<&Suggestion> {
		match self {
			Self::Intent { .. } => None,
			Self::Suggestion { suggestion, .. } => Some(suggestion),
		}
	}
}

impl CadenceService {
	pub async fn interpret(&self, req: InterpretRequest) -> Result<Interpretation> {
		self.interpret_at(&req.command, self.interpreter.now()).await
	}

	/// Interprets `command` against a fixed reference time.
	///
	/// Order: a listing query, then a near-identical resolved command in history, then the
	/// rest of the deterministic cascade, then, after recording the failure, the closest
	/// resolved command. Only storage failures surface as errors.
	pub async fn interpret_at(
		&self,
		command: &str,
		now: OffsetDateTime,
	) -> Result<Interpretation> {
		if interpreter::normalize_command(command).is_empty() {
			return Ok(Interpretation::Intent { intent: Intent::Unrecognized });
		}

		let evaluation = self.interpreter.evaluate(command, now);

		tracing::debug!(
			kind = evaluation.intent.kind().as_str(),
			rule = evaluation.rule.unwrap_or("none"),
			"Rule cascade finished."
		);

		if evaluation.intent.kind() == IntentKind::Query {
			return Ok(Interpretation::Intent { intent: evaluation.intent });
		}

		let learning = &self.learning;

		if let Some(suggestion) =
			learning.suggest_above(command, learning.cfg.preempt_threshold).await?
		{
			tracing::info!(
				based_on = %suggestion.based_on,
				confidence = suggestion.confidence,
				"Surfacing suggestion from history."
			);

			return Ok(Interpretation::Suggestion { stage: SuggestionStage::History, suggestion });
		}

		let Some(reason) = evaluation.failure else {
			return Ok(Interpretation::Intent { intent: evaluation.intent });
		};

		learning
			.record_failure(RecordFailureRequest {
				command: command.to_string(),
				reason: reason.to_string(),
			})
			.await?;

		match learning.suggest(command).await? {
			Some(suggestion) => {
				tracing::info!(
					based_on = %suggestion.based_on,
					confidence = suggestion.confidence,
					"Surfacing fallback suggestion."
				);

				Ok(Interpretation::Suggestion { stage: SuggestionStage::Fallback, suggestion })
			},
			None => Ok(Interpretation::Intent { intent: Intent::Unrecognized }),
		}
	}
}
