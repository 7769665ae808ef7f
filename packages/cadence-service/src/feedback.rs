use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{CorrectionRequest, Error, Resolution, Result, SuggestionStore};
use cadence_storage::models::SuggestionFeedback;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackRequest {
	pub command: String,
	#[serde(default)]
	pub suggestion: Option<Resolution>,
	pub accepted: bool,
	#[serde(default)]
	pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackResponse {
	pub feedback_id: Uuid,
	/// True when an accepted suggestion was applied as a correction.
	pub applied: bool,
}

impl SuggestionStore {
	/// Stores the caller's verdict on a suggestion. An accepted suggestion becomes the
	/// command's correction.
	pub async fn record_feedback(&self, req: FeedbackRequest) -> Result<FeedbackResponse> {
		let command = crate::require_command(&req.command)?.to_string();

		if let Some(suggestion) = req.suggestion.as_ref() {
			suggestion.validate()?;
		}

		let suggested = req
			.suggestion
			.as_ref()
			.map(serde_json::to_value)
			.transpose()
			.map_err(|err| Error::InvalidRequest {
				message: format!("suggestion is not serializable: {err}"),
			})?;
		let feedback_text =
			req.text.map(|text| text.trim().to_string()).filter(|text| !text.is_empty());
		let feedback = SuggestionFeedback {
			feedback_id: Uuid::new_v4(),
			command: command.clone(),
			suggested,
			accepted: req.accepted,
			feedback_text,
			created_at: OffsetDateTime::now_utc(),
		};

		self.store.insert_feedback(&feedback).await?;

		let applied = match (req.accepted, req.suggestion) {
			(true, Some(resolution)) => {
				self.record_correction(CorrectionRequest { command, resolution }).await?;

				true
			},
			_ => false,
		};

		tracing::info!(
			feedback_id = %feedback.feedback_id,
			accepted = req.accepted,
			applied,
			"Recorded suggestion feedback."
		);

		Ok(FeedbackResponse { feedback_id: feedback.feedback_id, applied })
	}
}
