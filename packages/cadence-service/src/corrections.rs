use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Resolution, Result, SCHEDULE_KIND, SuggestionStore};
use cadence_domain::{fingerprint, templates};
use cadence_storage::models::{FailedCommand, LearnedPattern};

pub const OPERATOR_CORRECTION_REASON: &str = "operator correction";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionRequest {
	pub command: String,
	pub resolution: Resolution,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionResponse {
	pub command_hash: String,
	/// Templates added by this correction. Already-known templates are not counted.
	pub derived_patterns: u64,
}

impl SuggestionStore {
	/// Resolves the command with the operator's interpretation. Schedule resolutions also
	/// derive one template per common scheduling phrasing.
	pub async fn record_correction(&self, req: CorrectionRequest) -> Result<CorrectionResponse> {
		let command = crate::require_command(&req.command)?;

		req.resolution.validate()?;

		let now = OffsetDateTime::now_utc();
		let resolution = serde_json::to_value(&req.resolution).map_err(|err| {
			Error::InvalidRequest { message: format!("resolution is not serializable: {err}") }
		})?;
		let failure = FailedCommand {
			failure_id: Uuid::new_v4(),
			command: command.to_string(),
			command_hash: fingerprint::command_hash(command),
			failure_reason: OPERATOR_CORRECTION_REASON.to_string(),
			created_at: now,
			resolved: true,
			resolution: Some(resolution.clone()),
			resolved_at: Some(now),
		};
		let row = self.store.upsert_resolution(&failure, &resolution).await?;

		tracing::info!(
			command_hash = %row.command_hash,
			kind = %req.resolution.kind,
			"Applied correction."
		);

		let derived_patterns = match req.resolution.person.as_deref() {
			Some(person) if req.resolution.kind == SCHEDULE_KIND =>
				self.derive_schedule_patterns(person.trim(), now).await?,
			_ => 0,
		};

		Ok(CorrectionResponse { command_hash: row.command_hash, derived_patterns })
	}

	async fn derive_schedule_patterns(&self, person: &str, now: OffsetDateTime) -> Result<u64> {
		let patterns = templates::derive_schedule_patterns(person)
			.into_iter()
			.map(|derived| LearnedPattern {
				pattern_id: Uuid::new_v4(),
				kind: derived.kind.to_string(),
				pattern: derived.pattern,
				template: derived.template,
				confidence: self.cfg.initial_confidence,
				usage_count: 0,
				success_count: 0,
				created_at: now,
				last_used_at: None,
			})
			.collect::<Vec<_>>();
		let inserted = self.store.insert_patterns(&patterns).await?;

		if inserted > 0 {
			tracing::info!(inserted, "Derived schedule templates from correction.");
		}

		Ok(inserted)
	}
}
