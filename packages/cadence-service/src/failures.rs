use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, SuggestionStore};
use cadence_domain::fingerprint;
use cadence_storage::models::FailedCommand;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordFailureRequest {
	pub command: String,
	pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordFailureResponse {
	pub command_hash: String,
	/// False when the same command had already been recorded.
	pub created: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailedCommandItem {
	pub failure_id: Uuid,
	pub command: String,
	pub reason: String,
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailedCommandsResponse {
	pub items: Vec<FailedCommandItem>,
}

impl SuggestionStore {
	/// Records a command the interpreter could not handle. Repeated submissions of the same
	/// text, in any letter case, keep the first record.
	pub async fn record_failure(&self, req: RecordFailureRequest) -> Result<RecordFailureResponse> {
		let command = crate::require_command(&req.command)?;
		let reason = req.reason.trim();

		if reason.is_empty() {
			return Err(Error::InvalidRequest { message: "reason must be non-empty.".to_string() });
		}

		let failure = FailedCommand {
			failure_id: Uuid::new_v4(),
			command: command.to_string(),
			command_hash: fingerprint::command_hash(command),
			failure_reason: reason.to_string(),
			created_at: OffsetDateTime::now_utc(),
			resolved: false,
			resolution: None,
			resolved_at: None,
		};
		let created = self.store.insert_failure(&failure).await?;

		if created {
			tracing::info!(command_hash = %failure.command_hash, reason, "Recorded failed command.");
		} else {
			tracing::debug!(command_hash = %failure.command_hash, "Failed command already recorded.");
		}

		Ok(RecordFailureResponse { command_hash: failure.command_hash, created })
	}

	/// Unresolved failures, newest first. `limit` falls back to the configured default and is
	/// capped at the configured maximum.
	pub async fn list_failed_commands(&self, limit: Option<u32>) -> Result<FailedCommandsResponse> {
		let limit = match limit {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "limit must be greater than zero.".to_string(),
				}),
			Some(limit) => limit.min(self.cfg.failed_commands_max_limit),
			None => self.cfg.failed_commands_limit,
		};
		let rows = self.store.pending_failures(limit).await?;
		let items = rows
			.into_iter()
			.map(|row| FailedCommandItem {
				failure_id: row.failure_id,
				command: row.command,
				reason: row.failure_reason,
				timestamp: row.created_at,
			})
			.collect();

		Ok(FailedCommandsResponse { items })
	}
}
