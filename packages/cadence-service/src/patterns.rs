use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, SuggestionStore};
use cadence_storage::models::LearnedPattern;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternItem {
	pub pattern_id: Uuid,
	pub kind: String,
	pub pattern: String,
	pub template: Value,
	pub confidence: f32,
	pub usage_count: i64,
	pub success_count: i64,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339::option")]
	pub last_used_at: Option<OffsetDateTime>,
}
impl From<LearnedPattern> for PatternItem {
	fn from(row: LearnedPattern) -> Self {
		Self {
			pattern_id: row.pattern_id,
			kind: row.kind,
			pattern: row.pattern,
			template: row.template,
			confidence: row.confidence,
			usage_count: row.usage_count,
			success_count: row.success_count,
			created_at: row.created_at,
			last_used_at: row.last_used_at,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternsResponse {
	pub items: Vec<PatternItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternOutcomeRequest {
	pub success: bool,
}

impl SuggestionStore {
	pub async fn list_patterns(&self) -> Result<PatternsResponse> {
		let rows = self.store.patterns().await?;

		Ok(PatternsResponse { items: rows.into_iter().map(PatternItem::from).collect() })
	}

	/// Counts one use of a learned pattern and recomputes its confidence from the new
	/// success ratio.
	pub async fn record_pattern_outcome(
		&self,
		pattern_id: Uuid,
		req: PatternOutcomeRequest,
	) -> Result<PatternItem> {
		let row = self
			.store
			.record_pattern_outcome(pattern_id, req.success, OffsetDateTime::now_utc())
			.await?;

		tracing::debug!(
			%pattern_id,
			success = req.success,
			confidence = row.confidence,
			"Recorded pattern outcome."
		);

		Ok(row.into())
	}
}
