use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct FailedCommand {
	pub failure_id: Uuid,
	pub command: String,
	pub command_hash: String,
	pub failure_reason: String,
	pub created_at: OffsetDateTime,
	pub resolved: bool,
	pub resolution: Option<Value>,
	pub resolved_at: Option<OffsetDateTime>,
}

/// A resolved command with the number of resolved commands sharing its resolution.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ResolvedCommand {
	pub command: String,
	pub resolution: Value,
	pub frequency: i64,
	pub resolved_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LearnedPattern {
	pub pattern_id: Uuid,
	pub kind: String,
	pub pattern: String,
	pub template: Value,
	pub confidence: f32,
	pub usage_count: i64,
	pub success_count: i64,
	pub created_at: OffsetDateTime,
	pub last_used_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SuggestionFeedback {
	pub feedback_id: Uuid,
	pub command: String,
	pub suggested: Option<Value>,
	pub accepted: bool,
	pub feedback_text: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LearningCounts {
	pub pending: i64,
	pub resolved: i64,
	pub pattern_count: i64,
}
