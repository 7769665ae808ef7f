use serde_json::Value;
use sqlx::{Executor, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{
		FailedCommand, LearnedPattern, LearningCounts, ResolvedCommand, SuggestionFeedback,
	},
};

const FAILED_COMMAND_COLUMNS: &str = "\
failure_id, command, command_hash, failure_reason, created_at, resolved, resolution, resolved_at";
const LEARNED_PATTERN_COLUMNS: &str = "\
pattern_id, kind, pattern, template, confidence, usage_count, success_count, created_at, last_used_at";

/// Inserts a failure unless one with the same hash exists. Returns whether a row was added.
pub async fn insert_failed_command<'e, E>(executor: E, failure: &FailedCommand) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query(
		"\
INSERT INTO failed_commands (
	failure_id,
	command,
	command_hash,
	failure_reason,
	created_at,
	resolved,
	resolution,
	resolved_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (command_hash) DO NOTHING",
	)
	.bind(failure.failure_id)
	.bind(failure.command.as_str())
	.bind(failure.command_hash.as_str())
	.bind(failure.failure_reason.as_str())
	.bind(failure.created_at)
	.bind(failure.resolved)
	.bind(failure.resolution.as_ref())
	.bind(failure.resolved_at)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// Marks the command resolved with `resolution`, creating the row when the command never
/// failed. Concurrent writers resolve last-write-wins.
pub async fn upsert_resolution<'e, E>(
	executor: E,
	failure_id: Uuid,
	command: &str,
	command_hash: &str,
	failure_reason: &str,
	resolution: &Value,
	now: OffsetDateTime,
) -> Result<FailedCommand>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"\
INSERT INTO failed_commands (
	failure_id,
	command,
	command_hash,
	failure_reason,
	created_at,
	resolved,
	resolution,
	resolved_at
)
VALUES ($1, $2, $3, $4, $5, TRUE, $6, $5)
ON CONFLICT (command_hash) DO UPDATE
SET
	resolved = TRUE,
	resolution = EXCLUDED.resolution,
	resolved_at = EXCLUDED.resolved_at
RETURNING {FAILED_COMMAND_COLUMNS}"
	);
	let row = sqlx::query_as::<_, FailedCommand>(&sql)
		.bind(failure_id)
		.bind(command)
		.bind(command_hash)
		.bind(failure_reason)
		.bind(now)
		.bind(resolution)
		.fetch_one(executor)
		.await?;

	Ok(row)
}

pub async fn get_failed_command_by_hash<'e, E>(
	executor: E,
	command_hash: &str,
) -> Result<Option<FailedCommand>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql =
		format!("SELECT {FAILED_COMMAND_COLUMNS} FROM failed_commands WHERE command_hash = $1");
	let row = sqlx::query_as::<_, FailedCommand>(&sql)
		.bind(command_hash)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

/// Unresolved failures, newest first.
pub async fn list_pending_failures<'e, E>(executor: E, limit: i64) -> Result<Vec<FailedCommand>>
where
	E: Executor<'e, Database = Postgres>,
{
	if limit <= 0 {
		return Err(Error::InvalidArgument("limit must be greater than zero.".to_string()));
	}

	let sql = format!(
		"\
SELECT {FAILED_COMMAND_COLUMNS}
FROM failed_commands
WHERE resolved = FALSE
ORDER BY created_at DESC, failure_id ASC
LIMIT $1"
	);
	let rows = sqlx::query_as::<_, FailedCommand>(&sql).bind(limit).fetch_all(executor).await?;

	Ok(rows)
}

/// Every resolved command, most frequent resolution first, then most recently resolved.
pub async fn list_resolved_commands<'e, E>(executor: E) -> Result<Vec<ResolvedCommand>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows = sqlx::query_as::<_, ResolvedCommand>(
		"\
SELECT
	command,
	resolution,
	COUNT(*) OVER (PARTITION BY resolution) AS frequency,
	resolved_at
FROM failed_commands
WHERE resolved = TRUE AND resolution IS NOT NULL
ORDER BY frequency DESC, resolved_at DESC NULLS LAST, command ASC",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Inserts a derived pattern unless the same (kind, pattern) pair exists.
pub async fn insert_learned_pattern<'e, E>(executor: E, pattern: &LearnedPattern) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query(
		"\
INSERT INTO learned_patterns (
	pattern_id,
	kind,
	pattern,
	template,
	confidence,
	usage_count,
	success_count,
	created_at,
	last_used_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (kind, pattern) DO NOTHING",
	)
	.bind(pattern.pattern_id)
	.bind(pattern.kind.as_str())
	.bind(pattern.pattern.as_str())
	.bind(&pattern.template)
	.bind(pattern.confidence)
	.bind(pattern.usage_count)
	.bind(pattern.success_count)
	.bind(pattern.created_at)
	.bind(pattern.last_used_at)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub async fn list_learned_patterns<'e, E>(executor: E) -> Result<Vec<LearnedPattern>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"\
SELECT {LEARNED_PATTERN_COLUMNS}
FROM learned_patterns
ORDER BY kind ASC, confidence DESC, created_at ASC, pattern ASC"
	);
	let rows = sqlx::query_as::<_, LearnedPattern>(&sql).fetch_all(executor).await?;

	Ok(rows)
}

/// Counts one more use of a pattern and recomputes its confidence as the new success ratio in
/// a single statement.
pub async fn record_pattern_outcome<'e, E>(
	executor: E,
	pattern_id: Uuid,
	success: bool,
	now: OffsetDateTime,
) -> Result<LearnedPattern>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"\
UPDATE learned_patterns
SET
	usage_count = usage_count + 1,
	success_count = success_count + CASE WHEN $2 THEN 1 ELSE 0 END,
	confidence = (success_count + CASE WHEN $2 THEN 1 ELSE 0 END)::real / (usage_count + 1)::real,
	last_used_at = $3
WHERE pattern_id = $1
RETURNING {LEARNED_PATTERN_COLUMNS}"
	);
	let row = sqlx::query_as::<_, LearnedPattern>(&sql)
		.bind(pattern_id)
		.bind(success)
		.bind(now)
		.fetch_optional(executor)
		.await?;

	row.ok_or_else(|| Error::NotFound(format!("learned pattern {pattern_id}")))
}

pub async fn learning_counts<'e, E>(executor: E) -> Result<LearningCounts>
where
	E: Executor<'e, Database = Postgres>,
{
	let row = sqlx::query_as::<_, LearningCounts>(
		"\
SELECT
	(SELECT COUNT(*) FROM failed_commands WHERE resolved = FALSE) AS pending,
	(SELECT COUNT(*) FROM failed_commands WHERE resolved = TRUE) AS resolved,
	(SELECT COUNT(*) FROM learned_patterns) AS pattern_count",
	)
	.fetch_one(executor)
	.await?;

	Ok(row)
}

pub async fn insert_feedback<'e, E>(executor: E, feedback: &SuggestionFeedback) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO suggestion_feedback (
	feedback_id,
	command,
	suggested,
	accepted,
	feedback_text,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(feedback.feedback_id)
	.bind(feedback.command.as_str())
	.bind(feedback.suggested.as_ref())
	.bind(feedback.accepted)
	.bind(feedback.feedback_text.as_deref())
	.bind(feedback.created_at)
	.execute(executor)
	.await?;

	Ok(())
}
