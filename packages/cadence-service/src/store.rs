//! Persistence seam for the learner, with the Postgres implementation.

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{BoxFuture, Error, Result};
use cadence_storage::{
	db::Db,
	models::{FailedCommand, LearnedPattern, LearningCounts, ResolvedCommand, SuggestionFeedback},
	queries,
};

/// Rows the learner reads and writes. Every write is a single atomic statement; no operation
/// holds a transaction across calls.
pub trait LearningStore
where
	Self: Send + Sync,
{
	/// Adds the failure unless its hash is already recorded. Returns whether a row was added.
	fn insert_failure<'a>(&'a self, failure: &'a FailedCommand) -> BoxFuture<'a, Result<bool>>;

	/// Marks the failure with `failure.command_hash` resolved, inserting `failure` first when no
	/// such row exists.
	fn upsert_resolution<'a>(
		&'a self,
		failure: &'a FailedCommand,
		resolution: &'a Value,
	) -> BoxFuture<'a, Result<FailedCommand>>;

	/// Resolved commands ordered by resolution frequency, then most recently resolved.
	fn resolved_commands<'a>(&'a self) -> BoxFuture<'a, Result<Vec<ResolvedCommand>>>;

	/// Unresolved failures, newest first.
	fn pending_failures<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<FailedCommand>>>;

	/// Inserts patterns, skipping any (kind, pattern) pair already stored. Returns the number
	/// inserted.
	fn insert_patterns<'a>(&'a self, patterns: &'a [LearnedPattern]) -> BoxFuture<'a, Result<u64>>;

	fn patterns<'a>(&'a self) -> BoxFuture<'a, Result<Vec<LearnedPattern>>>;

	fn record_pattern_outcome<'a>(
		&'a self,
		pattern_id: Uuid,
		success: bool,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<LearnedPattern>>;

	fn counts<'a>(&'a self) -> BoxFuture<'a, Result<LearningCounts>>;

	fn insert_feedback<'a>(&'a self, feedback: &'a SuggestionFeedback) -> BoxFuture<'a, Result<()>>;
}

pub struct PgStore {
	db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}
impl LearningStore for PgStore {
	fn insert_failure<'a>(&'a self, failure: &'a FailedCommand) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			queries::insert_failed_command(&self.db.pool, failure)
				.await
				.map_err(|err| storage_error("insert_failure", err))
		})
	}

	fn upsert_resolution<'a>(
		&'a self,
		failure: &'a FailedCommand,
		resolution: &'a Value,
	) -> BoxFuture<'a, Result<FailedCommand>> {
		Box::pin(async move {
			queries::upsert_resolution(
				&self.db.pool,
				failure.failure_id,
				failure.command.as_str(),
				failure.command_hash.as_str(),
				failure.failure_reason.as_str(),
				resolution,
				failure.created_at,
			)
			.await
			.map_err(|err| storage_error("upsert_resolution", err))
		})
	}

	fn resolved_commands<'a>(&'a self) -> BoxFuture<'a, Result<Vec<ResolvedCommand>>> {
		Box::pin(async move {
			queries::list_resolved_commands(&self.db.pool)
				.await
				.map_err(|err| storage_error("resolved_commands", err))
		})
	}

	fn pending_failures<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<FailedCommand>>> {
		Box::pin(async move {
			queries::list_pending_failures(&self.db.pool, i64::from(limit))
				.await
				.map_err(|err| storage_error("pending_failures", err))
		})
	}

	fn insert_patterns<'a>(&'a self, patterns: &'a [LearnedPattern]) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut inserted = 0;

			for pattern in patterns {
				if queries::insert_learned_pattern(&self.db.pool, pattern)
					.await
					.map_err(|err| storage_error("insert_patterns", err))?
				{
					inserted += 1;
				}
			}

			Ok(inserted)
		})
	}

	fn patterns<'a>(&'a self) -> BoxFuture<'a, Result<Vec<LearnedPattern>>> {
		Box::pin(async move {
			queries::list_learned_patterns(&self.db.pool)
				.await
				.map_err(|err| storage_error("patterns", err))
		})
	}

	fn record_pattern_outcome<'a>(
		&'a self,
		pattern_id: Uuid,
		success: bool,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<LearnedPattern>> {
		Box::pin(async move {
			queries::record_pattern_outcome(&self.db.pool, pattern_id, success, now)
				.await
				.map_err(|err| storage_error("record_pattern_outcome", err))
		})
	}

	fn counts<'a>(&'a self) -> BoxFuture<'a, Result<LearningCounts>> {
		Box::pin(async move {
			queries::learning_counts(&self.db.pool)
				.await
				.map_err(|err| storage_error("counts", err))
		})
	}

	fn insert_feedback<'a>(
		&'a self,
		feedback: &'a SuggestionFeedback,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			queries::insert_feedback(&self.db.pool, feedback)
				.await
				.map_err(|err| storage_error("insert_feedback", err))
		})
	}
}

fn storage_error(operation: &'static str, err: cadence_storage::Error) -> Error {
	if matches!(err, cadence_storage::Error::Sqlx(_)) {
		tracing::warn!(operation, error = %err, "Learning store call failed.");
	}

	err.into()
}
