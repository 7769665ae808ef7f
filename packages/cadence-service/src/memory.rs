//! In-process learning store for tests and single-node deployments without Postgres.

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
};

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{BoxFuture, Error, Result, store::LearningStore};
use cadence_domain::confidence;
use cadence_storage::models::{
	FailedCommand, LearnedPattern, LearningCounts, ResolvedCommand, SuggestionFeedback,
};

#[derive(Default)]
struct MemoryState {
	failures: Vec<FailedCommand>,
	patterns: Vec<LearnedPattern>,
	feedback: Vec<SuggestionFeedback>,
}

/// Learning store backed by a mutex-guarded state. Each trait call takes the lock once, so
/// calls are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryStore {
	state: Mutex<MemoryState>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn feedback(&self) -> Vec<SuggestionFeedback> {
		self.lock().feedback.clone()
	}

	fn lock(&self) -> MutexGuard<'_, MemoryState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl LearningStore for MemoryStore {
	fn insert_failure<'a>(&'a self, failure: &'a FailedCommand) -> BoxFuture<'a, Result<bool>> {
		let mut state = self.lock();
		let exists = state.failures.iter().any(|row| row.command_hash == failure.command_hash);

		if !exists {
			state.failures.push(failure.clone());
		}

		Box::pin(async move { Ok(!exists) })
	}

	fn upsert_resolution<'a>(
		&'a self,
		failure: &'a FailedCommand,
		resolution: &'a Value,
	) -> BoxFuture<'a, Result<FailedCommand>> {
		let mut state = self.lock();
		let existing =
			state.failures.iter().position(|row| row.command_hash == failure.command_hash);
		let row = match existing {
			Some(index) => {
				let row = &mut state.failures[index];

				row.resolved = true;
				row.resolution = Some(resolution.clone());
				row.resolved_at = Some(failure.created_at);

				row.clone()
			},
			None => {
				let row = FailedCommand {
					resolved: true,
					resolution: Some(resolution.clone()),
					resolved_at: Some(failure.created_at),
					..failure.clone()
				};

				state.failures.push(row.clone());

				row
			},
		};

		Box::pin(async move { Ok(row) })
	}

	fn resolved_commands<'a>(&'a self) -> BoxFuture<'a, Result<Vec<ResolvedCommand>>> {
		let state = self.lock();
		let resolved = state
			.failures
			.iter()
			.filter(|row| row.resolved)
			.filter_map(|row| row.resolution.as_ref().map(|resolution| (row, resolution)))
			.collect::<Vec<_>>();
		let mut frequency: HashMap<String, i64> = HashMap::new();

		for (_, resolution) in &resolved {
			*frequency.entry(resolution.to_string()).or_default() += 1;
		}

		let mut rows = resolved
			.into_iter()
			.map(|(row, resolution)| ResolvedCommand {
				command: row.command.clone(),
				resolution: resolution.clone(),
				frequency: frequency.get(&resolution.to_string()).copied().unwrap_or(1),
				resolved_at: row.resolved_at,
			})
			.collect::<Vec<_>>();

		rows.sort_by(|left, right| {
			right
				.frequency
				.cmp(&left.frequency)
				.then_with(|| right.resolved_at.cmp(&left.resolved_at))
				.then_with(|| left.command.cmp(&right.command))
		});

		Box::pin(async move { Ok(rows) })
	}

	fn pending_failures<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<FailedCommand>>> {
		let state = self.lock();
		let mut rows = state
			.failures
			.iter()
			.enumerate()
			.filter(|(_, row)| !row.resolved)
			.collect::<Vec<_>>();

		// Newest first; later insertions win ties on identical timestamps.
		rows.sort_by(|(left_idx, left), (right_idx, right)| {
			right.created_at.cmp(&left.created_at).then_with(|| right_idx.cmp(left_idx))
		});

		let rows = rows
			.into_iter()
			.take(limit as usize)
			.map(|(_, row)| row.clone())
			.collect::<Vec<_>>();

		Box::pin(async move { Ok(rows) })
	}

	fn insert_patterns<'a>(&'a self, patterns: &'a [LearnedPattern]) -> BoxFuture<'a, Result<u64>> {
		let mut state = self.lock();
		let mut inserted = 0;

		for pattern in patterns {
			let exists = state
				.patterns
				.iter()
				.any(|row| row.kind == pattern.kind && row.pattern == pattern.pattern);

			if !exists {
				state.patterns.push(pattern.clone());

				inserted += 1;
			}
		}

		Box::pin(async move { Ok(inserted) })
	}

	fn patterns<'a>(&'a self) -> BoxFuture<'a, Result<Vec<LearnedPattern>>> {
		let mut rows = self.lock().patterns.clone();

		rows.sort_by(|left, right| {
			left.kind
				.cmp(&right.kind)
				.then_with(|| right.confidence.total_cmp(&left.confidence))
				.then_with(|| left.created_at.cmp(&right.created_at))
				.then_with(|| left.pattern.cmp(&right.pattern))
		});

		Box::pin(async move { Ok(rows) })
	}

	fn record_pattern_outcome<'a>(
		&'a self,
		pattern_id: Uuid,
		success: bool,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<LearnedPattern>> {
		let mut state = self.lock();
		let result = match state.patterns.iter_mut().find(|row| row.pattern_id == pattern_id) {
			Some(row) => {
				row.confidence =
					confidence::next_confidence(row.success_count, row.usage_count, success);
				row.usage_count += 1;

				if success {
					row.success_count += 1;
				}

				row.last_used_at = Some(now);

				Ok(row.clone())
			},
			None => Err(Error::NotFound { message: format!("learned pattern {pattern_id}") }),
		};

		Box::pin(async move { result })
	}

	fn counts<'a>(&'a self) -> BoxFuture<'a, Result<LearningCounts>> {
		let state = self.lock();
		let resolved = state.failures.iter().filter(|row| row.resolved).count() as i64;
		let counts = LearningCounts {
			pending: state.failures.len() as i64 - resolved,
			resolved,
			pattern_count: state.patterns.len() as i64,
		};

		Box::pin(async move { Ok(counts) })
	}

	fn insert_feedback<'a>(
		&'a self,
		feedback: &'a SuggestionFeedback,
	) -> BoxFuture<'a, Result<()>> {
		self.lock().feedback.push(feedback.clone());

		Box::pin(async move { Ok(()) })
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use time::Duration;

	use super::*;

	fn failure(command: &str, created_at: OffsetDateTime) -> FailedCommand {
		FailedCommand {
			failure_id: Uuid::new_v4(),
			command: command.to_string(),
			command_hash: cadence_domain::fingerprint::command_hash(command),
			failure_reason: "no pattern matched".to_string(),
			created_at,
			resolved: false,
			resolution: None,
			resolved_at: None,
		}
	}

	#[tokio::test]
	async fn resolution_frequency_groups_identical_payloads() {
		let store = MemoryStore::new();
		let now = OffsetDateTime::now_utc();
		let shared = json!({ "type": "schedule", "person": "Xyz" });

		for (offset, command, resolution) in [
			(0, "alpha", &shared),
			(1, "beta", &json!({ "type": "query" })),
			(2, "gamma", &shared),
		] {
			store
				.upsert_resolution(&failure(command, now + Duration::seconds(offset)), resolution)
				.await
				.expect("Failed to resolve.");
		}

		let rows = store.resolved_commands().await.expect("Failed to list.");
		let order =
			rows.iter().map(|row| (row.command.as_str(), row.frequency)).collect::<Vec<_>>();

		assert_eq!(order, vec![("gamma", 2), ("alpha", 2), ("beta", 1)]);
	}

	#[tokio::test]
	async fn pending_failures_are_newest_first_and_limited() {
		let store = MemoryStore::new();
		let now = OffsetDateTime::now_utc();

		for (offset, command) in [(0, "one"), (5, "two"), (9, "three")] {
			store
				.insert_failure(&failure(command, now + Duration::seconds(offset)))
				.await
				.expect("Failed to insert.");
		}

		let rows = store.pending_failures(2).await.expect("Failed to list.");

		assert_eq!(
			rows.iter().map(|row| row.command.as_str()).collect::<Vec<_>>(),
			["three", "two"]
		);
	}

	#[tokio::test]
	async fn unknown_pattern_outcome_is_not_found() {
		let store = MemoryStore::new();
		let result =
			store.record_pattern_outcome(Uuid::new_v4(), true, OffsetDateTime::now_utc()).await;

		assert!(matches!(result, Err(Error::NotFound { .. })));
	}
}
