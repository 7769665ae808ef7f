mod support;

use time::{OffsetDateTime, macros::datetime};

use cadence_domain::{Intent, QueryScope};
use cadence_service::{CorrectionRequest, Interpretation, SuggestionStage};

const NOW: OffsetDateTime = datetime!(2026-03-14 08:05:09 UTC);

#[tokio::test]
async fn cascade_answers_when_history_is_empty() {
	let (service, _) = support::memory_service();
	let interpretation =
		service.interpret_at("schedule meeting with john at 3", NOW).await.expect("Interpret.");

	assert_eq!(
		interpretation.intent(),
		Some(&Intent::Schedule {
			person: "John".to_string(),
			when: datetime!(2026-03-14 15:00 UTC),
			agenda: None,
		})
	);
	assert_eq!(service.learning.stats().await.expect("Stats.").pending, 0);
}

#[tokio::test]
async fn corrected_command_is_suggested_from_history() {
	let (service, _) = support::memory_service();

	service
		.learning
		.record_correction(CorrectionRequest {
			command: "schedule meeting with xyz".to_string(),
			resolution: support::schedule_resolution("Xyz", "5pm"),
		})
		.await
		.expect("Correction.");

	let interpretation =
		service.interpret_at("Schedule meeting with XYZ", NOW).await.expect("Interpret.");

	match interpretation {
		Interpretation::Suggestion { stage, suggestion } => {
			assert_eq!(stage, SuggestionStage::History);
			assert_eq!(suggestion.based_on, "schedule meeting with xyz");
			assert_eq!(suggestion.confidence, 1.0);
			assert_eq!(suggestion.suggestion.person.as_deref(), Some("Xyz"));
			assert_eq!(suggestion.suggestion.time.as_deref(), Some("5pm"));
		},
		other => panic!("Expected a history suggestion, got {other:?}."),
	}
}

#[tokio::test]
async fn listing_query_wins_over_a_corrected_command() {
	let (service, _) = support::memory_service();

	service
		.learning
		.record_correction(CorrectionRequest {
			command: "list meetings".to_string(),
			resolution: support::schedule_resolution("Lister", "9am"),
		})
		.await
		.expect("Correction.");

	let interpretation = service.interpret_at("List meetings", NOW).await.expect("Interpret.");

	assert_eq!(interpretation.intent(), Some(&Intent::Query { scope: QueryScope::Meetings }));
	assert_eq!(service.learning.stats().await.expect("Stats.").resolved, 1);
}

#[tokio::test]
async fn partial_history_match_does_not_preempt_the_cascade() {
	let (service, _) = support::memory_service();

	service
		.learning
		.record_correction(CorrectionRequest {
			command: "schedule meeting with john at 3 sharp".to_string(),
			resolution: support::schedule_resolution("Johnny", "3pm"),
		})
		.await
		.expect("Correction.");

	let interpretation =
		service.interpret_at("schedule meeting with john at 3", NOW).await.expect("Interpret.");

	assert!(matches!(
		interpretation.intent(),
		Some(Intent::Schedule { person, .. }) if person == "John"
	));
}

#[tokio::test]
async fn unmatched_command_is_recorded_and_unrecognized() {
	let (service, _) = support::memory_service();
	let interpretation =
		service.interpret_at("what's the weather like", NOW).await.expect("Interpret.");

	assert_eq!(interpretation.intent(), Some(&Intent::Unrecognized));

	let pending = service.learning.list_failed_commands(None).await.expect("List.");

	assert_eq!(pending.items.len(), 1);
	assert_eq!(pending.items[0].command, "what's the weather like");
	assert_eq!(pending.items[0].reason, "no pattern matched");
}

#[tokio::test]
async fn invalid_time_is_recorded_with_its_token() {
	let (service, _) = support::memory_service();
	let interpretation =
		service.interpret_at("schedule meeting with john at 99", NOW).await.expect("Interpret.");

	assert_eq!(interpretation.intent(), Some(&Intent::Unrecognized));

	let pending = service.learning.list_failed_commands(None).await.expect("List.");

	assert_eq!(pending.items[0].reason, "invalid time token \"99\"");
}

#[tokio::test]
async fn repeated_failures_keep_one_record() {
	let (service, _) = support::memory_service();

	for _ in 0..3 {
		service.interpret_at("ping kim about the budget", NOW).await.expect("Interpret.");
	}

	assert_eq!(service.learning.stats().await.expect("Stats.").pending, 1);
}

#[tokio::test]
async fn failed_cascade_falls_back_to_closest_resolution() {
	let (service, _) = support::memory_service();

	service
		.learning
		.record_correction(CorrectionRequest {
			command: "ping kim about the budget review".to_string(),
			resolution: support::schedule_resolution("Kim", "10am"),
		})
		.await
		.expect("Correction.");

	let interpretation =
		service.interpret_at("ping kim about the budget", NOW).await.expect("Interpret.");

	match interpretation {
		Interpretation::Suggestion { stage, suggestion } => {
			assert_eq!(stage, SuggestionStage::Fallback);
			assert_eq!(suggestion.based_on, "ping kim about the budget review");
			assert!((suggestion.confidence - 5.0 / 6.0).abs() < 1e-6);
		},
		other => panic!("Expected a fallback suggestion, got {other:?}."),
	}

	let stats = service.learning.stats().await.expect("Stats.");

	assert_eq!((stats.pending, stats.resolved), (1, 1));
}

#[tokio::test]
async fn blank_command_is_unrecognized_without_recording() {
	let (service, _) = support::memory_service();
	let interpretation = service.interpret_at("   ", NOW).await.expect("Interpret.");

	assert_eq!(interpretation.intent(), Some(&Intent::Unrecognized));
	assert_eq!(service.learning.stats().await.expect("Stats.").pending, 0);
}

#[test]
fn interpretation_is_tagged_on_the_wire() {
	let value = serde_json::to_value(Interpretation::Intent { intent: Intent::Unrecognized })
		.expect("Serialize.");

	assert_eq!(
		value,
		serde_json::json!({ "outcome": "intent", "intent": { "kind": "unrecognized" } })
	);
}
