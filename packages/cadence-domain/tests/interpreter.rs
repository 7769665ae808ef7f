use time::{OffsetDateTime, macros::datetime};

use cadence_config::{Interpreter, Meridiem, MeridiemRule};
use cadence_domain::{CommandInterpreter, Intent, IntentKind, QueryScope};

const NOW: OffsetDateTime = datetime!(2026-03-14 08:05:09 UTC);

fn interpreter() -> CommandInterpreter {
	CommandInterpreter::new(&Interpreter::default()).expect("Expected default interpreter.")
}

fn schedule(person: &str, when: OffsetDateTime, agenda: Option<&str>) -> Intent {
	Intent::Schedule { person: person.to_string(), when, agenda: agenda.map(str::to_string) }
}

#[test]
fn bare_business_hour_resolves_to_afternoon_today() {
	assert_eq!(
		interpreter().interpret("schedule meeting with john at 3", NOW),
		schedule("John", datetime!(2026-03-14 15:00 UTC), None)
	);
}

#[test]
fn separator_without_meridiem_defaults_to_pm() {
	assert_eq!(
		interpreter().interpret("meet john at 3:30", NOW),
		schedule("John", datetime!(2026-03-14 15:30 UTC), None)
	);
}

#[test]
fn person_without_time_is_missing_time() {
	assert_eq!(
		interpreter().interpret("schedule meeting with bob", NOW),
		Intent::MissingTime { person: "Bob".to_string() }
	);
}

#[test]
fn listing_phrase_is_a_query() {
	assert_eq!(
		interpreter().interpret("how many meetings today", NOW),
		Intent::Query { scope: QueryScope::Meetings }
	);
}

#[test]
fn explicit_pm_with_person_is_honored() {
	for (text, person, hour) in [
		("schedule meeting with alice at 4pm", "Alice", 16),
		("set up a meeting with dr smith at 11pm", "Dr Smith", 23),
		("meeting with jane at 2 pm", "Jane", 14),
		("meeting with carlos at 12pm", "Carlos", 12),
	] {
		match interpreter().interpret(text, NOW) {
			Intent::Schedule { person: got, when, .. } => {
				assert_eq!(got, person, "Person mismatch for {text:?}.");
				assert_eq!(when.hour(), hour, "Hour mismatch for {text:?}.");
				assert_eq!(when.date(), NOW.date(), "Date mismatch for {text:?}.");
			},
			other => panic!("Expected schedule for {text:?}, got {other:?}."),
		}
	}
}

#[test]
fn with_phrasings_capture_the_bare_person() {
	for lead in ["meet with", "schedule with", "set up a meeting with", "book meeting with"] {
		for (name, person) in [("bob", "Bob"), ("dr smith", "Dr Smith"), ("mary jane", "Mary Jane")]
		{
			for (time, hour, minute) in [("3pm", 15, 0), ("4:30", 16, 30), ("10", 22, 0)] {
				let text = format!("{lead} {name} at {time}");

				match interpreter().interpret(&text, NOW) {
					Intent::Schedule { person: got, when, agenda } => {
						assert_eq!(got, person, "Person mismatch for {text:?}.");
						assert_eq!(
							(when.hour(), when.minute()),
							(hour, minute),
							"Time mismatch for {text:?}."
						);
						assert_eq!(agenda, None, "Agenda mismatch for {text:?}.");
					},
					other => panic!("Expected schedule for {text:?}, got {other:?}."),
				}
			}
		}
	}
}

#[test]
fn tomorrow_and_agenda_are_applied() {
	assert_eq!(
		interpreter()
			.interpret("Schedule meeting with Alice at 3pm tomorrow for budget review", NOW),
		schedule("Alice", datetime!(2026-03-15 15:00 UTC), Some("budget review"))
	);
}

#[test]
fn bare_hours_default_to_pm() {
	assert_eq!(
		interpreter().interpret("schedule charlie at 9", NOW),
		schedule("Charlie", datetime!(2026-03-14 21:00 UTC), None)
	);
	assert_eq!(
		interpreter().interpret("schedule meeting with john at 9", NOW),
		schedule("John", datetime!(2026-03-14 21:00 UTC), None)
	);
	assert_eq!(
		interpreter().interpret("schedule meeting with john at 10", NOW),
		schedule("John", datetime!(2026-03-14 22:00 UTC), None)
	);
	assert_eq!(
		interpreter().interpret("schedule meeting with john at 3", NOW),
		schedule("John", datetime!(2026-03-14 15:00 UTC), None)
	);
}

#[test]
fn compact_minutes_reach_the_wide_rule() {
	assert_eq!(
		interpreter().interpret("meet dana at 430pm", NOW),
		schedule("Dana", datetime!(2026-03-14 16:30 UTC), None)
	);
}

#[test]
fn invalid_time_token_is_unrecognized() {
	assert_eq!(
		interpreter().interpret("schedule meeting with john at 99", NOW),
		Intent::Unrecognized
	);
}

#[test]
fn unrelated_text_is_unrecognized() {
	let intent = interpreter().interpret("what's the weather like", NOW);

	assert_eq!(intent.kind(), IntentKind::Unrecognized);
}

#[test]
fn meridiem_table_is_configurable() {
	let cfg = Interpreter {
		meridiem_rules: vec![MeridiemRule { min_hour: 1, max_hour: 12, meridiem: Meridiem::Am }],
		separator_meridiem: Meridiem::Am,
		..Interpreter::default()
	};
	let interpreter = CommandInterpreter::new(&cfg).expect("Expected custom interpreter.");

	assert_eq!(
		interpreter.interpret("meet john at 3", NOW),
		schedule("John", datetime!(2026-03-14 03:00 UTC), None)
	);
	assert_eq!(
		interpreter.interpret("meet john at 3:30", NOW),
		schedule("John", datetime!(2026-03-14 03:30 UTC), None)
	);
}

#[test]
fn schedule_keeps_reference_offset() {
	let now = datetime!(2026-03-14 23:30 +05:30);

	assert_eq!(
		interpreter().interpret("meet john at 10am", now),
		schedule("John", datetime!(2026-03-14 10:00 +05:30), None)
	);
}
