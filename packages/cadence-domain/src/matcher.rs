//! Ordered rule cascade that pulls a person, time token, relative-day marker, and agenda out
//! of normalized command text.

use regex::{Captures, Regex};

const TIME_NARROW: &str = r"\d{1,2}(?::\d{2})?\s*(?:am|pm)?|\d{1,2}";
const TIME_WIDE: &str = r"\d{1,4}(?::\d{2})?(?:\s*(?:am|pm))?";
const TAIL: &str = r"(?:\s*(tomorrow))?(?:\s+for\s+(.+?))?\s*$";

/// Schedule rules in precedence order. The rules overlap on purpose: each later rule
/// loosens how "with" is required or widens the time-token class, so phrasing variants the
/// stricter rules miss still land.
const SCHEDULE_RULES: [(&str, &str, &str); 4] = [
	(
		"meeting_with",
		r"(?:schedule|meet|meeting)?\s*meeting?\s*with\s+([\w\s]+?)\s+at\s+",
		TIME_NARROW,
	),
	("person_at", r"(?:schedule|meet|meeting)?\s*([\w\s]+?)\s+at\s+", TIME_NARROW),
	(
		"optional_with",
		r"(?:schedule|meet|meeting)?\s*(?:meeting)?\s*(?:with)?\s*([\w\s]+?)\s+at\s+",
		TIME_NARROW,
	),
	(
		"optional_with_wide_time",
		r"(?:schedule|meet|meeting)?\s*(?:meeting)?\s*(?:with)?\s*([\w\s]+?)\s+at\s+",
		TIME_WIDE,
	),
];
const PERSON_RULES: [(&str, &str); 2] = [
	("meeting_with_person", r"(?:schedule|meet|meeting)?\s*meeting?\s*with\s*([\w\s]+)"),
	("meeting_person", r"(?:schedule|meet|meeting)?\s*meeting?\s*([\w\s]+)"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleCapture {
	pub person: String,
	pub time_token: String,
	pub tomorrow: bool,
	pub agenda: Option<String>,
}

#[derive(Debug)]
pub struct ScheduleRule {
	pub name: &'static str,
	regex: Regex,
}
impl ScheduleRule {
	pub fn capture(&self, text: &str) -> Option<ScheduleCapture> {
		let caps = self.regex.captures(text)?;
		let person = person_name(group(&caps, 1)?);
		let time_token = group(&caps, 2)?.trim().to_string();
		let tomorrow = caps.get(3).is_some();
		let agenda = group(&caps, 4).map(str::trim).filter(|agenda| !agenda.is_empty());

		if person.is_empty() {
			return None;
		}

		Some(ScheduleCapture { person, time_token, tomorrow, agenda: agenda.map(str::to_string) })
	}
}

#[derive(Debug)]
struct PersonRule {
	name: &'static str,
	regex: Regex,
}
impl PersonRule {
	fn capture(&self, text: &str) -> Option<String> {
		let caps = self.regex.captures(text)?;
		let person = person_name(group(&caps, 1)?);

		(!person.is_empty()).then_some(person)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
	Query,
	Schedule { rule: &'static str, capture: ScheduleCapture },
	PersonOnly { rule: &'static str, person: String },
	NoMatch,
}

#[derive(Debug)]
pub struct Matcher {
	query_phrases: Vec<String>,
	schedule_rules: Vec<ScheduleRule>,
	person_rules: Vec<PersonRule>,
}
impl Matcher {
	pub fn new(query_phrases: &[String]) -> Result<Self, regex::Error> {
		let schedule_rules = SCHEDULE_RULES
			.iter()
			.map(|&(name, head, time)| {
				Ok(ScheduleRule { name, regex: Regex::new(&format!("{head}({time}){TAIL}"))? })
			})
			.collect::<Result<Vec<_>, regex::Error>>()?;
		let person_rules = PERSON_RULES
			.iter()
			.map(|&(name, pattern)| Ok(PersonRule { name, regex: Regex::new(pattern)? }))
			.collect::<Result<Vec<_>, regex::Error>>()?;
		let query_phrases = query_phrases
			.iter()
			.map(|phrase| phrase.trim().to_lowercase())
			.filter(|phrase| !phrase.is_empty())
			.collect();

		Ok(Self { query_phrases, schedule_rules, person_rules })
	}

	pub fn schedule_rules(&self) -> &[ScheduleRule] {
		&self.schedule_rules
	}

	/// Runs the cascade over lower-cased, trimmed text. The first step that produces a result
	/// wins.
	pub fn match_text(&self, text: &str) -> MatchOutcome {
		if self.query_phrases.iter().any(|phrase| text.contains(phrase.as_str())) {
			return MatchOutcome::Query;
		}

		for rule in &self.schedule_rules {
			if let Some(capture) = rule.capture(text) {
				return MatchOutcome::Schedule { rule: rule.name, capture };
			}
		}
		for rule in &self.person_rules {
			if let Some(person) = rule.capture(text) {
				return MatchOutcome::PersonOnly { rule: rule.name, person };
			}
		}

		MatchOutcome::NoMatch
	}
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut prev_alpha = false;

	for ch in input.chars() {
		if ch.is_alphabetic() {
			if prev_alpha {
				out.extend(ch.to_lowercase());
			} else {
				out.extend(ch.to_uppercase());
			}

			prev_alpha = true;
		} else {
			out.push(ch);

			prev_alpha = false;
		}
	}

	out
}

/// Looser rules can swallow the "with" in "meet with bob", so it is dropped before
/// title-casing.
fn person_name(raw: &str) -> String {
	let raw = raw.trim();
	let raw = raw
		.strip_prefix("with")
		.filter(|rest| rest.starts_with(char::is_whitespace))
		.map_or(raw, str::trim_start);

	title_case(raw)
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
	caps.get(index).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher() -> Matcher {
		Matcher::new(&cadence_config::default_query_phrases()).expect("Expected rules to compile.")
	}

	fn schedule(text: &str) -> (&'static str, ScheduleCapture) {
		match matcher().match_text(text) {
			MatchOutcome::Schedule { rule, capture } => (rule, capture),
			other => panic!("Expected schedule match for {text:?}, got {other:?}."),
		}
	}

	#[test]
	fn rule_order_is_stable() {
		let names = matcher().schedule_rules().iter().map(|rule| rule.name).collect::<Vec<_>>();

		assert_eq!(
			names,
			vec!["meeting_with", "person_at", "optional_with", "optional_with_wide_time"]
		);
	}

	#[test]
	fn strict_rule_captures_every_slot() {
		let (rule, capture) =
			schedule("schedule meeting with alice at 3pm tomorrow for budget review");

		assert_eq!(rule, "meeting_with");
		assert_eq!(
			capture,
			ScheduleCapture {
				person: "Alice".to_string(),
				time_token: "3pm".to_string(),
				tomorrow: true,
				agenda: Some("budget review".to_string()),
			}
		);
	}

	#[test]
	fn without_with_falls_through_to_looser_rule() {
		let (rule, capture) = schedule("meet john at 3:30");

		assert_eq!(rule, "person_at");
		assert_eq!(capture.person, "John");
		assert_eq!(capture.time_token, "3:30");
		assert!(!capture.tomorrow);
		assert_eq!(capture.agenda, None);
	}

	#[test]
	fn leading_with_is_not_part_of_the_person() {
		for text in ["meet with bob at 3pm", "schedule with bob at 3pm"] {
			let (rule, capture) = schedule(text);

			assert_eq!(rule, "person_at", "Rule mismatch for {text:?}.");
			assert_eq!(capture.person, "Bob", "Person mismatch for {text:?}.");
		}

		assert_eq!(schedule("meet withers at 3pm").1.person, "Withers");
	}

	#[test]
	fn compact_time_only_matches_wide_rule() {
		let (rule, capture) = schedule("meet mary jane at 430pm");

		assert_eq!(rule, "optional_with_wide_time");
		assert_eq!(capture.person, "Mary Jane");
		assert_eq!(capture.time_token, "430pm");
	}

	#[test]
	fn query_phrase_short_circuits_schedule_rules() {
		assert_eq!(matcher().match_text("list meetings with bob at 3"), MatchOutcome::Query);
		assert_eq!(matcher().match_text("how many meetings today"), MatchOutcome::Query);
	}

	#[test]
	fn person_without_time_is_detected() {
		assert_eq!(
			matcher().match_text("schedule meeting with bob"),
			MatchOutcome::PersonOnly { rule: "meeting_with_person", person: "Bob".to_string() }
		);
	}

	#[test]
	fn unrelated_text_matches_nothing() {
		assert_eq!(matcher().match_text("what is the weather"), MatchOutcome::NoMatch);
		assert_eq!(matcher().match_text(""), MatchOutcome::NoMatch);
	}

	#[test]
	fn title_case_handles_word_boundaries() {
		assert_eq!(title_case("mary  JANE"), "Mary  Jane");
		assert_eq!(title_case("o_neil 2nd"), "O_Neil 2Nd");
	}
}
