//! Generalized matching templates derived from an operator's schedule correction.

use serde_json::{Value, json};

pub const SCHEDULE_KIND: &str = "schedule";

const NAME_SLOT: &str = r"([\w\s]+?)";
const TIME_SLOT: &str = r"(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)";
const PHRASINGS: [&str; 4] =
	["schedule meeting with", "meet with", "set up meeting with", "book meeting with"];

#[derive(Clone, Debug, PartialEq)]
pub struct DerivedPattern {
	pub kind: &'static str,
	pub pattern: String,
	pub template: Value,
}

/// One pattern per common scheduling phrasing, with the corrected person and time replaced
/// by capture groups. The template keeps the corrected person for later reference.
pub fn derive_schedule_patterns(person: &str) -> Vec<DerivedPattern> {
	let template = json!({ "person": person, "time_format": "flexible" });

	PHRASINGS
		.iter()
		.map(|phrase| DerivedPattern {
			kind: SCHEDULE_KIND,
			pattern: format!("{phrase} {NAME_SLOT} at {TIME_SLOT}"),
			template: template.clone(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use regex::Regex;

	use super::*;

	#[test]
	fn derives_one_pattern_per_phrasing() {
		let patterns = derive_schedule_patterns("Xyz");

		assert_eq!(patterns.len(), PHRASINGS.len());
		assert!(patterns.iter().all(|pattern| pattern.kind == SCHEDULE_KIND));
		assert_eq!(patterns[0].template, json!({ "person": "Xyz", "time_format": "flexible" }));
	}

	#[test]
	fn derived_patterns_are_valid_regexes_that_capture_slots() {
		let patterns = derive_schedule_patterns("Xyz");
		let regex = Regex::new(&patterns[3].pattern).expect("Expected derived pattern to compile.");
		let caps =
			regex.captures("book meeting with dana at 10:30am").expect("Expected phrasing to match.");

		assert_eq!(&caps[1], "dana");
		assert_eq!(&caps[2], "10:30am");
	}
}
