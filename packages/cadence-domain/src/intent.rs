use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Structured result of interpreting one command. Every input yields exactly one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
	Schedule {
		person: String,
		#[serde(with = "time::serde::rfc3339")]
		when: OffsetDateTime,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		agenda: Option<String>,
	},
	Query {
		scope: QueryScope,
	},
	MissingTime {
		person: String,
	},
	Unrecognized,
}
impl Intent {
	pub fn kind(&self) -> IntentKind {
		match self {
			Self::Schedule { .. } => IntentKind::Schedule,
			Self::Query { .. } => IntentKind::Query,
			Self::MissingTime { .. } => IntentKind::MissingTime,
			Self::Unrecognized => IntentKind::Unrecognized,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryScope {
	Meetings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
	Schedule,
	Query,
	MissingTime,
	Unrecognized,
}
impl IntentKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Schedule => "schedule",
			Self::Query => "query",
			Self::MissingTime => "missing_time",
			Self::Unrecognized => "unrecognized",
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use time::macros::datetime;

	use super::*;

	#[test]
	fn schedule_serializes_with_iso_timestamp() {
		let intent = Intent::Schedule {
			person: "Alice".to_string(),
			when: datetime!(2026-03-14 15:00:00 UTC),
			agenda: None,
		};
		let value = serde_json::to_value(&intent).expect("Failed to serialize intent.");

		assert_eq!(
			value,
			json!({ "kind": "schedule", "person": "Alice", "when": "2026-03-14T15:00:00Z" })
		);
	}

	#[test]
	fn unit_cases_carry_only_their_tag() {
		assert_eq!(
			serde_json::to_value(Intent::Unrecognized).expect("Failed to serialize intent."),
			json!({ "kind": "unrecognized" })
		);
		assert_eq!(
			serde_json::to_value(Intent::Query { scope: QueryScope::Meetings })
				.expect("Failed to serialize intent."),
			json!({ "kind": "query", "scope": "meetings" })
		);
	}
}
