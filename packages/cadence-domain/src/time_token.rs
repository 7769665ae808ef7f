//! Normalization of loosely formatted time tokens ("4", "4pm", "430pm", "4:30") into a
//! concrete time of day on a reference date.

use time::{OffsetDateTime, Time};

use cadence_config::{Interpreter, Meridiem, MeridiemRule};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
	#[error("Time token {token:?} is not a recognizable time of day.")]
	InvalidTime { token: String },
}

/// Meridiem choices for tokens that do not carry one.
#[derive(Clone, Debug)]
pub struct MeridiemPolicy {
	rules: Vec<MeridiemRule>,
	fallback: Meridiem,
	separator: Meridiem,
}
impl MeridiemPolicy {
	pub fn from_config(cfg: &Interpreter) -> Self {
		Self {
			rules: cfg.meridiem_rules.clone(),
			fallback: cfg.fallback_meridiem,
			separator: cfg.separator_meridiem,
		}
	}

	/// Meridiem for a bare hour in 1..=12.
	pub fn bare_hour(&self, hour: u8) -> Meridiem {
		self.rules
			.iter()
			.find(|rule| (rule.min_hour..=rule.max_hour).contains(&hour))
			.map(|rule| rule.meridiem)
			.unwrap_or(self.fallback)
	}

	/// Meridiem for an "h:mm" token without one.
	pub fn separator(&self) -> Meridiem {
		self.separator
	}
}
impl Default for MeridiemPolicy {
	fn default() -> Self {
		Self::from_config(&Interpreter::default())
	}
}

/// Wall-clock time in 24-hour form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTime {
	pub hour: u8,
	pub minute: u8,
}

/// Concrete formats tried after canonicalization. Order is precedence; the first format that
/// parses wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockFormat {
	/// "4:30 pm"
	HourMinuteMeridiem,
	/// "4 pm"
	HourMeridiem,
	/// "4:30pm"
	HourMinuteMeridiemCompact,
	/// "4pm"
	HourMeridiemCompact,
	/// "16:30"
	HourMinute,
	/// "16"
	Hour,
}
impl ClockFormat {
	pub const ORDERED: [Self; 6] = [
		Self::HourMinuteMeridiem,
		Self::HourMeridiem,
		Self::HourMinuteMeridiemCompact,
		Self::HourMeridiemCompact,
		Self::HourMinute,
		Self::Hour,
	];

	pub fn parse(self, input: &str) -> Option<ClockTime> {
		match self {
			Self::HourMinuteMeridiem => {
				let (clock, meridiem) = input.split_once(' ')?;
				let (hour, minute) = clock.split_once(':')?;

				twelve_hour(parse_hour_12(hour)?, parse_minute(minute)?, parse_meridiem(meridiem)?)
			},
			Self::HourMeridiem => {
				let (hour, meridiem) = input.split_once(' ')?;

				twelve_hour(parse_hour_12(hour)?, 0, parse_meridiem(meridiem)?)
			},
			Self::HourMinuteMeridiemCompact => {
				let (clock, meridiem) = split_meridiem(input)?;
				let (hour, minute) = clock.split_once(':')?;

				twelve_hour(parse_hour_12(hour)?, parse_minute(minute)?, meridiem)
			},
			Self::HourMeridiemCompact => {
				let (hour, meridiem) = split_meridiem(input)?;

				twelve_hour(parse_hour_12(hour)?, 0, meridiem)
			},
			Self::HourMinute => {
				let (hour, minute) = input.split_once(':')?;

				Some(ClockTime { hour: parse_hour_24(hour)?, minute: parse_minute(minute)? })
			},
			Self::Hour => Some(ClockTime { hour: parse_hour_24(input)?, minute: 0 }),
		}
	}
}

/// Resolves `token` to a time of day on `reference`'s calendar date.
///
/// Relative-day markers are not handled here; callers add the day offset afterwards.
pub fn normalize_time_token(
	token: &str,
	reference: OffsetDateTime,
	policy: &MeridiemPolicy,
) -> Result<OffsetDateTime, NormalizeError> {
	let clock = parse_clock(token, policy)?;
	let time = Time::from_hms(clock.hour, clock.minute, 0)
		.map_err(|_| NormalizeError::InvalidTime { token: token.trim().to_string() })?;

	Ok(reference.replace_time(time))
}

pub fn parse_clock(token: &str, policy: &MeridiemPolicy) -> Result<ClockTime, NormalizeError> {
	let canonical = canonicalize(token, policy);

	ClockFormat::ORDERED
		.iter()
		.find_map(|format| format.parse(&canonical))
		.ok_or_else(|| NormalizeError::InvalidTime { token: token.trim().to_string() })
}

/// Rewrites a raw token into the spelling the concrete formats expect.
pub fn canonicalize(token: &str, policy: &MeridiemPolicy) -> String {
	let raw = token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

	// Bare hour: "4" -> "4:00 pm" via the hour-range table.
	if is_digits(&raw)
		&& let Ok(hour) = raw.parse::<u8>()
		&& (1..=12).contains(&hour)
	{
		return format!("{hour}:00 {}", meridiem_label(policy.bare_hour(hour)));
	}

	let meridiem = split_meridiem(&raw);

	// Short meridiem form: "4pm" -> "4:00 pm".
	if let Some((digits, meridiem)) = meridiem
		&& raw.len() <= 4
		&& !raw.contains(':')
	{
		let digits = digits.trim();

		if is_digits(digits) {
			return format!("{digits}:00 {}", meridiem_label(meridiem));
		}
	}

	// Separator without meridiem: "4:30" -> "4:30 pm".
	if meridiem.is_none() && raw.contains(':') {
		return format!("{raw} {}", meridiem_label(policy.separator()));
	}

	// Run-together digits: "430pm" -> "4:30 pm", "11am" -> "11:00 am".
	if let Some((digits, meridiem)) = meridiem
		&& (3..=5).contains(&raw.len())
		&& is_digits(digits)
	{
		let label = meridiem_label(meridiem);

		if digits.len() <= 2 {
			return format!("{digits}:00 {label}");
		}

		let (hour, minute) = digits.split_at(digits.len() - 2);

		return format!("{hour}:{minute} {label}");
	}

	raw
}

pub fn meridiem_label(meridiem: Meridiem) -> &'static str {
	match meridiem {
		Meridiem::Am => "am",
		Meridiem::Pm => "pm",
	}
}

fn split_meridiem(input: &str) -> Option<(&str, Meridiem)> {
	if let Some(rest) = input.strip_suffix("am") {
		return Some((rest, Meridiem::Am));
	}

	input.strip_suffix("pm").map(|rest| (rest, Meridiem::Pm))
}

fn parse_meridiem(input: &str) -> Option<Meridiem> {
	match input {
		"am" => Some(Meridiem::Am),
		"pm" => Some(Meridiem::Pm),
		_ => None,
	}
}

fn parse_hour_12(input: &str) -> Option<u8> {
	parse_small_number(input).filter(|hour| (1..=12).contains(hour))
}

fn parse_hour_24(input: &str) -> Option<u8> {
	parse_small_number(input).filter(|hour| *hour <= 23)
}

fn parse_minute(input: &str) -> Option<u8> {
	parse_small_number(input).filter(|minute| *minute <= 59)
}

fn parse_small_number(input: &str) -> Option<u8> {
	if !(1..=2).contains(&input.len()) || !is_digits(input) {
		return None;
	}

	input.parse().ok()
}

fn twelve_hour(hour: u8, minute: u8, meridiem: Meridiem) -> Option<ClockTime> {
	let hour = match meridiem {
		Meridiem::Am => hour % 12,
		Meridiem::Pm => hour % 12 + 12,
	};

	Some(ClockTime { hour, minute })
}

fn is_digits(input: &str) -> bool {
	!input.is_empty() && input.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn clock(token: &str) -> Result<ClockTime, NormalizeError> {
		parse_clock(token, &MeridiemPolicy::default())
	}

	#[test]
	fn bare_hours_follow_the_hour_range_table() {
		assert_eq!(clock("3"), Ok(ClockTime { hour: 15, minute: 0 }));
		assert_eq!(clock("7"), Ok(ClockTime { hour: 19, minute: 0 }));
		assert_eq!(clock("9"), Ok(ClockTime { hour: 21, minute: 0 }));
		assert_eq!(clock("11"), Ok(ClockTime { hour: 23, minute: 0 }));
		assert_eq!(clock("12"), Ok(ClockTime { hour: 12, minute: 0 }));
	}

	#[test]
	fn uncovered_bare_hour_uses_fallback() {
		let policy = MeridiemPolicy {
			rules: Vec::new(),
			fallback: Meridiem::Am,
			separator: Meridiem::Pm,
		};

		assert_eq!(parse_clock("4", &policy), Ok(ClockTime { hour: 4, minute: 0 }));
	}

	#[test]
	fn canonical_rewrites_follow_rule_precedence() {
		let policy = MeridiemPolicy::default();

		assert_eq!(canonicalize("4pm", &policy), "4:00 pm");
		assert_eq!(canonicalize("4:30", &policy), "4:30 pm");
		assert_eq!(canonicalize("430pm", &policy), "4:30 pm");
		assert_eq!(canonicalize("11am", &policy), "11:00 am");
		assert_eq!(canonicalize(" 4  PM ", &policy), "4:00 pm");
		assert_eq!(canonicalize("16", &policy), "16");
	}

	#[test]
	fn parses_each_concrete_format() {
		assert_eq!(clock("4:30 pm"), Ok(ClockTime { hour: 16, minute: 30 }));
		assert_eq!(clock("10:15am"), Ok(ClockTime { hour: 10, minute: 15 }));
		assert_eq!(clock("12am"), Ok(ClockTime { hour: 0, minute: 0 }));
		assert_eq!(clock("16:45"), Ok(ClockTime { hour: 16, minute: 45 }));
		assert_eq!(clock("0"), Ok(ClockTime { hour: 0, minute: 0 }));
		assert_eq!(clock("18"), Ok(ClockTime { hour: 18, minute: 0 }));
	}

	#[test]
	fn rejects_tokens_no_format_accepts() {
		for token in ["25", "13pm", "4:75", "noon", "1230pm", ""] {
			assert!(
				matches!(clock(token), Err(NormalizeError::InvalidTime { .. })),
				"Expected {token:?} to be rejected."
			);
		}
	}

	#[test]
	fn rebases_onto_reference_date() {
		let reference = datetime!(2026-03-14 08:05:09 UTC);
		let resolved = normalize_time_token("4:30", reference, &MeridiemPolicy::default())
			.expect("Expected token to normalize.");

		assert_eq!(resolved, datetime!(2026-03-14 16:30:00 UTC));
	}
}
