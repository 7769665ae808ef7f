use std::collections::HashSet;

/// Whitespace tokens of the lower-cased text.
pub fn token_set(text: &str) -> HashSet<String> {
	text.split_whitespace().map(str::to_lowercase).collect()
}

/// Token overlap divided by the size of the larger token set.
///
/// Returns 0.0 when both sides are empty so blank input never looks like a perfect match.
pub fn lexical_similarity(left: &str, right: &str) -> f32 {
	let left = token_set(left);
	let right = token_set(right);
	let denom = left.len().max(right.len());

	if denom == 0 {
		return 0.0;
	}

	left.intersection(&right).count() as f32 / denom as f32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_commands_score_one() {
		assert_eq!(
			lexical_similarity("schedule meeting with xyz", "Schedule  meeting with XYZ"),
			1.0
		);
	}

	#[test]
	fn overlap_is_divided_by_larger_set() {
		// {meet, xyz, at} vs {schedule, meeting, with, xyz, at, 5pm}: 2 shared of 6.
		let score = lexical_similarity("meet xyz at", "schedule meeting with xyz at 5pm");

		assert!((score - 2.0 / 6.0).abs() < f32::EPSILON);
	}

	#[test]
	fn duplicate_tokens_count_once() {
		assert_eq!(lexical_similarity("bob bob bob", "bob"), 1.0);
	}

	#[test]
	fn empty_inputs_score_zero() {
		assert_eq!(lexical_similarity("", ""), 0.0);
		assert_eq!(lexical_similarity("   ", "bob"), 0.0);
	}
}
