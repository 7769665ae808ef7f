/// Confidence after recording one more use of a learned pattern.
///
/// `success_count` and `usage_count` are the counts before this use. The result is the new
/// success ratio, so a fresh pattern lands on exactly 1.0 or 0.0 after its first use.
pub fn next_confidence(success_count: i64, usage_count: i64, success: bool) -> f32 {
	let successes = if success { success_count + 1 } else { success_count };
	let uses = usage_count + 1;

	if uses <= 0 {
		return 0.0;
	}

	(successes as f64 / uses as f64).clamp(0.0, 1.0) as f32
}
