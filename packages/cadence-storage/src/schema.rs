/// Full bootstrap SQL with every `\ir` include inlined.
pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		match line.trim().strip_prefix("\\ir ").map(str::trim) {
			Some("00_extensions.sql") =>
				out.push_str(include_str!("../../../sql/00_extensions.sql")),
			Some("tables/001_failed_commands.sql") =>
				out.push_str(include_str!("../../../sql/tables/001_failed_commands.sql")),
			Some("tables/002_learned_patterns.sql") =>
				out.push_str(include_str!("../../../sql/tables/002_learned_patterns.sql")),
			Some("tables/003_suggestion_feedback.sql") =>
				out.push_str(include_str!("../../../sql/tables/003_suggestion_feedback.sql")),
			_ => out.push_str(line),
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_fully_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "), "Unexpanded include in schema: {sql}");

		for table in ["failed_commands", "learned_patterns", "suggestion_feedback"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
				"Schema is missing {table}."
			);
		}
	}

	#[test]
	fn learned_patterns_are_unique_per_kind_and_template() {
		assert!(render_schema().contains("UNIQUE (kind, pattern)"));
	}
}
