/// Lower-cased, trimmed form used as the command's learning identity.
pub fn normalized_for_hash(command: &str) -> String {
	command.trim().to_lowercase()
}

/// Stable content hash of a command. Case and surrounding whitespace do not change it.
pub fn command_hash(command: &str) -> String {
	blake3::hash(normalized_for_hash(command).as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_ignores_case_and_outer_whitespace() {
		assert_eq!(
			command_hash("Schedule Meeting With XYZ "),
			command_hash("schedule meeting with xyz")
		);
	}

	#[test]
	fn hash_is_hex_digest() {
		let hash = command_hash("meet bob");

		assert_eq!(hash.len(), 64);
		assert!(hash.bytes().all(|byte| byte.is_ascii_hexdigit()));
		assert_ne!(hash, command_hash("meet rob"));
	}
}
