use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Resolution, Result, SuggestionStore};
use cadence_domain::{fingerprint, similarity};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimilarRequest {
	pub command: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimilarCommand {
	pub command: String,
	pub resolution: Resolution,
	pub similarity: f32,
	/// Number of resolved commands that share this resolution.
	pub frequency: i64,
}

/// Tentative interpretation taken from the closest resolved command. Never auto-applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Suggestion {
	pub suggestion: Resolution,
	pub confidence: f32,
	pub based_on: String,
}

impl SuggestionStore {
	/// Resolved commands scoring above the similarity threshold, most frequent resolution
	/// first, at most `max_candidates` distinct commands.
	pub async fn find_similar(&self, command: &str) -> Result<Vec<SimilarCommand>> {
		let command = crate::require_command(command)?;
		let rows = self.store.resolved_commands().await?;
		let mut seen = HashSet::new();
		let mut out = Vec::new();

		for row in rows {
			if out.len() >= self.cfg.max_candidates as usize {
				break;
			}

			let score = similarity::lexical_similarity(command, &row.command);

			if score <= self.cfg.similarity_threshold {
				continue;
			}
			if !seen.insert(fingerprint::normalized_for_hash(&row.command)) {
				continue;
			}

			let resolution = match serde_json::from_value::<Resolution>(row.resolution) {
				Ok(resolution) => resolution,
				Err(err) => {
					tracing::warn!(
						command = %row.command,
						error = %err,
						"Skipping resolved command with unreadable resolution."
					);

					continue;
				},
			};

			out.push(SimilarCommand {
				command: row.command,
				resolution,
				similarity: score,
				frequency: row.frequency,
			});
		}

		Ok(out)
	}

	/// The most similar candidate from `find_similar`, if any.
	pub async fn suggest(&self, command: &str) -> Result<Option<Suggestion>> {
		self.suggest_above(command, self.cfg.similarity_threshold).await
	}

	/// Like `suggest`, but only when the best candidate scores at least `min_confidence`.
	pub async fn suggest_above(
		&self,
		command: &str,
		min_confidence: f32,
	) -> Result<Option<Suggestion>> {
		let best = self
			.find_similar(command)
			.await?
			.into_iter()
			.reduce(|best, candidate| {
				if candidate.similarity > best.similarity { candidate } else { best }
			});

		Ok(best.filter(|candidate| candidate.similarity >= min_confidence).map(|candidate| {
			Suggestion {
				suggestion: candidate.resolution,
				confidence: candidate.similarity,
				based_on: candidate.command,
			}
		}))
	}
}
