pub mod corrections;
pub mod failures;
pub mod feedback;
pub mod interpret;
pub mod memory;
pub mod patterns;
pub mod similar;
pub mod store;

mod error;

pub use corrections::{CorrectionRequest, CorrectionResponse};
pub use error::{Error, Result};
pub use failures::{
	FailedCommandItem, FailedCommandsResponse, RecordFailureRequest, RecordFailureResponse,
};
pub use feedback::{FeedbackRequest, FeedbackResponse};
pub use interpret::{InterpretRequest, Interpretation, SuggestionStage};
pub use memory::MemoryStore;
pub use patterns::{PatternItem, PatternOutcomeRequest, PatternsResponse};
pub use similar::{SimilarCommand, SimilarRequest, Suggestion};
pub use store::{LearningStore, PgStore};

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};

use cadence_config::{Config, Learning};
use cadence_domain::{CommandInterpreter, InterpreterError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const SCHEDULE_KIND: &str = cadence_domain::templates::SCHEDULE_KIND;

/// Operator-supplied interpretation of a command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub person: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub agenda: Option<String>,
}
impl Resolution {
	pub fn validate(&self) -> Result<()> {
		if self.kind.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "resolution.type must be non-empty.".to_string(),
			});
		}
		if self.kind == SCHEDULE_KIND
			&& self.person.as_deref().map(str::trim).unwrap_or_default().is_empty()
		{
			return Err(Error::InvalidRequest {
				message: "resolution.person is required for schedule resolutions.".to_string(),
			});
		}

		Ok(())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStats {
	pub pending: i64,
	pub resolved: i64,
	pub pattern_count: i64,
}

/// Records failures and corrections, derives templates, and proposes interpretations from
/// history. Owns every learning row through its store handle.
#[derive(Clone)]
pub struct SuggestionStore {
	pub cfg: Learning,
	store: Arc<dyn LearningStore>,
}
impl SuggestionStore {
	pub fn new(cfg: Learning, store: Arc<dyn LearningStore>) -> Self {
		Self { cfg, store }
	}

	pub async fn stats(&self) -> Result<LearningStats> {
		let counts = self.store.counts().await?;

		Ok(LearningStats {
			pending: counts.pending,
			resolved: counts.resolved,
			pattern_count: counts.pattern_count,
		})
	}
}

/// Interpreter plus learner, consumed by the routing layer.
pub struct CadenceService {
	pub interpreter: CommandInterpreter,
	pub learning: SuggestionStore,
}
impl CadenceService {
	pub fn new(cfg: &Config, store: Arc<dyn LearningStore>) -> Result<Self, InterpreterError> {
		Ok(Self {
			interpreter: CommandInterpreter::new(&cfg.interpreter)?,
			learning: SuggestionStore::new(cfg.learning.clone(), store),
		})
	}
}

pub(crate) fn require_command(command: &str) -> Result<&str> {
	let trimmed = command.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: "command must be non-empty.".to_string() });
	}

	Ok(trimmed)
}
