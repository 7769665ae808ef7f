use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub interpreter: Interpreter,
	#[serde(default)]
	pub learning: Learning,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	Memory,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Meridiem {
	Am,
	Pm,
}

/// Bare-hour policy entry. A token such as "4" resolves to `meridiem` when the hour falls in
/// `min_hour..=max_hour`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MeridiemRule {
	pub min_hour: u8,
	pub max_hour: u8,
	pub meridiem: Meridiem,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Interpreter {
	#[serde(default)]
	pub utc_offset_minutes: i32,
	#[serde(default = "default_pm")]
	pub fallback_meridiem: Meridiem,
	#[serde(default = "default_pm")]
	pub separator_meridiem: Meridiem,
	#[serde(default = "default_meridiem_rules")]
	pub meridiem_rules: Vec<MeridiemRule>,
	#[serde(default = "default_query_phrases")]
	pub query_phrases: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Learning {
	#[serde(default = "default_similarity_threshold")]
	pub similarity_threshold: f32,
	#[serde(default = "default_max_candidates")]
	pub max_candidates: u32,
	#[serde(default = "default_initial_confidence")]
	pub initial_confidence: f32,
	/// Minimum similarity for a stored suggestion to pre-empt the deterministic cascade.
	#[serde(default = "default_preempt_threshold")]
	pub preempt_threshold: f32,
	#[serde(default = "default_failed_commands_limit")]
	pub failed_commands_limit: u32,
	#[serde(default = "default_failed_commands_max_limit")]
	pub failed_commands_max_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}

impl Default for Interpreter {
	fn default() -> Self {
		Self {
			utc_offset_minutes: 0,
			fallback_meridiem: Meridiem::Pm,
			separator_meridiem: Meridiem::Pm,
			meridiem_rules: default_meridiem_rules(),
			query_phrases: default_query_phrases(),
		}
	}
}

impl Default for Learning {
	fn default() -> Self {
		Self {
			similarity_threshold: default_similarity_threshold(),
			max_candidates: default_max_candidates(),
			initial_confidence: default_initial_confidence(),
			preempt_threshold: default_preempt_threshold(),
			failed_commands_limit: default_failed_commands_limit(),
			failed_commands_max_limit: default_failed_commands_max_limit(),
		}
	}
}

impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

pub fn default_meridiem_rules() -> Vec<MeridiemRule> {
	vec![MeridiemRule { min_hour: 1, max_hour: 12, meridiem: Meridiem::Pm }]
}

pub fn default_query_phrases() -> Vec<String> {
	["how many meetings", "list meetings", "show meetings", "meetings today", "scheduled today"]
		.into_iter()
		.map(str::to_string)
		.collect()
}

fn default_pm() -> Meridiem {
	Meridiem::Pm
}

fn default_true() -> bool {
	true
}

fn default_similarity_threshold() -> f32 {
	0.3
}

fn default_max_candidates() -> u32 {
	5
}

fn default_initial_confidence() -> f32 {
	0.5
}

fn default_preempt_threshold() -> f32 {
	1.0
}

fn default_failed_commands_limit() -> u32 {
	10
}

fn default_failed_commands_max_limit() -> u32 {
	100
}
