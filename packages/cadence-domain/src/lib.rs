pub mod confidence;
pub mod fingerprint;
pub mod intent;
pub mod interpreter;
pub mod matcher;
pub mod similarity;
pub mod templates;
pub mod time_token;

pub use intent::{Intent, IntentKind, QueryScope};
pub use interpreter::{CommandInterpreter, Evaluation, FailureReason, InterpreterError};
pub use time_token::NormalizeError;
