pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	/// The learning store could not be reached or rejected the operation. Not retried.
	#[error("Storage unavailable: {message}")]
	StorageUnavailable { message: String },
}
impl From<cadence_storage::Error> for Error {
	fn from(err: cadence_storage::Error) -> Self {
		match err {
			cadence_storage::Error::Sqlx(inner) =>
				Self::StorageUnavailable { message: inner.to_string() },
			cadence_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			cadence_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}
