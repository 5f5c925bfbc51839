pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service failures.
///
/// `InvalidRequest` and `NotFound` carry a message meant for the person using the vault. The other
/// variants are infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Blob error: {message}")]
	Blob { message: String },
}
impl Error {
	pub(crate) fn invalid(message: &str) -> Self {
		Self::InvalidRequest { message: message.to_string() }
	}

	pub(crate) fn not_found(message: &str) -> Self {
		Self::NotFound { message: message.to_string() }
	}

	/// Whether the error should be shown to the user rather than treated as a server fault.
	pub fn is_user_facing(&self) -> bool {
		matches!(self, Self::InvalidRequest { .. } | Self::NotFound { .. })
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<pinvault_storage::Error> for Error {
	fn from(err: pinvault_storage::Error) -> Self {
		match err {
			pinvault_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			pinvault_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			pinvault_storage::Error::NotFound(message) => Self::NotFound { message },
			err @ pinvault_storage::Error::Blob { .. } => Self::Blob { message: err.to_string() },
		}
	}
}
