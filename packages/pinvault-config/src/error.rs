use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse config file at {path:?}.")]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("{field} {reason}")]
	Invalid { field: &'static str, reason: String },
}
impl Error {
	pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Invalid { field, reason: reason.into() }
	}

	/// Dotted path of the offending field, when the error came from validation.
	pub fn field(&self) -> Option<&'static str> {
		match self {
			Self::Invalid { field, .. } => Some(*field),
			_ => None,
		}
	}
}
