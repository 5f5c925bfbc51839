use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Blob I/O failed at {path:?}.")]
	Blob { path: PathBuf, source: std::io::Error },
}
impl Error {
	pub(crate) fn blob(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Blob { path: path.into(), source }
	}
}
