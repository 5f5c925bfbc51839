pub mod auth;
pub mod expiry;
pub mod files;
pub mod filename;
pub mod notes;
pub mod upload;
pub mod view;

mod error;

pub use auth::{LoginRequest, LoginResponse, NEW_VAULT_MESSAGE, PIN_REQUIRED_MESSAGE};
pub use error::{Error, Result};
pub use expiry::{PurgeReport, run_expiry_sweeper};
pub use files::{
	DeleteFileResponse, Download, FILE_DELETED_MESSAGE, FILE_MISSING_MESSAGE,
	FILE_NOT_FOUND_MESSAGE,
};
pub use filename::{sanitize_filename, stored_filename};
pub use notes::{NOTE_SEPARATOR, NOTES_DELETED_MESSAGE, NOTES_UPDATED_MESSAGE, join_notes};
pub use upload::{
	FILE_EXISTS_MESSAGE, FILE_INVALID_NAME_MESSAGE, FILE_STORED_MESSAGE, FileUpload,
	NOTE_SAVED_MESSAGE, UploadRequest, UploadResponse, UploadedFile,
};
pub use view::{VAULT_MISSING_MESSAGE, ViewResponse};

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use pinvault_config::Config;
use pinvault_storage::{blob::BlobStore, db::Db};

/// Source of the current time. Swapped out in tests to simulate elapsed retention windows.
pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// The vault a session is bound to.
///
/// `vault_id` scopes every query. `pin` is the credential the session logged in with and only
/// prefixes stored filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
	pub vault_id: Uuid,
	pub pin: String,
}

pub struct PinVaultService {
	pub cfg: Config,
	pub db: Db,
	pub blobs: BlobStore,
	clock: Arc<dyn Clock>,
}
impl PinVaultService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let blobs = BlobStore::new(cfg.storage.uploads.root.clone());

		Self { cfg, db, blobs, clock: Arc::new(SystemClock) }
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	pub fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}

	/// Records created at or before the returned instant are expired as of `now`.
	pub fn retention_cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
		let retention = Duration::try_from(self.cfg.lifecycle.retention()).unwrap_or(Duration::MAX);

		now.checked_sub(retention).unwrap_or(OffsetDateTime::UNIX_EPOCH)
	}
}
