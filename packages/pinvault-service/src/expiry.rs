use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;

use pinvault_storage::{models::FileBlob, queries};

use crate::{PinVaultService, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
	pub files: u64,
	pub notes: u64,
}

impl PinVaultService {
	/// Physically removes file records, blobs, and notes that fell out of the retention window as
	/// of `now`. Blob removal failures are logged and do not stop the purge.
	pub async fn purge_expired(&self, now: OffsetDateTime) -> Result<PurgeReport> {
		let cutoff = self.retention_cutoff(now);
		let expired = queries::purge_expired_files(&self.db.pool, cutoff).await?;

		self.remove_purged_blobs(&expired).await;

		let notes = queries::purge_expired_notes(&self.db.pool, cutoff).await?;
		let report = PurgeReport { files: expired.len() as u64, notes };

		if report != PurgeReport::default() {
			tracing::info!(files = report.files, notes = report.notes, "Expired entries purged.");
		}

		Ok(report)
	}

	/// Removes the blobs of purged records. Each blob belongs to exactly one `file_id`, so a name
	/// uploaded again after the purge keeps its new bytes.
	pub async fn remove_purged_blobs(&self, purged: &[FileBlob]) {
		for blob in purged {
			self.remove_blob(*blob).await;
		}
	}
}

/// Purges expired entries every `interval` until the task is dropped.
pub async fn run_expiry_sweeper(service: Arc<PinVaultService>, interval: Duration) {
	let mut ticker = tokio::time::interval(interval);

	ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		if let Err(err) = service.purge_expired(service.now()).await {
			tracing::error!(error = %err, "Expiry sweep failed.");
		}
	}
}
