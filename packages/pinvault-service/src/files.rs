use pinvault_storage::queries;

use crate::{Error, PinVaultService, Result, Tenant};

pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found in database.";
pub const FILE_DELETED_MESSAGE: &str = "File deleted successfully.";
pub const FILE_MISSING_MESSAGE: &str = "File is missing from storage.";

#[derive(Debug, Clone)]
pub struct Download {
	pub filename: String,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteFileResponse {
	pub blob_removed: bool,
}

impl PinVaultService {
	/// Reads a live file owned by the tenant's vault.
	pub async fn download(&self, tenant: &Tenant, filename: &str) -> Result<Download> {
		let cutoff = self.retention_cutoff(self.now());
		let record = queries::find_live_file(&self.db.pool, tenant.vault_id, filename, cutoff)
			.await?
			.ok_or_else(|| Error::not_found(FILE_NOT_FOUND_MESSAGE))?;
		let bytes = match self.blobs.read(record.vault_id, &record.blob().name()).await {
			Ok(bytes) => bytes,
			Err(pinvault_storage::Error::NotFound(_)) => {
				tracing::warn!(
					vault_id = %record.vault_id,
					filename = %record.filename,
					"File record has no blob."
				);

				return Err(Error::not_found(FILE_MISSING_MESSAGE));
			},
			Err(err) => return Err(err.into()),
		};

		Ok(Download { filename: record.filename, bytes })
	}

	/// Deletes a file record of the tenant's vault, then removes its blob best-effort.
	pub async fn delete_file(&self, tenant: &Tenant, filename: &str) -> Result<DeleteFileResponse> {
		let cutoff = self.retention_cutoff(self.now());
		let Some(record) =
			queries::find_live_file(&self.db.pool, tenant.vault_id, filename, cutoff).await?
		else {
			return Err(Error::not_found(FILE_NOT_FOUND_MESSAGE));
		};

		if !queries::delete_file(&self.db.pool, record.vault_id, record.file_id).await? {
			return Err(Error::not_found(FILE_NOT_FOUND_MESSAGE));
		}

		let blob_removed = match self.blobs.remove(record.vault_id, &record.blob().name()).await {
			Ok(removed) => removed,
			Err(err) => {
				tracing::warn!(
					vault_id = %record.vault_id,
					filename = %record.filename,
					error = %err,
					"Blob removal failed."
				);

				false
			},
		};

		tracing::info!(vault_id = %record.vault_id, filename = %record.filename, "File deleted.");

		Ok(DeleteFileResponse { blob_removed })
	}
}
