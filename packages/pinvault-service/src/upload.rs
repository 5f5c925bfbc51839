use uuid::Uuid;

use pinvault_storage::{
	models::{FileBlob, VaultFile, VaultNote},
	queries::{self, Claim},
};

use crate::{PinVaultService, Result, Tenant, filename};

pub const FILE_STORED_MESSAGE: &str = "File uploaded successfully!";
pub const FILE_EXISTS_MESSAGE: &str = "This file already exists in the vault.";
pub const FILE_INVALID_NAME_MESSAGE: &str = "Invalid file name.";
pub const NOTE_SAVED_MESSAGE: &str = "Code saved to vault!";

#[derive(Debug, Clone)]
pub struct UploadedFile {
	pub name: String,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
	pub tenant: Tenant,
	pub file: Option<UploadedFile>,
	pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileUpload {
	Stored { filename: String },
	AlreadyExists { filename: String },
	InvalidName,
}

#[derive(Debug, Clone)]
pub struct UploadResponse {
	pub vault_id: Uuid,
	pub file: Option<FileUpload>,
	pub note_saved: bool,
}
impl UploadResponse {
	/// Flash messages in the order the side effects happened.
	pub fn messages(&self) -> Vec<&'static str> {
		let mut messages = Vec::new();

		match &self.file {
			Some(FileUpload::Stored { .. }) => messages.push(FILE_STORED_MESSAGE),
			Some(FileUpload::AlreadyExists { .. }) => messages.push(FILE_EXISTS_MESSAGE),
			Some(FileUpload::InvalidName) => messages.push(FILE_INVALID_NAME_MESSAGE),
			None => {},
		}

		if self.note_saved {
			messages.push(NOTE_SAVED_MESSAGE);
		}

		messages
	}
}

impl PinVaultService {
	/// Stores an optional file and an optional note in the tenant's vault.
	///
	/// The two parts are independent. A file whose name is already live in the vault keeps its
	/// original bytes.
	pub async fn upload(&self, req: UploadRequest) -> Result<UploadResponse> {
		let now = self.now();
		let mut conn = self.db.pool.acquire().await?;
		let ensured = queries::ensure_vault(&mut *conn, &req.tenant.pin, now).await?;
		let vault_id = ensured.vault.vault_id;

		drop(conn);

		if ensured.created {
			tracing::info!(%vault_id, "New vault created on upload.");
		}

		let file = match req.file {
			Some(file) if !file.name.is_empty() =>
				Some(self.store_file(vault_id, &req.tenant.pin, file).await?),
			_ => None,
		};
		let note_saved = match req.code {
			Some(code) if !code.trim().is_empty() => {
				let note =
					VaultNote { note_id: Uuid::new_v4(), vault_id, content: code, created_at: now };

				queries::insert_note(&self.db.pool, &note).await?;

				tracing::info!(%vault_id, note_id = %note.note_id, "Note appended.");

				true
			},
			_ => false,
		};

		Ok(UploadResponse { vault_id, file, note_saved })
	}

	async fn store_file(&self, vault_id: Uuid, pin: &str, file: UploadedFile) -> Result<FileUpload> {
		let Some(stored) = filename::stored_filename(pin, &file.name) else {
			tracing::info!(%vault_id, "Rejected upload with an unusable file name.");

			return Ok(FileUpload::InvalidName);
		};
		let now = self.now();
		let record = VaultFile {
			file_id: Uuid::new_v4(),
			vault_id,
			filename: stored.clone(),
			created_at: now,
		};
		let blob = record.blob();

		// No record may point at a blob that was never written.
		self.blobs.write(vault_id, &blob.name(), &file.bytes).await?;

		match queries::claim_file(&self.db.pool, &record, self.retention_cutoff(now)).await {
			Ok(Claim::Inserted) => {},
			Ok(Claim::Replaced { previous }) => self.remove_blob(previous).await,
			Ok(Claim::Taken) => {
				tracing::info!(%vault_id, filename = %stored, "Duplicate upload ignored.");

				self.remove_blob(blob).await;

				return Ok(FileUpload::AlreadyExists { filename: stored });
			},
			Err(err) => {
				self.remove_blob(blob).await;

				return Err(err.into());
			},
		}

		tracing::info!(
			%vault_id,
			file_id = %record.file_id,
			filename = %stored,
			size = file.bytes.len(),
			"File stored."
		);

		Ok(FileUpload::Stored { filename: stored })
	}

	/// Removes a blob no record points at. Failures are logged.
	pub(crate) async fn remove_blob(&self, blob: FileBlob) {
		if let Err(err) = self.blobs.remove(blob.vault_id, &blob.name()).await {
			tracing::warn!(
				vault_id = %blob.vault_id,
				file_id = %blob.file_id,
				error = %err,
				"Blob removal failed."
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_follow_side_effects() {
		let response = UploadResponse {
			vault_id: Uuid::nil(),
			file: Some(FileUpload::AlreadyExists { filename: "1234_a.txt".to_string() }),
			note_saved: true,
		};

		assert_eq!(response.messages(), vec![FILE_EXISTS_MESSAGE, NOTE_SAVED_MESSAGE]);

		let response = UploadResponse { vault_id: Uuid::nil(), file: None, note_saved: false };

		assert!(response.messages().is_empty());
	}
}
