use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Vault {
	pub vault_id: Uuid,
	pub pin: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VaultFile {
	pub file_id: Uuid,
	pub vault_id: Uuid,
	pub filename: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VaultNote {
	pub note_id: Uuid,
	pub vault_id: Uuid,
	pub content: String,
	pub created_at: OffsetDateTime,
}
impl VaultFile {
	pub fn blob(&self) -> FileBlob {
		FileBlob { vault_id: self.vault_id, file_id: self.file_id }
	}
}

/// Where a file record's bytes live. Blobs are keyed by `file_id`, so a purged record can never
/// reach the blob of a later upload under the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct FileBlob {
	pub vault_id: Uuid,
	pub file_id: Uuid,
}
impl FileBlob {
	pub fn name(&self) -> String {
		self.file_id.hyphenated().to_string()
	}
}
