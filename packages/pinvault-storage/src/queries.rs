use sqlx::{Executor, PgConnection, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{FileBlob, Vault, VaultFile, VaultNote},
};

#[derive(Debug, Clone)]
pub struct EnsuredVault {
	pub vault: Vault,
	pub created: bool,
}

pub async fn find_vault_by_pin<'e, E>(executor: E, pin: &str) -> Result<Option<Vault>>
where
	E: Executor<'e, Database = Postgres>,
{
	let vault = sqlx::query_as::<_, Vault>(
		"SELECT vault_id, pin, created_at FROM vaults WHERE pin = $1",
	)
	.bind(pin)
	.fetch_optional(executor)
	.await?;

	Ok(vault)
}

pub async fn find_vault<'e, E>(executor: E, vault_id: Uuid) -> Result<Option<Vault>>
where
	E: Executor<'e, Database = Postgres>,
{
	let vault = sqlx::query_as::<_, Vault>(
		"SELECT vault_id, pin, created_at FROM vaults WHERE vault_id = $1",
	)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(vault)
}

/// Registers `pin` unless a vault already holds it. Safe under concurrent first logins.
pub async fn ensure_vault(
	conn: &mut PgConnection,
	pin: &str,
	now: OffsetDateTime,
) -> Result<EnsuredVault> {
	let inserted = sqlx::query_as::<_, Vault>(
		"\
INSERT INTO vaults (vault_id, pin, created_at)
VALUES ($1, $2, $3)
ON CONFLICT (pin) DO NOTHING
RETURNING vault_id, pin, created_at",
	)
	.bind(Uuid::new_v4())
	.bind(pin)
	.bind(now)
	.fetch_optional(&mut *conn)
	.await?;

	if let Some(vault) = inserted {
		return Ok(EnsuredVault { vault, created: true });
	}

	let vault = find_vault_by_pin(&mut *conn, pin)
		.await?
		.ok_or_else(|| Error::NotFound("Vault disappeared during registration.".to_string()))?;

	Ok(EnsuredVault { vault, created: false })
}

pub async fn lock_vault<'e, E>(executor: E, vault_id: Uuid) -> Result<Option<Vault>>
where
	E: Executor<'e, Database = Postgres>,
{
	let vault = sqlx::query_as::<_, Vault>(
		"SELECT vault_id, pin, created_at FROM vaults WHERE vault_id = $1 FOR UPDATE",
	)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(vault)
}

pub async fn find_live_file<'e, E>(
	executor: E,
	vault_id: Uuid,
	filename: &str,
	cutoff: OffsetDateTime,
) -> Result<Option<VaultFile>>
where
	E: Executor<'e, Database = Postgres>,
{
	let file = sqlx::query_as::<_, VaultFile>(
		"\
SELECT file_id, vault_id, filename, created_at
FROM vault_files
WHERE vault_id = $1 AND filename = $2 AND created_at > $3",
	)
	.bind(vault_id)
	.bind(filename)
	.bind(cutoff)
	.fetch_optional(executor)
	.await?;

	Ok(file)
}

/// Outcome of [`claim_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
	Inserted,
	/// An expired record was taken over. Its blob is now unreferenced.
	Replaced { previous: FileBlob },
	/// A live record already owns the name.
	Taken,
}

/// Inserts `file` unless a live record already owns `(vault_id, filename)`.
///
/// An expired record that the sweeper has not reached yet is taken over in place.
pub async fn claim_file<'e, E>(
	executor: E,
	file: &VaultFile,
	cutoff: OffsetDateTime,
) -> Result<Claim>
where
	E: Executor<'e, Database = Postgres>,
{
	let claimed = sqlx::query_scalar::<_, Option<Uuid>>(
		"\
WITH previous AS (
	SELECT file_id
	FROM vault_files
	WHERE vault_id = $2 AND filename = $3
	FOR UPDATE
)
INSERT INTO vault_files (file_id, vault_id, filename, created_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (vault_id, filename) DO UPDATE
SET file_id = EXCLUDED.file_id, created_at = EXCLUDED.created_at
WHERE vault_files.created_at <= $5
RETURNING (SELECT file_id FROM previous)",
	)
	.bind(file.file_id)
	.bind(file.vault_id)
	.bind(file.filename.as_str())
	.bind(file.created_at)
	.bind(cutoff)
	.fetch_optional(executor)
	.await?;

	Ok(match claimed {
		None => Claim::Taken,
		Some(None) => Claim::Inserted,
		Some(Some(previous)) =>
			Claim::Replaced { previous: FileBlob { vault_id: file.vault_id, file_id: previous } },
	})
}

/// Deletes the record identified by `file_id` if it still belongs to `vault_id`.
pub async fn delete_file<'e, E>(executor: E, vault_id: Uuid, file_id: Uuid) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query("DELETE FROM vault_files WHERE vault_id = $1 AND file_id = $2")
		.bind(vault_id)
		.bind(file_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn list_live_files<'e, E>(
	executor: E,
	vault_id: Uuid,
	cutoff: OffsetDateTime,
) -> Result<Vec<VaultFile>>
where
	E: Executor<'e, Database = Postgres>,
{
	let files = sqlx::query_as::<_, VaultFile>(
		"\
SELECT file_id, vault_id, filename, created_at
FROM vault_files
WHERE vault_id = $1 AND created_at > $2
ORDER BY created_at ASC, filename ASC",
	)
	.bind(vault_id)
	.bind(cutoff)
	.fetch_all(executor)
	.await?;

	Ok(files)
}

pub async fn insert_note<'e, E>(executor: E, note: &VaultNote) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"INSERT INTO vault_notes (note_id, vault_id, content, created_at) VALUES ($1, $2, $3, $4)",
	)
	.bind(note.note_id)
	.bind(note.vault_id)
	.bind(note.content.as_str())
	.bind(note.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn delete_notes<'e, E>(executor: E, vault_id: Uuid) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query("DELETE FROM vault_notes WHERE vault_id = $1")
		.bind(vault_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}

pub async fn list_live_notes<'e, E>(
	executor: E,
	vault_id: Uuid,
	cutoff: OffsetDateTime,
) -> Result<Vec<VaultNote>>
where
	E: Executor<'e, Database = Postgres>,
{
	let notes = sqlx::query_as::<_, VaultNote>(
		"\
SELECT note_id, vault_id, content, created_at
FROM vault_notes
WHERE vault_id = $1 AND created_at > $2
ORDER BY created_at ASC, note_id ASC",
	)
	.bind(vault_id)
	.bind(cutoff)
	.fetch_all(executor)
	.await?;

	Ok(notes)
}

/// Deletes file records created at or before `cutoff` and returns the blobs they owned.
pub async fn purge_expired_files<'e, E>(
	executor: E,
	cutoff: OffsetDateTime,
) -> Result<Vec<FileBlob>>
where
	E: Executor<'e, Database = Postgres>,
{
	let blobs = sqlx::query_as::<_, FileBlob>(
		"DELETE FROM vault_files WHERE created_at <= $1 RETURNING vault_id, file_id",
	)
	.bind(cutoff)
	.fetch_all(executor)
	.await?;

	Ok(blobs)
}

pub async fn purge_expired_notes<'e, E>(executor: E, cutoff: OffsetDateTime) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query("DELETE FROM vault_notes WHERE created_at <= $1")
		.bind(cutoff)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}
