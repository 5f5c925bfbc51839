use uuid::Uuid;

use pinvault_storage::{models::VaultNote, queries};

use crate::{Error, PinVaultService, Result, Tenant};

pub const NOTE_SEPARATOR: &str = "\n\n---\n\n";
pub const NOTES_UPDATED_MESSAGE: &str = "Notes updated successfully.";
pub const NOTES_DELETED_MESSAGE: &str = "Notes deleted successfully.";

pub fn join_notes<'a>(notes: impl IntoIterator<Item = &'a str>) -> String {
	notes.into_iter().collect::<Vec<_>>().join(NOTE_SEPARATOR)
}

impl PinVaultService {
	/// Replaces every note of the tenant's vault with `content`.
	pub async fn update_notes(&self, tenant: &Tenant, content: String) -> Result<()> {
		let now = self.now();
		let mut tx = self.db.pool.begin().await?;
		let ensured = queries::ensure_vault(&mut *tx, &tenant.pin, now).await?;
		let vault_id = ensured.vault.vault_id;

		queries::lock_vault(&mut *tx, vault_id)
			.await?
			.ok_or_else(|| Error::not_found("Vault disappeared during note update."))?;

		let removed = queries::delete_notes(&mut *tx, vault_id).await?;
		let note = VaultNote { note_id: Uuid::new_v4(), vault_id, content, created_at: now };

		queries::insert_note(&mut *tx, &note).await?;

		tx.commit().await?;

		tracing::info!(%vault_id, removed, "Notes replaced.");

		Ok(())
	}

	/// Removes every note of the tenant's vault. Returns how many were removed.
	pub async fn delete_notes(&self, tenant: &Tenant) -> Result<u64> {
		let removed = queries::delete_notes(&self.db.pool, tenant.vault_id).await?;

		tracing::info!(vault_id = %tenant.vault_id, removed, "Notes cleared.");

		Ok(removed)
	}
}
