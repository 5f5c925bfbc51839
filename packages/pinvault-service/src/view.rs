use pinvault_storage::queries;

use crate::{Error, PinVaultService, Result, Tenant, notes};

pub const VAULT_MISSING_MESSAGE: &str = "PIN not found. Create it first by uploading.";

#[derive(Debug, Clone)]
pub struct ViewResponse {
	pub pin: String,
	pub files: Vec<String>,
	pub notes: String,
}

impl PinVaultService {
	/// Lists the live files of the tenant's vault and joins its live notes into one text.
	pub async fn view(&self, tenant: &Tenant) -> Result<ViewResponse> {
		let vault = queries::find_vault(&self.db.pool, tenant.vault_id)
			.await?
			.ok_or_else(|| Error::not_found(VAULT_MISSING_MESSAGE))?;
		let cutoff = self.retention_cutoff(self.now());
		let files = queries::list_live_files(&self.db.pool, vault.vault_id, cutoff).await?;
		let notes = queries::list_live_notes(&self.db.pool, vault.vault_id, cutoff).await?;

		Ok(ViewResponse {
			pin: vault.pin,
			files: files.into_iter().map(|file| file.filename).collect(),
			notes: notes::join_notes(notes.iter().map(|note| note.content.as_str())),
		})
	}
}
