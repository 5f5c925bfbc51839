use pinvault_storage::queries;

use crate::{Error, PinVaultService, Result, Tenant};

pub const PIN_REQUIRED_MESSAGE: &str = "PIN is required.";
pub const NEW_VAULT_MESSAGE: &str = "New vault created!";

#[derive(Debug, Clone)]
pub struct LoginRequest {
	pub pin: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
	pub tenant: Tenant,
	pub created: bool,
}
impl LoginResponse {
	pub fn message(&self) -> Option<&'static str> {
		self.created.then_some(NEW_VAULT_MESSAGE)
	}
}

impl PinVaultService {
	/// Opens the vault for `pin`, registering it first if nobody has used that PIN before.
	///
	/// The PIN is matched verbatim. Only the empty string is refused.
	pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
		if req.pin.is_empty() {
			return Err(Error::invalid(PIN_REQUIRED_MESSAGE));
		}

		let now = self.now();
		let mut conn = self.db.pool.acquire().await?;
		let ensured = queries::ensure_vault(&mut *conn, &req.pin, now).await?;

		if ensured.created {
			tracing::info!(vault_id = %ensured.vault.vault_id, "New vault created.");
		}

		Ok(LoginResponse {
			tenant: Tenant { vault_id: ensured.vault.vault_id, pin: ensured.vault.pin },
			created: ensured.created,
		})
	}
}
