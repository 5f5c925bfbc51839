use std::sync::Arc;

use pinvault_service::PinVaultService;
use pinvault_storage::db::Db;

use crate::session::SessionKey;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PinVaultService>,
	pub sessions: Arc<SessionKey>,
}
impl AppState {
	pub async fn new(config: pinvault_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = PinVaultService::new(config, db);

		service.blobs.ensure_root().await?;

		Self::from_service(service)
	}

	/// Wraps an already configured service. The uploads root and schema are left as they are.
	pub fn from_service(service: PinVaultService) -> color_eyre::Result<Self> {
		let sessions = SessionKey::new(&service.cfg.security)?;

		Ok(Self { service: Arc::new(service), sessions: Arc::new(sessions) })
	}
}
