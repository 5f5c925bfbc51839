//! Fixtures for PinVault tests that need Postgres and an uploads directory.
//!
//! Set `PINVAULT_PG_DSN` to a server the tests may create and drop databases on. Without it,
//! [`TestVault::from_env`] returns `None` and the calling test skips itself.

mod database;
mod error;

pub use database::TestDatabase;
pub use error::{Error, Result};

use std::{env, path::Path};

use tempfile::TempDir;

use pinvault_config::{Config, Lifecycle, Postgres, Security, Service, Storage, Uploads};
use pinvault_storage::db::Db;

pub const DSN_ENV: &str = "PINVAULT_PG_DSN";
pub const SESSION_SECRET: &str = "0123456789abcdef0123456789abcdef";

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// A valid config pointing at `dsn` and `uploads`, with default retention.
pub fn test_config(dsn: &str, uploads: &Path) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			max_upload_bytes: 1024 * 1024,
		},
		storage: Storage {
			postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 4 },
			uploads: Uploads { root: uploads.to_path_buf() },
		},
		security: Security {
			session_secret: SESSION_SECRET.to_string(),
			cookie_name: "pinvault_session".to_string(),
			secure_cookie: false,
			bind_localhost_only: true,
		},
		lifecycle: Lifecycle::default(),
	}
}

/// A fresh database with the vault schema, an empty uploads root, and a config for both.
pub struct TestVault {
	pub cfg: Config,
	pub db: Db,
	database: TestDatabase,
	uploads: TempDir,
}
impl TestVault {
	pub async fn from_env() -> Result<Option<Self>> {
		let Some(base_dsn) = env_dsn() else {
			eprintln!("Skipping; set {DSN_ENV} to run this test.");

			return Ok(None);
		};
		let database = TestDatabase::create(&base_dsn).await?;
		let uploads = TempDir::new()?;
		let cfg = test_config(database.dsn(), uploads.path());
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Some(Self { cfg, db, database, uploads }))
	}

	pub fn uploads(&self) -> &Path {
		self.uploads.path()
	}

	pub fn database(&self) -> &TestDatabase {
		&self.database
	}

	/// Closes the pool, then drops the database. The uploads root goes with `self`.
	pub async fn cleanup(self) -> Result<()> {
		self.db.pool.close().await;
		self.database.drop_database().await
	}
}
