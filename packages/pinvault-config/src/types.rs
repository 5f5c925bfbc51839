use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Thirty days, the retention applied to uploaded files and notes.
pub const DEFAULT_RETENTION_SECONDS: u64 = 2_592_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub security: Security,
	#[serde(default)]
	pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Upper bound for a single multipart submission, in bytes.
	#[serde(default = "default_max_upload_bytes")]
	pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	#[serde(default)]
	pub uploads: Uploads,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Uploads {
	pub root: PathBuf,
}
impl Default for Uploads {
	fn default() -> Self {
		Self { root: PathBuf::from("uploads") }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	/// Key material for the session cookie signature.
	pub session_secret: String,
	#[serde(default = "default_cookie_name")]
	pub cookie_name: String,
	#[serde(default)]
	pub secure_cookie: bool,
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lifecycle {
	#[serde(default = "default_retention_seconds")]
	pub retention_seconds: u64,
	#[serde(default = "default_sweep_interval_seconds")]
	pub sweep_interval_seconds: u64,
}
impl Lifecycle {
	pub fn retention(&self) -> Duration {
		Duration::from_secs(self.retention_seconds)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_seconds)
	}
}
impl Default for Lifecycle {
	fn default() -> Self {
		Self {
			retention_seconds: default_retention_seconds(),
			sweep_interval_seconds: default_sweep_interval_seconds(),
		}
	}
}

fn default_max_upload_bytes() -> usize {
	25 * 1_024 * 1_024
}

fn default_cookie_name() -> String {
	"pinvault_session".to_string()
}

fn default_true() -> bool {
	true
}

fn default_retention_seconds() -> u64 {
	DEFAULT_RETENTION_SECONDS
}

fn default_sweep_interval_seconds() -> u64 {
	300
}
