mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_RETENTION_SECONDS, Lifecycle, Postgres, Security, Service, Storage, Uploads,
};

use std::{fs, path::Path};

/// Minimum length, in bytes, of `security.session_secret`.
pub const MIN_SESSION_SECRET_BYTES: usize = 32;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::Parse { source, .. } => Error::Parse { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes, and validates a config held in memory.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::Parse { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::invalid("service.http_bind", "must be non-empty."));
	}
	if cfg.service.max_upload_bytes == 0 {
		return Err(Error::invalid("service.max_upload_bytes", "must be greater than zero."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::invalid("storage.postgres.dsn", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}
	if cfg.storage.uploads.root.as_os_str().is_empty() {
		return Err(Error::invalid("storage.uploads.root", "must be non-empty."));
	}
	if cfg.security.session_secret.len() < MIN_SESSION_SECRET_BYTES {
		return Err(Error::invalid(
			"security.session_secret",
			format!("must be at least {MIN_SESSION_SECRET_BYTES} bytes."),
		));
	}
	if cfg.security.cookie_name.is_empty() {
		return Err(Error::invalid("security.cookie_name", "must be non-empty."));
	}
	if !cfg.security.cookie_name.bytes().all(is_cookie_token_byte) {
		return Err(Error::invalid(
			"security.cookie_name",
			"must contain only cookie token characters.",
		));
	}
	if cfg.lifecycle.retention_seconds == 0 {
		return Err(Error::invalid("lifecycle.retention_seconds", "must be greater than zero."));
	}
	if cfg.lifecycle.sweep_interval_seconds == 0 {
		return Err(Error::invalid(
			"lifecycle.sweep_interval_seconds",
			"must be greater than zero.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let cookie_name = cfg.security.cookie_name.trim();

	if cookie_name.len() != cfg.security.cookie_name.len() {
		cfg.security.cookie_name = cookie_name.to_string();
	}

	if let Some(root) = cfg.storage.uploads.root.to_str()
		&& root.trim().len() != root.len()
	{
		cfg.storage.uploads.root = root.trim().into();
	}
}

// RFC 6265 `token`: visible ASCII minus separators.
fn is_cookie_token_byte(byte: u8) -> bool {
	byte.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&byte)
}
