use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use pinvault_config::{Config, DEFAULT_RETENTION_SECONDS, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock before epoch.").as_nanos();
	let path = env::temp_dir().join(format!(
		"pinvault_config_{}_{}_{}.toml",
		std::process::id(),
		nanos,
		COUNTER.fetch_add(1, Ordering::SeqCst)
	));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	pinvault_config::parse(SAMPLE_CONFIG_TOML).expect("Sample config must be valid.")
}

fn expect_invalid(cfg: &Config, field: &str) {
	let err = pinvault_config::validate(cfg).expect_err("Expected a validation error.");

	assert_eq!(err.field(), Some(field), "Unexpected error: {err}");
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let cfg = pinvault_config::load(&path).expect("Failed to load sample config.");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
	assert_eq!(cfg.storage.postgres.pool_max_conns, 4);
	assert_eq!(cfg.lifecycle.retention_seconds, DEFAULT_RETENTION_SECONDS);
	assert_eq!(cfg.lifecycle.retention().as_secs(), 30 * 24 * 60 * 60);

	let _ = fs::remove_file(path);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("pinvault_config_does_not_exist.toml");
	let err = pinvault_config::load(&path).expect_err("Expected a read error.");

	assert!(matches!(err, Error::Read { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_reports_parse_error_with_path() {
	let path = write_temp_config("[service\nhttp_bind = ".to_string());
	let err = pinvault_config::load(&path).expect_err("Expected a parse error.");

	match &err {
		Error::Parse { path: reported, .. } => assert_eq!(reported, &path),
		other => panic!("Unexpected error: {other}"),
	}

	let _ = fs::remove_file(path);
}

#[test]
fn optional_sections_fall_back_to_defaults() {
	let raw = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "debug"

[storage.postgres]
dsn            = "postgres://localhost/pinvault"
pool_max_conns = 1

[security]
session_secret = "ffffffffffffffffffffffffffffffff"
"#;
	let cfg = pinvault_config::parse(raw).expect("Minimal config must be valid.");

	assert_eq!(cfg.storage.uploads.root, PathBuf::from("uploads"));
	assert_eq!(cfg.security.cookie_name, "pinvault_session");
	assert!(cfg.security.bind_localhost_only);
	assert!(!cfg.security.secure_cookie);
	assert_eq!(cfg.lifecycle.retention_seconds, DEFAULT_RETENTION_SECONDS);
	assert_eq!(cfg.lifecycle.sweep_interval_seconds, 300);
	assert_eq!(cfg.service.max_upload_bytes, 25 * 1_024 * 1_024);
}

#[test]
fn session_secret_must_be_long_enough() {
	let raw = sample_with("security", "session_secret", Value::String("supersecretkey".into()));
	let err = pinvault_config::parse(&raw).expect_err("Expected short secret to be rejected.");

	assert_eq!(err.field(), Some("security.session_secret"));
	assert!(err.to_string().contains("at least 32 bytes"), "Unexpected error: {err}");
}

#[test]
fn cookie_name_is_trimmed_and_checked() {
	let raw = sample_with("security", "cookie_name", Value::String("  vault  ".into()));
	let cfg = pinvault_config::parse(&raw).expect("Padded cookie name must normalize.");

	assert_eq!(cfg.security.cookie_name, "vault");

	let raw = sample_with("security", "cookie_name", Value::String("bad;name".into()));
	let err = pinvault_config::parse(&raw).expect_err("Expected separator to be rejected.");

	assert_eq!(err.field(), Some("security.cookie_name"));
}

#[test]
fn lifecycle_durations_must_be_positive() {
	let mut cfg = base_config();

	cfg.lifecycle.retention_seconds = 0;

	expect_invalid(&cfg, "lifecycle.retention_seconds");

	let mut cfg = base_config();

	cfg.lifecycle.sweep_interval_seconds = 0;

	expect_invalid(&cfg, "lifecycle.sweep_interval_seconds");
}

#[test]
fn storage_settings_are_required() {
	let mut cfg = base_config();

	cfg.storage.postgres.dsn = "   ".to_string();

	expect_invalid(&cfg, "storage.postgres.dsn");

	let mut cfg = base_config();

	cfg.storage.postgres.pool_max_conns = 0;

	expect_invalid(&cfg, "storage.postgres.pool_max_conns");

	let mut cfg = base_config();

	cfg.storage.uploads.root = PathBuf::new();

	expect_invalid(&cfg, "storage.uploads.root");
}

#[test]
fn upload_limit_must_be_positive() {
	let raw = sample_with("service", "max_upload_bytes", Value::Integer(0));
	let err = pinvault_config::parse(&raw).expect_err("Expected zero upload limit to be rejected.");

	assert_eq!(err.field(), Some("service.max_upload_bytes"));
}
