use uuid::Uuid;

use pinvault_storage::{Error, blob::BlobStore};

const VAULT: Uuid = Uuid::from_u128(0x1234);

#[tokio::test]
async fn write_then_read_returns_the_same_bytes() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path().join("uploads"));

	store.ensure_root().await.expect("Failed to create uploads root.");
	store.write(VAULT, "1234_a.txt", b"hello").await.expect("Failed to write blob.");

	assert!(store.exists(VAULT, "1234_a.txt").await.expect("Failed to stat blob."));
	assert_eq!(store.read(VAULT, "1234_a.txt").await.expect("Failed to read blob."), b"hello");
}

#[tokio::test]
async fn write_replaces_without_leaving_temp_files() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path());

	store.write(VAULT, "1234_a.txt", b"first").await.expect("Failed to write blob.");
	store.write(VAULT, "1234_a.txt", b"second").await.expect("Failed to overwrite blob.");

	assert_eq!(store.read(VAULT, "1234_a.txt").await.expect("Failed to read blob."), b"second");

	let entries = std::fs::read_dir(store.vault_dir(VAULT))
		.expect("Failed to list uploads root.")
		.map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
		.collect::<Vec<_>>();

	assert_eq!(entries, vec!["1234_a.txt".to_string()]);
}

#[tokio::test]
async fn remove_reports_whether_anything_was_deleted() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path());

	store.write(VAULT, "1234_a.txt", b"hello").await.expect("Failed to write blob.");

	assert!(store.remove(VAULT, "1234_a.txt").await.expect("Failed to remove blob."));
	assert!(!store.remove(VAULT, "1234_a.txt").await.expect("Second remove must not fail."));
	assert!(!store.exists(VAULT, "1234_a.txt").await.expect("Failed to stat blob."));
}

#[tokio::test]
async fn reading_a_missing_blob_is_not_found() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path());
	let err = store.read(VAULT, "1234_missing.txt").await.expect_err("Expected missing blob.");

	assert!(matches!(err, Error::NotFound(_)), "Unexpected error: {err}");
}

#[tokio::test]
async fn traversal_names_are_refused() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path().join("uploads"));

	store.ensure_root().await.expect("Failed to create uploads root.");

	let err =
		store.write(VAULT, "../escape.txt", b"x").await.expect_err("Expected traversal refusal.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err}");
	assert!(!dir.path().join("uploads").join("escape.txt").exists());
	assert!(!dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn vaults_do_not_share_blob_names() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let store = BlobStore::new(dir.path());
	let other = Uuid::from_u128(0x5678);

	store.write(VAULT, "a.txt", b"mine").await.expect("Failed to write blob.");
	store.write(other, "a.txt", b"theirs").await.expect("Failed to write blob.");

	assert_eq!(store.read(VAULT, "a.txt").await.expect("Failed to read blob."), b"mine");
	assert_eq!(store.read(other, "a.txt").await.expect("Failed to read blob."), b"theirs");
}
