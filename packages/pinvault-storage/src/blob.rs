//! Uploaded file bytes on local disk.
//!
//! Layout: `{root}/{vault_id}/{name}`, where the service names each blob after the `file_id` of the
//! record that owns it. Anything that could escape the vault directory is rejected before touching
//! the disk.

use std::{
	io::ErrorKind,
	path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct BlobStore {
	root: PathBuf,
}
impl BlobStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Creates the uploads root if it does not exist yet.
	pub async fn ensure_root(&self) -> Result<()> {
		fs::create_dir_all(&self.root).await.map_err(|err| Error::blob(&self.root, err))
	}

	pub fn vault_dir(&self, vault_id: Uuid) -> PathBuf {
		self.root.join(vault_id.hyphenated().to_string())
	}

	pub fn path_for(&self, vault_id: Uuid, name: &str) -> Result<PathBuf> {
		if !is_plain_name(name) {
			return Err(Error::InvalidArgument(format!("Unsafe blob name {name:?}.")));
		}

		Ok(self.vault_dir(vault_id).join(name))
	}

	/// Writes `data` under `name`, replacing any previous blob atomically.
	pub async fn write(&self, vault_id: Uuid, name: &str, data: &[u8]) -> Result<()> {
		let path = self.path_for(vault_id, name)?;
		let dir = self.vault_dir(vault_id);

		fs::create_dir_all(&dir).await.map_err(|err| Error::blob(&dir, err))?;

		let temp_path = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
		let result = write_and_rename(&temp_path, &path, data).await;

		if result.is_err() {
			let _ = fs::remove_file(&temp_path).await;
		}

		result
	}

	pub async fn read(&self, vault_id: Uuid, name: &str) -> Result<Vec<u8>> {
		let path = self.path_for(vault_id, name)?;

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(err) if err.kind() == ErrorKind::NotFound =>
				Err(Error::NotFound(format!("Blob {name:?} is missing."))),
			Err(err) => Err(Error::blob(path, err)),
		}
	}

	/// Removes the blob. Returns `false` when there was nothing to remove.
	pub async fn remove(&self, vault_id: Uuid, name: &str) -> Result<bool> {
		let path = self.path_for(vault_id, name)?;

		match fs::remove_file(&path).await {
			Ok(()) => Ok(true),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
			Err(err) => Err(Error::blob(path, err)),
		}
	}

	pub async fn exists(&self, vault_id: Uuid, name: &str) -> Result<bool> {
		let path = self.path_for(vault_id, name)?;

		fs::try_exists(&path).await.map_err(|err| Error::blob(path, err))
	}
}

async fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> Result<()> {
	let mut file = fs::File::create(temp_path).await.map_err(|err| Error::blob(temp_path, err))?;

	file.write_all(data).await.map_err(|err| Error::blob(temp_path, err))?;
	file.sync_all().await.map_err(|err| Error::blob(temp_path, err))?;

	drop(file);

	fs::rename(temp_path, path).await.map_err(|err| Error::blob(path, err))?;

	tracing::debug!(path = %path.display(), size = data.len(), "Blob written.");

	Ok(())
}

fn is_plain_name(name: &str) -> bool {
	!name.is_empty()
		&& name != "."
		&& name != ".."
		&& !name.starts_with('.')
		&& !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_names_stay_inside_the_vault_directory() {
		let store = BlobStore::new("/srv/uploads");
		let vault_id = Uuid::nil();

		assert_eq!(
			store.path_for(vault_id, "1234_a.txt").expect("plain name"),
			PathBuf::from("/srv/uploads/00000000-0000-0000-0000-000000000000/1234_a.txt")
		);

		for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", ".hidden", "nul\0byte"] {
			assert!(store.path_for(vault_id, name).is_err(), "{name:?} must be rejected");
		}
	}
}
