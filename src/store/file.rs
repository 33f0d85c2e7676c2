//! Simple file-backed [`TokenStore`] for single-host deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, ClientId, RefreshTokenRecord, SessionView, TokenRowId, UserId},
	store::{RevokeOutcome, StoreError, StoreFuture, TokenStore, TokenTable},
};

/// Persists the token table to a JSON file after each mutation.
///
/// Snapshots are written to a sibling `.tmp` file, synced, and renamed into place, so a
/// mutation (including `revoke_all_for_user`) is either fully durable or not visible at all.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<TokenTable>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { TokenTable::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<TokenTable, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(TokenTable::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &TokenTable) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenStore for FileStore {
	fn insert_access_token(&self, record: AccessTokenRecord) -> StoreFuture<'_, TokenRowId> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let id = guard.insert_access(record);

			self.persist_locked(&guard)?;

			Ok(id)
		})
	}

	fn insert_refresh_token(&self, record: RefreshTokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert_refresh(record);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn register_client(&self, client_id: ClientId, name: String) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.register_client(client_id, name);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn fetch_access_token(&self, id: TokenRowId) -> StoreFuture<'_, Option<AccessTokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().fetch_access(id)) })
	}

	fn refresh_tokens_for(&self, id: TokenRowId) -> StoreFuture<'_, Vec<RefreshTokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().refresh_for(id)) })
	}

	fn count_active_clients(&self, user_id: UserId) -> StoreFuture<'_, usize> {
		Box::pin(async move { Ok(self.inner.read().count_active_clients(user_id)) })
	}

	fn list_active_sessions(&self, at: OffsetDateTime) -> StoreFuture<'_, Vec<SessionView>> {
		Box::pin(async move { Ok(self.inner.read().active_sessions(at)) })
	}

	fn revoke_token(&self, id: TokenRowId, at: OffsetDateTime) -> StoreFuture<'_, RevokeOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let outcome = guard.revoke(id, at);

			if matches!(outcome, RevokeOutcome::Revoked) {
				self.persist_locked(&guard)?;
			}

			Ok(outcome)
		})
	}

	fn revoke_all_for_user(&self, user_id: UserId, at: OffsetDateTime) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.revoke_all(user_id, at);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
