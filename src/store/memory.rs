//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, ClientId, RefreshTokenRecord, SessionView, TokenRowId, UserId},
	store::{RevokeOutcome, StoreFuture, TokenStore, TokenTable},
};

type StoreMap = Arc<RwLock<TokenTable>>;

/// Thread-safe storage backend that keeps token rows in-process for tests and demos.
///
/// Every mutating operation runs under a single write guard, so `revoke_all_for_user` is
/// observed all-or-nothing by concurrent readers.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl TokenStore for MemoryStore {
	fn insert_access_token(&self, record: AccessTokenRecord) -> StoreFuture<'_, TokenRowId> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().insert_access(record)) })
	}

	fn insert_refresh_token(&self, record: RefreshTokenRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert_refresh(record);

			Ok(())
		})
	}

	fn register_client(&self, client_id: ClientId, name: String) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().register_client(client_id, name);

			Ok(())
		})
	}

	fn fetch_access_token(&self, id: TokenRowId) -> StoreFuture<'_, Option<AccessTokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().fetch_access(id)) })
	}

	fn refresh_tokens_for(&self, id: TokenRowId) -> StoreFuture<'_, Vec<RefreshTokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().refresh_for(id)) })
	}

	fn count_active_clients(&self, user_id: UserId) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().count_active_clients(user_id)) })
	}

	fn list_active_sessions(&self, at: OffsetDateTime) -> StoreFuture<'_, Vec<SessionView>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().active_sessions(at)) })
	}

	fn revoke_token(&self, id: TokenRowId, at: OffsetDateTime) -> StoreFuture<'_, RevokeOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().revoke(id, at)) })
	}

	fn revoke_all_for_user(&self, user_id: UserId, at: OffsetDateTime) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().revoke_all(user_id, at);

			Ok(())
		})
	}
}
