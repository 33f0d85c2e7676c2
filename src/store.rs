//! Storage contracts and built-in store implementations for issued-token rows.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, ClientId, RefreshTokenRecord, SessionView, TokenRowId, UserId},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the durable token table.
///
/// The session authority owns the revoke write path; the grant-flow collaborator owns the
/// insert path; nothing else may mutate revocation state. Quota counts must reflect the latest
/// committed state at call time, so implementations must not cache reads.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists a freshly issued access token, assigning its surrogate key.
	fn insert_access_token(&self, record: AccessTokenRecord) -> StoreFuture<'_, TokenRowId>;

	/// Persists a refresh token paired with a stored access token row.
	fn insert_refresh_token(&self, record: RefreshTokenRecord) -> StoreFuture<'_, ()>;

	/// Registers (or renames) a client application for session display purposes.
	fn register_client(&self, client_id: ClientId, name: String) -> StoreFuture<'_, ()>;

	/// Fetches a stored access token row by surrogate key, if present.
	fn fetch_access_token(&self, id: TokenRowId) -> StoreFuture<'_, Option<AccessTokenRecord>>;

	/// Returns the refresh rows paired with the given access token row.
	fn refresh_tokens_for(&self, id: TokenRowId) -> StoreFuture<'_, Vec<RefreshTokenRecord>>;

	/// Number of distinct clients holding a non-revoked access token for the user.
	///
	/// Expired-but-unrevoked tokens still count; this mirrors the quota gate's view of a
	/// "connection" as an unrevoked grant.
	fn count_active_clients(&self, user_id: UserId) -> StoreFuture<'_, usize>;

	/// Active sessions (non-revoked, unexpired at `at`) joined with client names, most recent
	/// first.
	fn list_active_sessions(&self, at: OffsetDateTime) -> StoreFuture<'_, Vec<SessionView>>;

	/// Revokes the access token row with the given surrogate key along with its paired refresh
	/// rows. A missing id reports [`RevokeOutcome::Missing`]; an already-revoked row is an
	/// idempotent [`RevokeOutcome::Revoked`].
	fn revoke_token(&self, id: TokenRowId, at: OffsetDateTime) -> StoreFuture<'_, RevokeOutcome>;

	/// Revokes every access token of the user plus every refresh row paired with them, as one
	/// atomic unit. With zero stored tokens this is a silent no-op.
	fn revoke_all_for_user(&self, user_id: UserId, at: OffsetDateTime) -> StoreFuture<'_, ()>;
}

/// Result of a single-token revoke attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevokeOutcome {
	/// The row is revoked after the call (freshly or already).
	Revoked,
	/// No row matched the provided surrogate key.
	Missing,
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Row-level state shared by the built-in backends; every mutation happens under the owning
/// backend's write lock, which is what makes `revoke_all` all-or-nothing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct TokenTable {
	next_row_id: u64,
	access_tokens: BTreeMap<TokenRowId, AccessTokenRecord>,
	refresh_tokens: Vec<RefreshTokenRecord>,
	clients: HashMap<ClientId, String>,
}
impl TokenTable {
	pub(crate) fn insert_access(&mut self, record: AccessTokenRecord) -> TokenRowId {
		self.next_row_id += 1;

		let id = TokenRowId(self.next_row_id);

		self.access_tokens.insert(id, record);

		id
	}

	pub(crate) fn insert_refresh(&mut self, record: RefreshTokenRecord) {
		self.refresh_tokens.push(record);
	}

	pub(crate) fn register_client(&mut self, client_id: ClientId, name: String) {
		self.clients.insert(client_id, name);
	}

	pub(crate) fn fetch_access(&self, id: TokenRowId) -> Option<AccessTokenRecord> {
		self.access_tokens.get(&id).cloned()
	}

	pub(crate) fn refresh_for(&self, id: TokenRowId) -> Vec<RefreshTokenRecord> {
		self.refresh_tokens
			.iter()
			.filter(|record| record.access_token_id == id)
			.cloned()
			.collect()
	}

	pub(crate) fn count_active_clients(&self, user_id: UserId) -> usize {
		self.access_tokens
			.values()
			.filter(|record| record.user_id == user_id && !record.is_revoked())
			.map(|record| &record.client_id)
			.collect::<BTreeSet<_>>()
			.len()
	}

	pub(crate) fn active_sessions(&self, at: OffsetDateTime) -> Vec<SessionView> {
		let mut sessions: Vec<_> = self
			.access_tokens
			.iter()
			.filter(|(_, record)| record.is_active_at(at))
			.map(|(id, record)| {
				SessionView::from_record(*id, record, self.clients.get(&record.client_id).map(String::as_str))
			})
			.collect();

		// Most recent first; row id breaks creation-time ties deterministically.
		sessions.sort_by(|a, b| {
			b.connected_at.cmp(&a.connected_at).then_with(|| b.id.cmp(&a.id))
		});

		sessions
	}

	pub(crate) fn revoke(&mut self, id: TokenRowId, at: OffsetDateTime) -> RevokeOutcome {
		match self.access_tokens.get_mut(&id) {
			Some(record) => {
				record.revoke(at);
				self.revoke_refresh_rows(&[id], at);

				RevokeOutcome::Revoked
			},
			None => RevokeOutcome::Missing,
		}
	}

	pub(crate) fn revoke_all(&mut self, user_id: UserId, at: OffsetDateTime) {
		let ids: Vec<_> = self
			.access_tokens
			.iter()
			.filter(|(_, record)| record.user_id == user_id)
			.map(|(id, _)| *id)
			.collect();

		if ids.is_empty() {
			return;
		}

		for id in &ids {
			if let Some(record) = self.access_tokens.get_mut(id) {
				record.revoke(at);
			}
		}

		self.revoke_refresh_rows(&ids, at);
	}

	fn revoke_refresh_rows(&mut self, access_ids: &[TokenRowId], at: OffsetDateTime) {
		for record in &mut self.refresh_tokens {
			if access_ids.contains(&record.access_token_id) {
				record.revoke(at);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_authority_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Authority error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn revoke_outcome_can_be_serialized() {
		let payload = serde_json::to_string(&RevokeOutcome::Revoked)
			.expect("RevokeOutcome should serialize to JSON.");

		assert_eq!(payload, "\"Revoked\"");

		let round_trip: RevokeOutcome = serde_json::from_str(&payload)
			.expect("Serialized outcome should deserialize from JSON.");

		assert_eq!(round_trip, RevokeOutcome::Revoked);
	}
}
