//! Admin-facing projection of an active access token.

// self
use crate::{
	_prelude::*,
	auth::{id::TokenRowId, token::record::AccessTokenRecord},
};

/// Placeholder rendered when the owning client registration is missing.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";
/// Number of leading token-identifier characters exposed to the admin view.
pub const TOKEN_ID_PREFIX_LEN: usize = 16;

/// Admin-facing view of one active connection, decorated with the client name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
	/// Surrogate key of the underlying access token row; the revoke target.
	pub id: TokenRowId,
	/// Display name of the OAuth client, or [`UNKNOWN_CLIENT`].
	pub client_name: String,
	/// Leading characters of the public token identifier; never the full credential.
	pub token_id_prefix: String,
	/// Instant the connection was established.
	pub connected_at: OffsetDateTime,
}
impl SessionView {
	/// Builds a view from a stored row and the joined client name, if any.
	pub fn from_record(id: TokenRowId, record: &AccessTokenRecord, client_name: Option<&str>) -> Self {
		let token_id = record.token_id.as_ref();
		let prefix_end = token_id
			.char_indices()
			.nth(TOKEN_ID_PREFIX_LEN)
			.map_or(token_id.len(), |(index, _)| index);

		Self {
			id,
			client_name: client_name.filter(|name| !name.is_empty()).unwrap_or(UNKNOWN_CLIENT).into(),
			token_id_prefix: token_id[..prefix_end].into(),
			connected_at: record.created_at,
		}
	}

	/// Age of the connection at the provided instant, for human-readable rendering.
	pub fn connected_ago(&self, at: OffsetDateTime) -> Duration {
		at - self.connected_at
	}
}
