//! Refresh token record tied to a stored access token row.

// self
use crate::{_prelude::*, auth::id::TokenRowId};

/// Renewal credential paired with one stored access token.
///
/// The secret material and expiry of the refresh credential are owned by the external OAuth
/// grant-flow library; this record only carries what the revocation path needs. Invariant:
/// whenever the parent access token is revoked, every refresh row sharing its
/// `access_token_id` is revoked in the same logical operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
	/// Surrogate key of the parent access token row.
	pub access_token_id: TokenRowId,
	/// Revocation instant if the record has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl RefreshTokenRecord {
	/// Creates an unrevoked refresh record for the given access token row.
	pub fn new(access_token_id: TokenRowId) -> Self {
		Self { access_token_id, revoked_at: None }
	}

	/// Returns `true` if the record has been revoked.
	pub fn is_revoked(&self) -> bool {
		self.revoked_at.is_some()
	}

	/// Marks the record as revoked. Idempotent: the first revocation instant is kept.
	pub fn revoke(&mut self, instant: OffsetDateTime) {
		if self.revoked_at.is_none() {
			self.revoked_at = Some(instant);
		}
	}
}
