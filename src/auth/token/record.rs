//! Access token record struct, lifecycle helpers, and builder.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::id::{ClientId, IdentifierError, TokenId, UserId},
};

const TOKEN_ID_BYTES: usize = 32;

/// Current lifecycle status for an access token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
	/// Token has been revoked by the owning user or an administrator.
	Revoked,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum AccessTokenBuilderError {
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when the minted or supplied public token identifier failed validation.
	#[error("Token identifier is invalid.")]
	InvalidTokenId(#[from] IdentifierError),
}

/// Record describing one issued OAuth access grant.
///
/// Rows are audit-grade: they are never hard-deleted and never un-revoked. The only permitted
/// mutation is stamping `revoked_at`, which the store performs on behalf of the session
/// authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
	/// Opaque public identifier surfaced (prefixed) to the admin view.
	pub token_id: TokenId,
	/// OAuth client application this grant belongs to.
	pub client_id: ClientId,
	/// Site account that authorized the grant.
	pub user_id: UserId,
	/// Issuance instant recorded when the grant flow persisted the token.
	pub created_at: OffsetDateTime,
	/// Expiry instant after which the token is no longer usable.
	pub expires_at: OffsetDateTime,
	/// Revocation instant if the record has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl AccessTokenRecord {
	/// Returns a builder for constructing issuance-friendly records.
	pub fn builder(client_id: ClientId, user_id: UserId) -> AccessTokenBuilder {
		AccessTokenBuilder::new(client_id, user_id)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.revoked_at.is_some() {
			return TokenStatus::Revoked;
		}
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record is active (not revoked, not expired) at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Returns `true` if the record is currently active.
	pub fn is_active(&self) -> bool {
		matches!(self.status(), TokenStatus::Active)
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

/// Builder for [`AccessTokenRecord`].
#[derive(Clone, Debug)]
pub struct AccessTokenBuilder {
	client_id: ClientId,
	user_id: UserId,
	token_id: Option<TokenId>,
	created_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl AccessTokenBuilder {
	fn new(client_id: ClientId, user_id: UserId) -> Self {
		Self {
			client_id,
			user_id,
			token_id: None,
			created_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Supplies an externally minted public token identifier.
	pub fn token_id(mut self, token_id: TokenId) -> Self {
		self.token_id = Some(token_id);

		self
	}

	/// Sets the issuance instant.
	pub fn created_at(mut self, instant: OffsetDateTime) -> Self {
		self.created_at = Some(instant);

		self
	}

	/// Convenience helper that stamps `created_at` with the current clock.
	pub fn created_now(self) -> Self {
		self.created_at(OffsetDateTime::now_utc())
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issuance instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces an [`AccessTokenRecord`].
	///
	/// When no public identifier was supplied, a random URL-safe one is minted.
	pub fn build(self) -> Result<AccessTokenRecord, AccessTokenBuilderError> {
		let token_id = match self.token_id {
			Some(token_id) => token_id,
			None => TokenId::new(mint_token_id())?,
		};
		let created_at = self.created_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => created_at + delta,
			(None, None) => return Err(AccessTokenBuilderError::MissingExpiry),
		};

		Ok(AccessTokenRecord {
			token_id,
			client_id: self.client_id,
			user_id: self.user_id,
			created_at,
			expires_at,
			revoked_at: None,
		})
	}
}

fn mint_token_id() -> String {
	let mut bytes = [0_u8; TOKEN_ID_BYTES];

	rand::rng().fill(&mut bytes[..]);

	URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn fixture_ids() -> (ClientId, UserId) {
		let client = ClientId::new("claude-desktop").expect("Client fixture should be valid.");

		(client, UserId(1))
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let (client, user) = fixture_ids();
		let created = macros::datetime!(2025-01-01 00:00 UTC);
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let mut record = AccessTokenRecord::builder(client, user)
			.created_at(created)
			.expires_at(expires)
			.build()
			.expect("Access token builder should succeed for status transitions.");

		assert_eq!(record.status_at(macros::datetime!(2025-01-01 00:30 UTC)), TokenStatus::Active);
		assert_eq!(record.status_at(macros::datetime!(2025-01-01 01:00 UTC)), TokenStatus::Expired);

		record.revoke(macros::datetime!(2025-01-01 00:10 UTC));

		assert_eq!(record.status_at(macros::datetime!(2025-01-01 00:30 UTC)), TokenStatus::Revoked);
	}

	#[test]
	fn builder_handles_relative_expiry() {
		let (client, user) = fixture_ids();
		let record = AccessTokenRecord::builder(client, user)
			.created_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Access token builder should support relative expiry calculations.");

		assert_eq!(record.expires_at, macros::datetime!(2025-01-01 00:30 UTC));
	}

	#[test]
	fn builder_requires_expiry() {
		let (client, user) = fixture_ids();

		assert_eq!(
			AccessTokenRecord::builder(client, user).created_now().build(),
			Err(AccessTokenBuilderError::MissingExpiry)
		);
	}

	#[test]
	fn minted_token_ids_are_unique_and_valid() {
		let (client, user) = fixture_ids();
		let build = || {
			AccessTokenRecord::builder(client.clone(), user)
				.created_now()
				.expires_in(Duration::hours(1))
				.build()
				.expect("Minting builder should succeed.")
		};
		let first = build();
		let second = build();

		assert_ne!(first.token_id, second.token_id);
		assert!(!first.token_id.as_ref().is_empty());
	}

	#[test]
	fn revoke_keeps_first_instant() {
		let (client, user) = fixture_ids();
		let mut record = AccessTokenRecord::builder(client, user)
			.created_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Revocation fixture should build.");
		let first = macros::datetime!(2025-01-01 00:05 UTC);

		record.revoke(first);
		record.revoke(macros::datetime!(2025-01-01 00:30 UTC));

		assert_eq!(record.revoked_at, Some(first));
	}
}
