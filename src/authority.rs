//! High-level session authority facade coordinating limits and the token store.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, RefreshTokenRecord, SessionView, TokenRowId, UserId},
	limits::Limits,
	obs::{self, ActionKind, ActionMetrics, ActionOutcome, ActionSpan},
	store::{RevokeOutcome, TokenStore},
};

/// Coordinates quota checks and revocations over one durable token store.
///
/// The authority owns the revoke write path and answers the quota questions the external OAuth
/// grant flow asks before issuing tokens. Authorization is the caller's responsibility: every
/// mutating entry point assumes the boundary layer already performed its capability and
/// anti-forgery checks.
#[derive(Clone)]
pub struct SessionAuthority {
	/// Token store implementation that persists issued-token rows.
	pub store: Arc<dyn TokenStore>,
	/// Quota component consulted before a new connection is admitted.
	pub limits: Arc<Limits>,
	/// Shared metrics recorder for revocation outcomes.
	pub revoke_metrics: Arc<ActionMetrics>,
}
impl SessionAuthority {
	/// Creates an authority over the provided store and limits component.
	pub fn new(store: Arc<dyn TokenStore>, limits: Limits) -> Self {
		Self { store, limits: Arc::new(limits), revoke_metrics: Default::default() }
	}

	/// Returns `true` if the user may connect another distinct client.
	///
	/// This check and the subsequent token-issuance write are two separate storage round trips
	/// performed by the grant flow; two concurrent grants racing for the last slot may both
	/// observe `true`. That over-admission is an accepted soft limit, not a security boundary.
	pub async fn can_add_connection(&self, user_id: UserId) -> Result<bool> {
		const KIND: ActionKind = ActionKind::QuotaCheck;

		let span = ActionSpan::new(KIND, "can_add_connection");

		obs::record_action_outcome(KIND, ActionOutcome::Attempt);

		let result = span
			.instrument(async move {
				let active = self.store.count_active_clients(user_id).await?;
				let cap = self.limits.max_connections_per_user();

				Ok(active < cap as usize)
			})
			.await;

		obs::record_action_outcome(KIND, outcome_of(&result));

		result
	}

	/// Returns `true` if another user may be added to the allowed-users collection.
	pub fn can_add_user(&self) -> bool {
		self.limits.can_add_user()
	}

	/// Active sessions across all users, most recent first, for admin rendering.
	pub async fn list_active_sessions(&self) -> Result<Vec<SessionView>> {
		self.list_active_sessions_at(OffsetDateTime::now_utc()).await
	}

	/// Active sessions evaluated against an explicit instant.
	pub async fn list_active_sessions_at(&self, at: OffsetDateTime) -> Result<Vec<SessionView>> {
		const KIND: ActionKind = ActionKind::ListSessions;

		let span = ActionSpan::new(KIND, "list_active_sessions");

		obs::record_action_outcome(KIND, ActionOutcome::Attempt);

		let result =
			span.instrument(async move { Ok(self.store.list_active_sessions(at).await?) }).await;

		obs::record_action_outcome(KIND, outcome_of(&result));

		result
	}

	/// Revokes one session by its access token row id, along with its paired refresh rows.
	///
	/// Idempotent: an already-revoked row and a repeated call both report
	/// [`RevokeOutcome::Revoked`]; a missing id reports [`RevokeOutcome::Missing`] so the
	/// boundary can answer `not_found`. Storage failures surface so the caller can report
	/// "try again".
	pub async fn revoke_session(&self, id: TokenRowId) -> Result<RevokeOutcome> {
		const KIND: ActionKind = ActionKind::RevokeSession;

		let span = ActionSpan::new(KIND, "revoke_session");

		obs::record_action_outcome(KIND, ActionOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.revoke_metrics.record_attempt();

				let outcome =
					self.store.revoke_token(id, OffsetDateTime::now_utc()).await.map_err(
						|err| {
							self.revoke_metrics.record_failure();

							Error::from(err)
						},
					)?;

				self.revoke_metrics.record_success();

				Ok(outcome)
			})
			.await;

		obs::record_action_outcome(KIND, outcome_of(&result));

		result
	}

	/// Revokes every session of the user - access and refresh tokens in one atomic unit.
	///
	/// Always succeeds unless the underlying storage operation fails, in which case the failure
	/// is surfaced, never swallowed.
	pub async fn revoke_all_sessions(&self, user_id: UserId) -> Result<()> {
		const KIND: ActionKind = ActionKind::RevokeAll;

		let span = ActionSpan::new(KIND, "revoke_all_sessions");

		obs::record_action_outcome(KIND, ActionOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.revoke_metrics.record_attempt();

				self.store.revoke_all_for_user(user_id, OffsetDateTime::now_utc()).await.map_err(
					|err| {
						self.revoke_metrics.record_failure();

						Error::from(err)
					},
				)?;

				self.revoke_metrics.record_success();

				Ok(())
			})
			.await;

		obs::record_action_outcome(KIND, outcome_of(&result));

		result
	}

	/// Persists a freshly issued access token on behalf of the external grant flow.
	///
	/// The grant flow is expected to consult [`SessionAuthority::can_add_connection`] first; the
	/// store itself never rejects an insert.
	pub async fn issue_access_token(&self, record: AccessTokenRecord) -> Result<TokenRowId> {
		Ok(self.store.insert_access_token(record).await?)
	}

	/// Persists a refresh token paired with a stored access token row.
	pub async fn issue_refresh_token(&self, record: RefreshTokenRecord) -> Result<()> {
		Ok(self.store.insert_refresh_token(record).await?)
	}
}
impl Debug for SessionAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionAuthority").field("limits", &self.limits).finish()
	}
}

fn outcome_of<T>(result: &Result<T>) -> ActionOutcome {
	if result.is_ok() { ActionOutcome::Success } else { ActionOutcome::Failure }
}
