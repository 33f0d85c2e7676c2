// crates.io
use time::{Duration, macros};
// self
use session_warden::{
	auth::{
		AccessTokenRecord, ClientId, RefreshTokenRecord, TokenRowId, UNKNOWN_CLIENT, UserId,
	},
	store::{MemoryStore, RevokeOutcome, TokenStore},
};

fn client(id: &str) -> ClientId {
	ClientId::new(id).expect("Failed to build client identifier for store tests.")
}

fn build_record(
	client_id: &ClientId,
	user: UserId,
	created: time::OffsetDateTime,
) -> AccessTokenRecord {
	AccessTokenRecord::builder(client_id.clone(), user)
		.created_at(created)
		.expires_in(Duration::hours(1))
		.build()
		.expect("Access token fixture should build successfully.")
}

#[tokio::test]
async fn count_active_clients_is_distinct_and_skips_revoked() {
	let store = MemoryStore::default();
	let claude = client("claude-desktop");
	let chatgpt = client("chatgpt");
	let created = macros::datetime!(2025-05-01 12:00 UTC);

	// Two tokens for the same client still count as one connection.
	store
		.insert_access_token(build_record(&claude, UserId(1), created))
		.await
		.expect("Failed to insert first claude token.");
	store
		.insert_access_token(build_record(&claude, UserId(1), created + Duration::minutes(5)))
		.await
		.expect("Failed to insert second claude token.");

	let second = store
		.insert_access_token(build_record(&chatgpt, UserId(1), created + Duration::minutes(10)))
		.await
		.expect("Failed to insert chatgpt token.");

	assert_eq!(
		store
			.count_active_clients(UserId(1))
			.await
			.expect("Failed to count active clients."),
		2
	);

	store
		.revoke_token(second, macros::datetime!(2025-05-01 13:00 UTC))
		.await
		.expect("Failed to revoke chatgpt token.");

	assert_eq!(
		store
			.count_active_clients(UserId(1))
			.await
			.expect("Failed to count active clients after revoke."),
		1
	);
	assert_eq!(
		store
			.count_active_clients(UserId(2))
			.await
			.expect("Failed to count active clients for another user."),
		0
	);
}

#[tokio::test]
async fn listing_excludes_revoked_and_expired_and_orders_by_recency() {
	let store = MemoryStore::default();
	let claude = client("claude-desktop");
	let chatgpt = client("chatgpt");

	store
		.register_client(claude.clone(), "Claude Desktop".into())
		.await
		.expect("Failed to register claude client.");

	let oldest = store
		.insert_access_token(build_record(&claude, UserId(1), macros::datetime!(2025-05-01 08:00 UTC)))
		.await
		.expect("Failed to insert oldest token.");
	let newest = store
		.insert_access_token(build_record(&chatgpt, UserId(2), macros::datetime!(2025-05-01 10:00 UTC)))
		.await
		.expect("Failed to insert newest token.");
	let revoked = store
		.insert_access_token(build_record(&claude, UserId(1), macros::datetime!(2025-05-01 09:00 UTC)))
		.await
		.expect("Failed to insert to-be-revoked token.");
	// Expired one hour after creation.
	let _expired = store
		.insert_access_token(build_record(&claude, UserId(1), macros::datetime!(2025-05-01 06:00 UTC)))
		.await
		.expect("Failed to insert expired token.");

	store
		.revoke_token(revoked, macros::datetime!(2025-05-01 09:30 UTC))
		.await
		.expect("Failed to revoke middle token.");

	let sessions = store
		.list_active_sessions(macros::datetime!(2025-05-01 10:30 UTC))
		.await
		.expect("Failed to list active sessions.");
	let ids: Vec<_> = sessions.iter().map(|session| session.id).collect();

	assert_eq!(ids, vec![newest, oldest]);
	assert_eq!(sessions[0].client_name, UNKNOWN_CLIENT);
	assert_eq!(sessions[1].client_name, "Claude Desktop");
	assert_eq!(sessions[1].token_id_prefix.chars().count(), 16);
}

#[tokio::test]
async fn revoke_token_is_idempotent_and_reports_missing_ids() {
	let store = MemoryStore::default();
	let claude = client("claude-desktop");
	let id = store
		.insert_access_token(build_record(&claude, UserId(1), macros::datetime!(2025-05-01 08:00 UTC)))
		.await
		.expect("Failed to insert token fixture.");
	let at = macros::datetime!(2025-05-01 09:00 UTC);

	assert_eq!(
		store.revoke_token(id, at).await.expect("First revoke should succeed."),
		RevokeOutcome::Revoked
	);
	assert_eq!(
		store
			.revoke_token(id, at + Duration::hours(1))
			.await
			.expect("Second revoke should succeed."),
		RevokeOutcome::Revoked
	);

	let record = store
		.fetch_access_token(id)
		.await
		.expect("Failed to fetch revoked token.")
		.expect("Revoked token row must remain stored for audit.");

	assert_eq!(record.revoked_at, Some(at), "Repeat revokes must not move the instant.");
	assert_eq!(
		store
			.revoke_token(TokenRowId(999), at)
			.await
			.expect("Revoking an unknown id should not error."),
		RevokeOutcome::Missing
	);
}

#[tokio::test]
async fn revoke_token_revokes_paired_refresh_rows() {
	let store = MemoryStore::default();
	let claude = client("claude-desktop");
	let id = store
		.insert_access_token(build_record(&claude, UserId(1), macros::datetime!(2025-05-01 08:00 UTC)))
		.await
		.expect("Failed to insert token fixture.");

	store
		.insert_refresh_token(RefreshTokenRecord::new(id))
		.await
		.expect("Failed to insert refresh token fixture.");
	store
		.revoke_token(id, macros::datetime!(2025-05-01 09:00 UTC))
		.await
		.expect("Failed to revoke token.");

	let refresh = store
		.refresh_tokens_for(id)
		.await
		.expect("Failed to list refresh tokens after revoke.");

	assert!(!refresh.is_empty());
	assert!(refresh.iter().all(RefreshTokenRecord::is_revoked));
}

#[tokio::test]
async fn revoke_all_clears_one_user_and_spares_others() {
	let store = MemoryStore::default();
	let claude = client("claude-desktop");
	let chatgpt = client("chatgpt");
	let created = macros::datetime!(2025-05-01 08:00 UTC);

	// User 1: three tokens across two clients, each with a refresh row.
	let mut user_one_ids = Vec::new();

	for (client_id, offset) in
		[(&claude, 0), (&claude, 5), (&chatgpt, 10)]
	{
		let id = store
			.insert_access_token(build_record(client_id, UserId(1), created + Duration::minutes(offset)))
			.await
			.expect("Failed to insert user-one token.");

		store
			.insert_refresh_token(RefreshTokenRecord::new(id))
			.await
			.expect("Failed to insert user-one refresh token.");
		user_one_ids.push(id);
	}

	let other = store
		.insert_access_token(build_record(&claude, UserId(2), created))
		.await
		.expect("Failed to insert user-two token.");

	store
		.insert_refresh_token(RefreshTokenRecord::new(other))
		.await
		.expect("Failed to insert user-two refresh token.");
	store
		.revoke_all_for_user(UserId(1), macros::datetime!(2025-05-01 09:00 UTC))
		.await
		.expect("Failed to revoke all tokens for user one.");

	assert_eq!(
		store
			.count_active_clients(UserId(1))
			.await
			.expect("Failed to count user-one clients."),
		0
	);

	for id in user_one_ids {
		let refresh = store
			.refresh_tokens_for(id)
			.await
			.expect("Failed to list user-one refresh tokens.");

		assert!(refresh.iter().all(RefreshTokenRecord::is_revoked));
	}

	assert_eq!(
		store
			.count_active_clients(UserId(2))
			.await
			.expect("Failed to count user-two clients."),
		1
	);
	assert!(
		!store
			.refresh_tokens_for(other)
			.await
			.expect("Failed to list user-two refresh tokens.")
			.iter()
			.any(RefreshTokenRecord::is_revoked)
	);
}

#[tokio::test]
async fn revoke_all_with_zero_tokens_is_a_silent_noop() {
	let store = MemoryStore::default();

	store
		.revoke_all_for_user(UserId(42), macros::datetime!(2025-05-01 09:00 UTC))
		.await
		.expect("Revoke-all for a user without tokens should not error.");

	assert_eq!(
		store
			.count_active_clients(UserId(42))
			.await
			.expect("Failed to count clients for empty user."),
		0
	);
}
