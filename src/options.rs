//! Typed key-value abstraction over the host's dynamic option storage.
//!
//! License records, plan data, and the allowed-users collection live in string-keyed site
//! options owned by the embedding application. The authority only ever reads them through
//! [`OptionStore`], which keeps the core storage-agnostic and testable with the in-memory fake.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::_prelude::*;

/// Option key holding the JSON array of user ids permitted to authorize connections.
pub const ALLOWED_USERS_KEY: &str = "allowed_users";

/// Read-only contract over string-keyed dynamic option storage.
pub trait OptionStore
where
	Self: Send + Sync,
{
	/// Fetches the raw JSON value stored under `key`, if present.
	fn get_raw(&self, key: &str) -> Option<Value>;
}

/// Typed read helpers layered over [`OptionStore`].
pub trait OptionStoreExt {
	/// Fetches and decodes the value stored under `key`.
	///
	/// Lenient by policy: a missing key and an undecodable payload both read as `None`, so
	/// malformed host data degrades to defaults instead of failing the caller.
	fn get<T>(&self, key: &str) -> Option<T>
	where
		T: DeserializeOwned;
}
impl<S> OptionStoreExt for S
where
	S: ?Sized + OptionStore,
{
	fn get<T>(&self, key: &str) -> Option<T>
	where
		T: DeserializeOwned,
	{
		self.get_raw(key).and_then(|value| serde_json::from_value(value).ok())
	}
}

/// Thread-safe in-memory [`OptionStore`] for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryOptions(RwLock<HashMap<String, Value>>);
impl MemoryOptions {
	/// Stores `value` under `key`, replacing any previous value.
	pub fn set(&self, key: impl Into<String>, value: Value) {
		self.0.write().insert(key.into(), value);
	}

	/// Removes the value stored under `key`, if any.
	pub fn remove(&self, key: &str) {
		self.0.write().remove(key);
	}
}
impl OptionStore for MemoryOptions {
	fn get_raw(&self, key: &str) -> Option<Value> {
		self.0.read().get(key).cloned()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn typed_reads_decode_stored_values() {
		let options = MemoryOptions::default();

		options.set(ALLOWED_USERS_KEY, json!([1, 7, 42]));

		let users: Vec<u64> = options
			.get(ALLOWED_USERS_KEY)
			.expect("Allowed users fixture should decode as a numeric array.");

		assert_eq!(users, vec![1, 7, 42]);
	}

	#[test]
	fn malformed_payloads_read_as_absent() {
		let options = MemoryOptions::default();

		options.set(ALLOWED_USERS_KEY, json!("not-an-array"));

		assert_eq!(options.get::<Vec<u64>>(ALLOWED_USERS_KEY), None);
		assert_eq!(options.get::<Vec<u64>>("missing"), None);
	}

	#[test]
	fn remove_clears_stored_values() {
		let options = MemoryOptions::default();

		options.set("key", json!(1));
		options.remove("key");

		assert_eq!(options.get_raw("key"), None);
	}
}
