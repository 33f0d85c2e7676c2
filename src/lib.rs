//! Connection/session authority for OAuth-connected AI clients - plan-aware connection quotas,
//! revocation-consistent token stores, and admin session views in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authority;
pub mod error;
pub mod license;
pub mod limits;
pub mod obs;
pub mod options;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		authority::SessionAuthority,
		limits::Limits,
		options::MemoryOptions,
		store::{MemoryStore, TokenStore},
	};

	/// Constructs a [`SessionAuthority`] backed by fresh in-memory storage and options, returning
	/// the concrete store and options handles so tests can seed and inspect state directly.
	pub fn build_memory_authority() -> (SessionAuthority, Arc<MemoryStore>, Arc<MemoryOptions>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let options = Arc::new(MemoryOptions::default());
		let limits = Limits::new(options.clone());
		let authority = SessionAuthority::new(store, limits);

		(authority, store_backend, options)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}
