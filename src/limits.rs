//! Plan limits and the quota math gating users and connections.
//!
//! Free-tier defaults are compile-time constants. A premium tier raises them by registering a
//! [`PlanResolver`]; at most one resolver is active at a time and re-registration replaces the
//! previous one (last write wins). Overrides merge key-by-key over the defaults, so a resolver
//! that only raises `max_users` still inherits the default connection cap.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	options::{ALLOWED_USERS_KEY, OptionStore, OptionStoreExt},
};

/// Plan identifier reported when no resolver is registered.
pub const FREE_PLAN: &str = "free";

/// Effective quota values for the active plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
	/// Maximum number of site accounts allowed to authorize connections.
	pub max_users: u32,
	/// Maximum number of distinct connected clients per user.
	pub max_connections_per_user: u32,
}
impl PlanLimits {
	/// Free-tier defaults applied when no resolver override is active.
	pub const FREE: Self = Self { max_users: 2, max_connections_per_user: 1 };

	/// Returns a copy with every key present in `overrides` replaced; `self` is untouched.
	pub fn merged(self, overrides: &LimitOverrides) -> Self {
		Self {
			max_users: overrides.max_users.unwrap_or(self.max_users),
			max_connections_per_user: overrides
				.max_connections_per_user
				.unwrap_or(self.max_connections_per_user),
		}
	}
}
impl Default for PlanLimits {
	fn default() -> Self {
		Self::FREE
	}
}

/// Key-by-key overrides supplied by a plan resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitOverrides {
	/// Replacement for [`PlanLimits::max_users`], if present.
	pub max_users: Option<u32>,
	/// Replacement for [`PlanLimits::max_connections_per_user`], if present.
	pub max_connections_per_user: Option<u32>,
}
impl LimitOverrides {
	/// Decodes overrides from a raw JSON mapping.
	///
	/// Returns `None` when the payload is not a mapping of string keys to non-negative
	/// integers; a malformed override falls back to the defaults rather than raising. Unknown
	/// keys are ignored so newer resolvers stay compatible with older cores.
	pub fn from_value(value: &Value) -> Option<Self> {
		let mapping = value.as_object()?;
		let read = |key: &str| -> Result<Option<u32>, ()> {
			match mapping.get(key) {
				None => Ok(None),
				Some(raw) =>
					raw.as_u64().and_then(|n| u32::try_from(n).ok()).map(Some).ok_or(()),
			}
		};

		Some(Self {
			max_users: read("max_users").ok()?,
			max_connections_per_user: read("max_connections_per_user").ok()?,
		})
	}
}

/// Capability supplied by premium addons to override free-tier limits.
pub trait PlanResolver
where
	Self: Send + Sync,
{
	/// Plan identifier, e.g. `"pro"` or `"agency"`.
	fn plan(&self) -> String;

	/// Raw limit overrides for the plan, or `None` to keep the core defaults.
	fn limit_overrides(&self) -> Option<Value>;
}

/// Quota component combining the resolver slot with the allowed-users collection.
///
/// The resolver slot is explicit per-instance state injected at construction time, not a
/// process-wide global; "at most one active override" is preserved by the replace-on-register
/// semantics.
pub struct Limits {
	resolver: RwLock<Option<Arc<dyn PlanResolver>>>,
	options: Arc<dyn OptionStore>,
}
impl Limits {
	/// Creates a limits component reading the allowed-users collection from `options`.
	pub fn new(options: Arc<dyn OptionStore>) -> Self {
		Self { resolver: RwLock::new(None), options }
	}

	/// Installs a plan resolver, replacing any previously registered one.
	pub fn register_plan_resolver(&self, resolver: Arc<dyn PlanResolver>) {
		*self.resolver.write() = Some(resolver);
	}

	/// Effective limits: free-tier defaults with any valid resolver overrides merged in.
	pub fn get_limits(&self) -> PlanLimits {
		let overrides = self
			.resolver
			.read()
			.as_ref()
			.and_then(|resolver| resolver.limit_overrides())
			.and_then(|value| LimitOverrides::from_value(&value));

		match overrides {
			Some(overrides) => PlanLimits::FREE.merged(&overrides),
			None => PlanLimits::FREE,
		}
	}

	/// Maximum number of site accounts allowed to authorize connections.
	pub fn max_users(&self) -> u32 {
		self.get_limits().max_users
	}

	/// Maximum number of distinct connected clients per user.
	pub fn max_connections_per_user(&self) -> u32 {
		self.get_limits().max_connections_per_user
	}

	/// Identifier of the active plan; [`FREE_PLAN`] when no resolver is registered.
	pub fn plan(&self) -> String {
		self.resolver.read().as_ref().map_or_else(|| FREE_PLAN.into(), |resolver| resolver.plan())
	}

	/// Returns `true` if another user fits under [`PlanLimits::max_users`].
	///
	/// The allowed-users collection is external configuration; a missing or malformed entry
	/// counts as empty.
	pub fn can_add_user(&self) -> bool {
		let allowed: Vec<u64> = self.options.get(ALLOWED_USERS_KEY).unwrap_or_default();

		(allowed.len() as u64) < u64::from(self.max_users())
	}
}
impl Debug for Limits {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Limits")
			.field("resolver_registered", &self.resolver.read().is_some())
			.field("limits", &self.get_limits())
			.finish()
	}
}
