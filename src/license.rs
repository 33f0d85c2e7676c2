//! Addon license entitlement gate.
//!
//! Licensing shares the "entitlement gate" shape with connection limits but none of the state:
//! it reads a stored license record per addon from the host's option storage and answers a
//! single boolean. Activation against the remote store is out of scope; only the stored
//! verdict is interpreted here.

// crates.io
use time::{Date, macros::format_description};
// self
use crate::{
	_prelude::*,
	auth::AddonSlug,
	options::{OptionStore, OptionStoreExt},
};

/// License status string a record must carry to pass the gate.
pub const VALID_STATUS: &str = "valid";

/// Returns the option key holding the license record for an addon's option slug.
pub fn license_option_key(option_slug: &str) -> String {
	format!("{option_slug}_license")
}

/// Expiry field of a stored license record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LicenseExpiry {
	/// The license never expires.
	Lifetime,
	/// The license is valid strictly before the start of this date (UTC).
	On(Date),
}
impl LicenseExpiry {
	/// Returns `true` if the license is still within its validity window at `at`.
	pub fn is_current_at(self, at: OffsetDateTime) -> bool {
		match self {
			Self::Lifetime => true,
			Self::On(date) => date.midnight().assume_utc() > at,
		}
	}
}
impl TryFrom<String> for LicenseExpiry {
	type Error = time::error::Parse;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value == "lifetime" {
			return Ok(Self::Lifetime);
		}

		// Upstream stores either a bare date or a datetime; the date part decides validity.
		let date_part = value.get(..10).unwrap_or(&value);

		Date::parse(date_part, format_description!("[year]-[month]-[day]")).map(Self::On)
	}
}
impl From<LicenseExpiry> for String {
	fn from(value: LicenseExpiry) -> Self {
		match value {
			LicenseExpiry::Lifetime => "lifetime".into(),
			LicenseExpiry::On(date) => date.to_string(),
		}
	}
}

/// Stored verdict of the most recent license activation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
	/// Status string reported by the license server, e.g. `"valid"` or `"expired"`.
	pub license: String,
	/// Expiry of the entitlement.
	pub expires: LicenseExpiry,
}
impl LicenseRecord {
	/// Returns `true` if the record grants the entitlement at `at`.
	pub fn is_valid_at(&self, at: OffsetDateTime) -> bool {
		self.license == VALID_STATUS && self.expires.is_current_at(at)
	}
}

/// Registration data for one premium addon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonInfo {
	/// Human-readable addon name.
	pub name: String,
	/// Slug under which the addon's options (including the license record) are stored.
	pub option_slug: String,
	/// Current addon version.
	pub version: String,
}

/// Explicit registry of installed addons, keyed by display slug.
///
/// Callers may look an addon up by its display slug; the registry resolves the option slug the
/// license record is stored under, falling back to the display slug for unregistered addons.
#[derive(Debug, Default)]
pub struct AddonRegistry(RwLock<BTreeMap<AddonSlug, AddonInfo>>);
impl AddonRegistry {
	/// Registers (or replaces) an addon entry.
	pub fn register(&self, slug: AddonSlug, info: AddonInfo) {
		self.0.write().insert(slug, info);
	}

	/// Returns the registration data for an addon, if present.
	pub fn get(&self, slug: &AddonSlug) -> Option<AddonInfo> {
		self.0.read().get(slug).cloned()
	}

	/// Resolves the option slug for an addon, falling back to the display slug.
	pub fn resolve_option_slug(&self, slug: &AddonSlug) -> String {
		self.0.read().get(slug).map_or_else(|| slug.to_string(), |info| info.option_slug.clone())
	}

	/// Snapshot of all registered addons.
	pub fn registered(&self) -> BTreeMap<AddonSlug, AddonInfo> {
		self.0.read().clone()
	}
}

/// Entitlement gate answering whether an addon's stored license is currently valid.
pub struct LicenseGate {
	options: Arc<dyn OptionStore>,
	registry: AddonRegistry,
}
impl LicenseGate {
	/// Creates a gate reading license records from `options`, with an empty addon registry.
	pub fn new(options: Arc<dyn OptionStore>) -> Self {
		Self { options, registry: AddonRegistry::default() }
	}

	/// Returns the gate's addon registry for registration and lookups.
	pub fn registry(&self) -> &AddonRegistry {
		&self.registry
	}

	/// Returns `true` if the addon's stored license record is valid right now.
	pub fn has_valid_license(&self, slug: &AddonSlug) -> bool {
		self.has_valid_license_at(slug, OffsetDateTime::now_utc())
	}

	/// Returns `true` if the addon's stored license record is valid at `at`.
	///
	/// A missing or undecodable record reads as "no license".
	pub fn has_valid_license_at(&self, slug: &AddonSlug, at: OffsetDateTime) -> bool {
		let option_slug = self.registry.resolve_option_slug(slug);
		let record: Option<LicenseRecord> = self.options.get(&license_option_key(&option_slug));

		record.is_some_and(|record| record.is_valid_at(at))
	}
}
impl Debug for LicenseGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LicenseGate").field("registry", &self.registry).finish()
	}
}
