//! Authority-level error types shared across limits, stores, and the admin surface.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
///
/// The taxonomy is deliberately small: quota exhaustion is a boolean answer, a missing revoke
/// target is a [`RevokeOutcome`](crate::store::RevokeOutcome) value, and malformed plan overrides
/// degrade to the free-tier defaults. Only genuine failures surface here.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure; propagated to the caller unmodified, never swallowed.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Identifier validation failure while assembling a record.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Access token record builder validation failed.
	#[error("Unable to build access token record.")]
	TokenBuild(#[from] crate::auth::AccessTokenBuilderError),
}
