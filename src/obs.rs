//! Optional observability helpers for session authority actions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_warden.action` with the `action`
//!   (admin operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `session_warden_action_total` counter for every
//!   attempt/success/failure, labeled by `action` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Session authority actions observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
	/// Connection quota evaluation during OAuth grant issuance.
	QuotaCheck,
	/// Active session listing for the admin surface.
	ListSessions,
	/// Single-session revoke.
	RevokeSession,
	/// Whole-user revoke.
	RevokeAll,
}
impl ActionKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ActionKind::QuotaCheck => "quota_check",
			ActionKind::ListSessions => "list_sessions",
			ActionKind::RevokeSession => "revoke_session",
			ActionKind::RevokeAll => "revoke_all",
		}
	}
}
impl Display for ActionKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionOutcome {
	/// Entry to an authority operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ActionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ActionOutcome::Attempt => "attempt",
			ActionOutcome::Success => "success",
			ActionOutcome::Failure => "failure",
		}
	}
}
impl Display for ActionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
