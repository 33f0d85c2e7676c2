//! Auth-domain identifiers, token records, and admin session views.

pub mod id;
pub mod session;
pub mod token;

pub use id::*;
pub use session::*;
pub use token::{record::*, refresh::*};
