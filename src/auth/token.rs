//! Access and refresh token records with lifecycle helpers.

pub mod record;
pub mod refresh;
