//! Shared identifier and record types for the muster tracker.

pub mod addr;
pub mod community;
pub mod ident;
pub mod peer;
