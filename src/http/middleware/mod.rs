//! Request pipeline middleware.

pub mod vanity;

pub use vanity::{vanity_filter, FilterError, VanityState};
