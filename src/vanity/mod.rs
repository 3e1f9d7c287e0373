//! Vanity path subsystem.
//!
//! # Data Flow
//! ```text
//! Root path declarations ("prefix" | "prefix=target1,target2")
//!     → rules.rs (parse into an ordered RuleSet)
//!     → engine.rs (atomic swap into the live slot)
//!
//! Incoming resource path
//!     → engine.rs (load snapshot, walk rules in declaration order)
//!     → ContentResolver (resolve vanity key)
//!     → Return: Forward(target) or PassThrough
//! ```
//!
//! # Design Decisions
//! - Literal prefix matching only, no wildcards or regex
//! - Rule sets are rebuilt on every apply, never mutated in place
//! - First forward wins; rejected redirects fall through

pub mod engine;
pub mod rules;

pub use engine::{evaluate, Decision, Forward, VanityResolver};
pub use rules::{RootPathRule, RuleSet};
