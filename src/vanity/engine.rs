//! Vanity path resolution.
//!
//! # Responsibilities
//! - Hold the live rule set and swap it atomically on reconfiguration
//! - Walk rules in declaration order, resolving the vanity key of each matching prefix
//! - Honor a redirect only when its target stays inside the rule's allow-list
//!
//! # Design Decisions
//! - The live rule set is an immutable snapshot behind `ArcSwapOption`
//! - Each resolution loads the snapshot once and keeps it for the whole pass
//! - First rule yielding a forward wins; a rejected redirect falls through to later rules
//! - The resolver is called before the allow-list check, once per matching prefix
//! - Resolver faults propagate unchanged; "not found" is just another non-redirect

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::content::{ContentError, ContentResolver, Resource};
use crate::vanity::rules::RuleSet;

/// A forward produced by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    /// Prefix of the rule that produced the forward.
    pub prefix: String,
    /// Destination path.
    pub target: String,
    /// The redirect descriptor the target was read from.
    pub resource: Resource,
}

/// Outcome of resolving one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Forward(Forward),
    PassThrough,
}

impl Decision {
    /// The forward target, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Decision::Forward(f) => Some(&f.target),
            Decision::PassThrough => None,
        }
    }
}

/// Resolve `path` against `rules`.
pub async fn evaluate<R>(rules: &RuleSet, path: &str, resolver: &R) -> Result<Decision, ContentError>
where
    R: ContentResolver + ?Sized,
{
    for rule in rules {
        let Some(key) = rule.vanity_key(path) else {
            continue;
        };

        let resource = resolver.resolve(&key).await?;
        if !resource.is_redirect() {
            tracing::trace!(prefix = %rule.prefix(), key = %key, "No vanity entry");
            continue;
        }

        match resource.target() {
            Some(target) if rule.allows(target) => {
                tracing::debug!(prefix = %rule.prefix(), key = %key, target = %target, "Found vanity path");
                let target = target.to_string();
                return Ok(Decision::Forward(Forward {
                    prefix: rule.prefix().to_string(),
                    target,
                    resource,
                }));
            }
            Some(target) => {
                tracing::debug!(
                    prefix = %rule.prefix(),
                    key = %key,
                    target = %target,
                    allowed = ?rule.allowed_targets(),
                    "Vanity target outside allowed paths"
                );
            }
            None => {
                tracing::debug!(prefix = %rule.prefix(), key = %key, "Vanity redirect without target");
            }
        }
    }

    Ok(Decision::PassThrough)
}

/// Owner of the live rule set.
#[derive(Debug, Default)]
pub struct VanityResolver {
    rules: ArcSwapOption<RuleSet>,
}

impl VanityResolver {
    /// A resolver that has never been configured.
    pub fn new() -> Self {
        Self {
            rules: ArcSwapOption::from(None),
        }
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        let resolver = Self::new();
        resolver.store(rules);
        resolver
    }

    /// Apply raw root path declarations.
    ///
    /// `None` means the declarations are absent; the resolver then routes nothing.
    /// Returns the number of live rules.
    pub fn configure<I, S>(&self, declarations: Option<I>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = RuleSet::parse(declarations.into_iter().flatten());
        let count = rules.len();
        self.store(rules);
        tracing::info!(root_paths = count, "Vanity root paths applied");
        count
    }

    /// Swap in a new rule set.
    pub fn store(&self, rules: RuleSet) {
        self.rules.store(Some(Arc::new(rules)));
    }

    /// Drop the live rule set.
    pub fn clear(&self) {
        self.rules.store(None);
    }

    /// The rule set live at this instant.
    pub fn snapshot(&self) -> Option<Arc<RuleSet>> {
        self.rules.load_full()
    }

    /// Resolve `path` against a single snapshot of the live rules.
    pub async fn resolve<R>(&self, path: &str, resolver: &R) -> Result<Decision, ContentError>
    where
        R: ContentResolver + ?Sized,
    {
        match self.snapshot() {
            Some(rules) if !rules.is_empty() => evaluate(&rules, path, resolver).await,
            _ => Ok(Decision::PassThrough),
        }
    }
}
