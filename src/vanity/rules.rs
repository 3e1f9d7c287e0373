//! Root path declarations.
//!
//! # Responsibilities
//! - Parse `prefix` and `prefix=target1,target2` declarations
//! - Keep rules in declaration order
//! - Compute vanity lookup keys and check allow-lists
//!
//! # Design Decisions
//! - Split on the first `=` only; targets split on `,` and trimmed
//! - Blank targets are dropped; an empty target list means "the prefix itself"
//! - Blank prefixes are accepted literally (they match every path)
//! - A re-declared prefix replaces the earlier target list but keeps its position

/// A single administratively declared root path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPathRule {
    prefix: String,
    allowed_targets: Vec<String>,
}

impl RootPathRule {
    /// Create a rule with an explicit allow-list.
    pub fn new<I, S>(prefix: impl AsRef<str>, allowed_targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = prefix.as_ref().trim().to_string();
        let mut allowed_targets: Vec<String> = allowed_targets
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if allowed_targets.is_empty() {
            allowed_targets.push(prefix.clone());
        }

        Self {
            prefix,
            allowed_targets,
        }
    }

    /// Parse one raw declaration.
    pub fn parse(declaration: &str) -> Self {
        match declaration.split_once('=') {
            Some((prefix, targets)) => Self::new(prefix, targets.split(',')),
            None => Self::new(declaration, std::iter::empty::<&str>()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn allowed_targets(&self) -> &[String] {
        &self.allowed_targets
    }

    /// The key to resolve for `path`, or `None` if the prefix does not match.
    ///
    /// A prefix ending in `/` loses that slash from the remainder, so it is put back
    /// to keep the key absolute.
    pub fn vanity_key(&self, path: &str) -> Option<String> {
        let remainder = path.strip_prefix(self.prefix.as_str())?;
        if self.prefix.ends_with('/') {
            Some(format!("/{remainder}"))
        } else {
            Some(remainder.to_string())
        }
    }

    /// Whether a redirect to `target` stays inside this rule's allow-list.
    pub fn allows(&self, target: &str) -> bool {
        self.allowed_targets.iter().any(|allowed| target.starts_with(allowed.as_str()))
    }
}

/// Ordered set of root path rules, keyed by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<RootPathRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from raw declarations, in order.
    pub fn parse<I, S>(declarations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        declarations
            .into_iter()
            .map(|d| RootPathRule::parse(d.as_ref()))
            .collect()
    }

    /// Add a rule. An existing rule with the same prefix is replaced in place.
    pub fn insert(&mut self, rule: RootPathRule) {
        match self.rules.iter_mut().find(|r| r.prefix == rule.prefix) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&RootPathRule> {
        self.rules.iter().find(|r| r.prefix == prefix)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RootPathRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.prefix.as_str())
    }
}

impl FromIterator<RootPathRule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = RootPathRule>>(iter: T) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RootPathRule;
    type IntoIter = std::slice::Iter<'a, RootPathRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
