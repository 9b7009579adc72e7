//! # StackRS Service Registry
//!
//! File: cli/src/core/services.rs
//!
//! ## Overview
//!
//! `ServiceSet` tracks which services are enabled for this host. Its legacy
//! encoding is a comma-delimited string (`ENABLED_SERVICES`), but internally it
//! is an ordered list of unique tokens with exact-match membership.
//!
//! ## Semantics
//!
//! - **Groups**: `nova`, `cinder`, `ceilometer`, `glance` and `quantum` are
//!   virtual members. Asking for one of them is satisfied by the literal token
//!   or by any token carrying the group's prefix (`n-`, `c-`, `ceilometer-`,
//!   `g-`, `q-`). Any other name is a literal check.
//! - **Negations**: a `-X` token is a directive. After every enable, both `-X`
//!   and `X` are removed.
//! - **Disable** only removes literal tokens. Disabling `nova` leaves an
//!   individually enabled `n-api` in place.
//!
//! ## Usage
//!
//! ```rust
//! let mut services: ServiceSet = "g-api,g-reg,key".parse()?;
//! services.enable(["n-api", "n-cpu"]);
//! assert!(services.contains("nova"));
//! services.disable(["key"]);
//! println!("{}", services); // g-api,g-reg,n-api,n-cpu
//! ```
//!
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Group names and the token prefix that implies membership in each.
pub const SERVICE_GROUPS: [(&str, &str); 5] = [
    ("nova", "n-"),
    ("cinder", "c-"),
    ("ceilometer", "ceilometer-"),
    ("glance", "g-"),
    ("quantum", "q-"),
];

/// Returns the membership prefix for a canonical group name.
pub fn group_prefix(name: &str) -> Option<&'static str> {
    SERVICE_GROUPS
        .iter()
        .find(|(group, _)| *group == name)
        .map(|(_, prefix)| *prefix)
}

/// The set of enabled service identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSet {
    tokens: Vec<String>,
}

impl ServiceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a comma-delimited string, dropping empty and duplicate fields
    /// while keeping encounter order.
    pub fn normalize(raw: &str) -> Self {
        let mut set = Self::new();
        for token in raw.split(',').map(str::trim) {
            set.push_unique(token);
        }
        set
    }

    /// Comma-joined encoding with no stray delimiters.
    pub fn denormalize(&self) -> String {
        self.tokens.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Literal token membership, no group expansion.
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// True if `name` is a literal member, or a group name with at least one
    /// member carrying the group's prefix.
    pub fn contains(&self, name: &str) -> bool {
        if self.has_token(name) {
            return true;
        }
        match group_prefix(name) {
            Some(prefix) => self.tokens.iter().any(|t| t.starts_with(prefix)),
            None => false,
        }
    }

    /// Logical OR of `contains` over `names`; stops at the first match.
    pub fn contains_any<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().any(|name| self.contains(name.as_ref()))
    }

    /// Appends every name not already satisfied, then consumes negations.
    /// A name may itself be a comma-delimited list.
    pub fn enable<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in split_names(names) {
            if self.contains(&name) {
                continue;
            }
            debug!("Enabling service '{}'", name);
            self.tokens.push(name);
        }
        self.purge_negations();
    }

    /// Removes the literal token of every name that is currently satisfied.
    /// Prefixed members of a group are left alone.
    pub fn disable<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in split_names(names) {
            if !self.contains(&name) {
                continue;
            }
            debug!("Disabling service '{}'", name);
            self.tokens.retain(|t| *t != name);
        }
    }

    pub fn disable_all(&mut self) {
        self.tokens.clear();
    }

    /// Drops every `-X` directive together with its target `X`.
    pub fn purge_negations(&mut self) {
        let targets: Vec<String> = self
            .tokens
            .iter()
            .filter_map(|t| t.strip_prefix('-'))
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            return;
        }
        debug!("Purging negated services: {:?}", targets);
        self.tokens
            .retain(|t| !t.starts_with('-') && !targets.iter().any(|target| target == t));
    }

    fn push_unique(&mut self, token: &str) {
        if !token.is_empty() && !self.has_token(token) {
            self.tokens.push(token.to_string());
        }
    }
}

impl FromStr for ServiceSet {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl fmt::Display for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.denormalize())
    }
}

impl<S: AsRef<str>> FromIterator<S> for ServiceSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for token in split_names(iter) {
            set.push_unique(&token);
        }
        set
    }
}

/// Flattens names that carry the `,` delimiter into single, trimmed,
/// non-empty tokens.
fn split_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .flat_map(|name| {
            name.as_ref()
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(raw: &str) -> ServiceSet {
        ServiceSet::normalize(raw)
    }

    #[test]
    fn test_normalize_drops_empty_and_duplicate_fields() {
        let services = set(",g-api,,key,g-api,");
        assert_eq!(services.denormalize(), "g-api,key");
        assert_eq!(services.len(), 2);
        assert!(set("").is_empty());
        assert!(set(",,,").is_empty());
    }

    #[test]
    fn test_enable_then_contains() {
        let mut services = set("key");
        services.enable(["mysql"]);
        assert!(services.contains("mysql"));
        assert_eq!(services.to_string(), "key,mysql");
    }

    #[test]
    fn test_enable_is_idempotent() {
        let mut once = set("key,g-api");
        once.enable(["rabbit"]);
        let mut twice = once.clone();
        twice.enable(["rabbit"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_enable_skips_names_already_satisfied_by_group() {
        let mut services = set("n-api");
        services.enable(["nova"]);
        assert_eq!(services.to_string(), "n-api");
    }

    #[test]
    fn test_disable_literal_member() {
        let mut services = set("key,mysql,rabbit");
        services.disable(["mysql"]);
        assert!(!services.contains("mysql"));
        assert_eq!(services.to_string(), "key,rabbit");
    }

    #[test]
    fn test_disable_group_leaves_prefixed_members() {
        let mut services = set("nova,n-api,n-cpu");
        services.disable(["nova"]);
        assert!(!services.has_token("nova"));
        assert!(services.contains("nova"));
        assert_eq!(services.to_string(), "n-api,n-cpu");
    }

    #[test]
    fn test_disable_unknown_name_is_noop() {
        let mut services = set("key");
        services.disable(["swift"]);
        assert_eq!(services.to_string(), "key");
    }

    #[test]
    fn test_disable_all() {
        let mut services = set("key,n-api,g-reg");
        services.disable_all();
        assert!(services.is_empty());
        assert_eq!(services.to_string(), "");
    }

    #[test]
    fn test_negation_consumes_target() {
        let mut services = set("key,rabbit,mysql");
        services.enable(["-rabbit"]);
        assert!(!services.has_token("rabbit"));
        assert!(!services.has_token("-rabbit"));
        assert_eq!(services.to_string(), "key,mysql");
    }

    #[test]
    fn test_negation_from_initial_string_applied_on_next_enable() {
        let mut services = set("key,-key,mysql");
        services.enable(std::iter::empty::<&str>());
        assert_eq!(services.to_string(), "mysql");
    }

    #[test]
    fn test_group_membership() {
        let services = set("n-api,n-cpu");
        assert!(services.contains("nova"));
        assert!(!services.contains("glance"));

        let with_glance = set("n-api,n-cpu,g-reg");
        assert!(with_glance.contains("glance"));
    }

    #[test]
    fn test_prefix_expansion_only_for_group_names() {
        let services = set("n-api");
        assert!(services.contains("n-api"));
        assert!(!services.contains("n-"));
        assert!(!services.contains("n-cpu"));
    }

    #[test]
    fn test_no_substring_false_positives() {
        let services = set("novaclient,ceilometer");
        assert!(!services.contains("nova"));
        assert!(!services.contains("client"));
        assert!(services.contains("ceilometer"));

        let collector = set("ceilometer-acompute");
        assert!(collector.contains("ceilometer"));
        // 'c-' is the cinder prefix; ceilometer tokens must not satisfy it.
        assert!(!collector.contains("cinder"));
    }

    #[test]
    fn test_contains_any_is_logical_or() {
        let services = set("key,g-api");
        assert!(services.contains_any(["swift", "glance"]));
        assert!(!services.contains_any(["swift", "quantum"]));
        assert!(!services.contains_any(Vec::<String>::new()));
    }

    #[test]
    fn test_round_trip_encoding() {
        let original = set("g-api,key,n-cpu,q-svc");
        let round_tripped = ServiceSet::normalize(&original.denormalize());
        let a: BTreeSet<&str> = original.iter().collect();
        let b: BTreeSet<&str> = round_tripped.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_enable_splits_comma_lists() {
        let mut services = set("key");
        services.enable(["key,swift"]);
        assert_eq!(services.to_string(), "key,swift");
        assert_eq!(services.len(), 2);
        assert!(services.contains("swift"));
        assert_eq!(ServiceSet::normalize(&services.denormalize()), services);

        services.enable([" mysql ,, -swift"]);
        assert_eq!(services.to_string(), "key,mysql");
    }

    #[test]
    fn test_disable_splits_comma_lists() {
        let mut services = set("key,swift,mysql");
        services.disable(["swift,mysql"]);
        assert_eq!(services.to_string(), "key");
        assert_eq!(ServiceSet::normalize(&services.denormalize()), services);
    }

    #[test]
    fn test_from_iterator_and_from_str() {
        let collected: ServiceSet = ["key", "", "key,mysql"].into_iter().collect();
        assert_eq!(collected.to_string(), "key,mysql");
        let parsed: ServiceSet = "key,mysql".parse().unwrap();
        assert_eq!(parsed, collected);
    }
}
