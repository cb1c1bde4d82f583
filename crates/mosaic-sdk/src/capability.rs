//! Capability tags and capability sets.
//!
//! Extension points and extension classes meet through capability tags
//! rather than through a shared inheritance chain:
//! - an extension point declares a *contract*: the set of capabilities an
//!   implementation must provide;
//! - an extension class declares the set of capabilities it *provides*.
//!
//! A class matches a point when the point's contract is a subset of the
//! class's capabilities. Two point contracts where one is a subset of the
//! other describe overlapping families of implementations and cannot both
//! be registered.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// A single capability tag, e.g. `"command"` or `"animal.speak"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    /// Create a capability from a static tag without allocating.
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Capability {
    fn from(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }
}

impl From<String> for Capability {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

/// An ordered set of capability tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning `false` if it was already present.
    pub fn insert(&mut self, capability: impl Into<Capability>) -> bool {
        self.0.insert(capability.into())
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when every tag in `self` is also in `other`.
    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// `true` when every tag in `other` is also in `self`.
    pub fn is_superset(&self, other: &CapabilitySet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }
}

impl<C: Into<Capability>> FromIterator<C> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, capability) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", capability)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_superset() {
        let animal: CapabilitySet = ["animal"].into_iter().collect();
        let mammal: CapabilitySet = ["animal", "mammal"].into_iter().collect();

        assert!(animal.is_subset(&mammal));
        assert!(mammal.is_superset(&animal));
        assert!(!mammal.is_subset(&animal));

        let plant: CapabilitySet = ["plant"].into_iter().collect();
        assert!(!plant.is_subset(&mammal));
        assert!(!plant.is_superset(&mammal));
    }

    #[test]
    fn test_equal_sets_are_mutual_subsets() {
        let a: CapabilitySet = ["x", "y"].into_iter().collect();
        let b: CapabilitySet = ["y", "x"].into_iter().collect();
        assert_eq!(a, b);
        assert!(a.is_subset(&b));
        assert!(a.is_superset(&b));
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = CapabilitySet::new();
        assert!(set.is_empty());
        assert!(set.insert("command"));
        assert!(!set.insert("command"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Capability::from_static("command")));
    }

    #[test]
    fn test_display() {
        let set: CapabilitySet = ["b", "a"].into_iter().collect();
        assert_eq!(set.to_string(), "{a, b}");
    }

    #[test]
    fn test_serde_round_trip() {
        let set: CapabilitySet = ["animal", "mammal"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[\"animal\",\"mammal\"]");
        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
