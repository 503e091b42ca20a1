use std::fmt::{Display, Formatter};
use std::ops::Deref;
use xxhash_rust::xxh3::Xxh3;

/// Disambiguates e.g. `{foo, bar}` from `{foob, ar}` when concatenating label
/// name/value pairs before hashing.
const SEP: u8 = 0xFF;

/// A single `(name, value)` label pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new<S: Into<String>>(name: S, value: S) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// An ordered sequence of [`Label`]. Equality and hashing are element-wise and
/// order-sensitive: the registry compares labels positionally, so callers must
/// construct and look up a series with labels in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(Vec<Label>);

impl Labels {
    pub fn new(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// True iff every label in `selector` is present in `self` with an equal value.
    /// An empty selector matches unconditionally (see SPEC_FULL.md §9).
    pub fn matches(&self, selector: &Labels) -> bool {
        selector
            .iter()
            .all(|want| self.value_of(&want.name) == Some(want.value.as_str()))
    }
}

impl Deref for Labels {
    type Target = [Label];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Labels {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}

/// Streaming 64-bit hash (xxh3) over `name⋅SEP⋅value⋅SEP` for each label in order.
pub fn hash_labels(labels: &[Label]) -> u64 {
    let mut h = Xxh3::new();
    for label in labels {
        h.update(label.name.as_bytes());
        h.update(&[SEP]);
        h.update(label.value.as_bytes());
        h.update(&[SEP]);
    }
    h.digest()
}

/// Hash of a metric name alone, used as the key into the registry's series sets.
pub fn hash_name(name: &str) -> u64 {
    let mut h = Xxh3::new();
    h.update(name.as_bytes());
    h.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_equal_for_equal_labels() {
        let a = vec![Label::new("foo", "x"), Label::new("bar", "y")];
        let b = vec![Label::new("foo", "x"), Label::new("bar", "y")];
        assert_eq!(hash_labels(&a), hash_labels(&b));
    }

    #[test]
    fn hash_disambiguates_boundary_shift() {
        let a = vec![Label::new("foo", "bar")];
        let b = vec![Label::new("foob", "ar")];
        assert_ne!(hash_labels(&a), hash_labels(&b));
    }

    #[test]
    fn selector_matching() {
        let series: Labels = vec![
            Label::new("method", "GET"),
            Label::new("section", "/x"),
            Label::new("status", "200"),
        ]
        .into_iter()
        .collect();

        let empty: Labels = Labels::default();
        assert!(series.matches(&empty));

        let sel: Labels = vec![Label::new("method", "GET")].into_iter().collect();
        assert!(series.matches(&sel));

        let sel: Labels = vec![Label::new("method", "POST")].into_iter().collect();
        assert!(!series.matches(&sel));
    }
}
