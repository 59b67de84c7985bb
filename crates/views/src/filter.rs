//! Client-side filtering over an already fetched collection. Every criterion
//! is optional and an unset criterion matches everything.

/// A set of ANDed criteria over `T`.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    /// True when no criterion is set.
    fn is_empty(&self) -> bool;

    fn apply(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        if self.is_empty() {
            return items.to_vec();
        }
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery(String);

impl TextQuery {
    pub fn new(query: impl AsRef<str>) -> Self {
        Self(query.as_ref().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.0.is_empty() || haystack.to_lowercase().contains(&self.0)
    }

    /// Matches when any field contains the query; absent fields never match.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        self.0.is_empty() || fields.into_iter().flatten().any(|field| self.matches(field))
    }
}

/// Inclusive bounds, either of which may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusiveRange<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for InclusiveRange<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd> InclusiveRange<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.min.as_ref().map_or(true, |min| value >= min)
            && self.max.as_ref().map_or(true, |max| value <= max)
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
