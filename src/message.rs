//! Shared HTTP message surface.
//!
//! Provides [`Headers`], an ordered name→value collection with
//! case-insensitive lookup, and the [`Message`] trait implemented by both
//! [`Request`](crate::Request) and [`Response`](crate::Response).

use std::fmt;

/// Ordered collection of HTTP header name→value pairs.
///
/// Names keep their original spelling and insertion order for
/// serialization, while lookup normalizes case. Entries whose names differ
/// only by case are never distinct for lookup: [`Headers::get`] joins all
/// matching values with a comma.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `name`, matching case-insensitively.
    ///
    /// When several entries match, their values are joined with `,` in
    /// insertion order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let mut matches = self
            .entries
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .peekable();
        matches.peek()?;
        Some(matches.collect::<Vec<_>>().join(","))
    }

    /// Returns true when an entry matches `name` case-insensitively.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Inserts a header, replacing any entry whose name matches
    /// case-insensitively. The new spelling of the name is kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
    }

    /// Appends a header without replacing existing entries. Lookup joins
    /// all values for the name, so appended duplicates behave as one
    /// multi-valued header.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// Capability set shared by requests and responses: header access and a
/// body. Values are immutable; header updates go through the per-type
/// copy-on-write `with_header` constructors.
pub trait Message {
    /// All headers of the message.
    fn headers(&self) -> &Headers;

    /// Message body; the empty string is the canonical "no body".
    fn body(&self) -> &str;

    /// Case-insensitive header lookup, comma-joining multiple values.
    fn header(&self, name: &str) -> Option<String> {
        self.headers().get(name)
    }

    /// Returns true when the named header is present.
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }
}
