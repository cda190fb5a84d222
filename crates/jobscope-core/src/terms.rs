//! The administrative search-term list handed to the scraper.

use serde::{Deserialize, Serialize};

/// Ordered set of distinct, non-blank search terms.
///
/// Serializes as a plain JSON array of strings.
///
/// # Examples
///
/// ```
/// use jobscope_core::SearchTermList;
///
/// let mut terms = SearchTermList::new();
/// assert!(terms.add("  Data Engineer "));
/// assert!(!terms.add("Data Engineer"));
/// assert!(!terms.add("   "));
/// assert_eq!(serde_json::to_string(&terms).unwrap(), r#"["Data Engineer"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchTermList {
    terms: Vec<String>,
}

impl SearchTermList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from arbitrary strings, dropping blanks and repeats.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for term in terms {
            list.add(term.as_ref());
        }
        list
    }

    /// Appends a trimmed term. Returns `false` if it was blank or present.
    pub fn add(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() || self.contains(term) {
            return false;
        }
        self.terms.push(term.to_string());
        true
    }

    /// Removes a term by value. Returns `false` if it was absent.
    pub fn remove(&mut self, term: &str) -> bool {
        let term = term.trim();
        match self.terms.iter().position(|t| t == term) {
            Some(index) => {
                self.terms.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the term at `index`, if any.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.terms.len()).then(|| self.terms.remove(index))
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Restores the invariants after deserializing untrusted input.
    pub fn normalized(self) -> Self {
        Self::from_terms(self.terms)
    }
}
