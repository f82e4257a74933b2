//! Core type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a dog record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(pub String);

impl DogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DogId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A fully hydrated dog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    /// Globally unique identifier.
    pub id: DogId,
    /// Image URL.
    pub img: String,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Postal code.
    pub zip_code: String,
    /// Breed name.
    pub breed: String,
}

/// Opaque continuation token returned by the search endpoint.
///
/// The backend hands this out as a relative URL. It is stored and re-issued
/// verbatim, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCursor(String);

impl SearchCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultPage {
    /// Matching identifiers, in backend order.
    pub ids: Vec<DogId>,
    /// Total number of matches. Only meaningful on the first page of a filter.
    pub total: u64,
    /// Cursor for the following page, `None` on the last page.
    pub next: Option<SearchCursor>,
}

impl ResultPage {
    pub fn new(ids: Vec<DogId>, total: u64, next: Option<SearchCursor>) -> Self {
        Self { ids, total, next }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether no further page follows this one.
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dog_wire_shape() {
        let json = r#"{"id":"d1","img":"https://img/d1.jpg","name":"Rex","age":3,"zip_code":"10001","breed":"Poodle"}"#;
        let dog: Dog = serde_json::from_str(json).unwrap();
        assert_eq!(dog.id, DogId::new("d1"));
        assert_eq!(dog.zip_code, "10001");
        assert_eq!(dog.age, 3);
    }

    #[test]
    fn test_cursor_is_kept_verbatim() {
        let raw = "/dogs/search?size=25&from=25&sort=breed%3Aasc";
        let cursor = SearchCursor::new(raw);
        assert_eq!(cursor.as_str(), raw);
        assert_eq!(serde_json::to_string(&cursor).unwrap(), format!("\"{}\"", raw));
    }

    #[test]
    fn test_terminal_page() {
        let page = ResultPage::new(vec!["a".into()], 1, None);
        assert!(page.is_terminal());
        assert_eq!(page.len(), 1);

        let page = ResultPage::new(vec![], 0, Some(SearchCursor::new("/next")));
        assert!(!page.is_terminal());
        assert!(page.is_empty());
    }
}
