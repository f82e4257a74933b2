//! Hydrated records accumulated for the active filter.

use kennel_core::{Dog, DogId};
use std::collections::HashSet;

/// Ordered dogs for one continuous fetch sequence.
///
/// Pages are appended, never reordered. An id already present is not
/// appended again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedCollection {
    dogs: Vec<Dog>,
    seen: HashSet<DogId>,
}

impl DisplayedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dogs(dogs: Vec<Dog>) -> Self {
        let mut collection = Self::new();
        collection.append(dogs);
        collection
    }

    /// Append a page. Returns the number of records added.
    pub fn append(&mut self, dogs: Vec<Dog>) -> usize {
        let before = self.dogs.len();
        for dog in dogs {
            if self.seen.insert(dog.id.clone()) {
                self.dogs.push(dog);
            } else {
                tracing::warn!("Skipping duplicate record {}", dog.id);
            }
        }
        self.dogs.len() - before
    }

    pub fn len(&self) -> usize {
        self.dogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dogs.is_empty()
    }

    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    pub fn contains(&self, id: &DogId) -> bool {
        self.seen.contains(id)
    }

    /// Rows for UI page `index` (zero-based) of `page_size` rows.
    pub fn page(&self, index: usize, page_size: usize) -> &[Dog] {
        let start = index.saturating_mul(page_size).min(self.dogs.len());
        let end = start.saturating_add(page_size).min(self.dogs.len());
        &self.dogs[start..end]
    }

    /// UI pages covered by the loaded records.
    pub fn loaded_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.dogs.len().div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dog;

    #[test]
    fn test_append_preserves_order_and_skips_duplicates() {
        let mut collection = DisplayedCollection::from_dogs(vec![dog("a"), dog("b")]);
        let added = collection.append(vec![dog("c"), dog("a"), dog("d")]);

        assert_eq!(added, 2);
        let order: Vec<&str> = collection.dogs().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        assert!(collection.contains(&DogId::new("c")));
    }

    #[test]
    fn test_page_window() {
        let dogs: Vec<Dog> = (0..25).map(|i| dog(&format!("d{}", i))).collect();
        let collection = DisplayedCollection::from_dogs(dogs);

        assert_eq!(collection.page(0, 10).len(), 10);
        assert_eq!(collection.page(2, 10).len(), 5);
        assert_eq!(collection.page(2, 10)[0].id.as_str(), "d20");
        assert!(collection.page(3, 10).is_empty());
        assert!(collection.page(usize::MAX, 10).is_empty());
        assert_eq!(collection.loaded_pages(10), 3);
        assert_eq!(collection.loaded_pages(0), 0);
    }

    #[test]
    fn test_empty() {
        let collection = DisplayedCollection::new();
        assert!(collection.is_empty());
        assert!(collection.page(0, 10).is_empty());
    }
}
