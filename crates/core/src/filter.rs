//! Search filter value.

use crate::error::{CoreError, CoreResult};
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of identifiers requested per backend page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A complete search request, replaced wholesale whenever the user changes
/// any part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Breed restriction, `None` searches all breeds.
    #[serde(default)]
    pub breed: Option<String>,

    /// Postal code restriction.
    #[serde(default)]
    pub zip_codes: Vec<String>,

    /// Minimum age, inclusive.
    #[serde(default)]
    pub age_min: Option<u32>,

    /// Maximum age, inclusive.
    #[serde(default)]
    pub age_max: Option<u32>,

    /// Identifiers per backend page.
    pub page_size: u32,

    /// Result ordering.
    pub sort: SortSpec,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            breed: None,
            zip_codes: Vec::new(),
            age_min: None,
            age_max: None,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortSpec::default(),
        }
    }
}

impl SearchFilter {
    pub fn new(page_size: u32, sort: SortSpec) -> Self {
        Self {
            page_size,
            sort,
            ..Default::default()
        }
    }

    /// Default filter restricted to one breed.
    pub fn for_breed(breed: impl Into<String>) -> Self {
        Self::default().with_breed(breed)
    }

    /// Builder: restrict to a breed.
    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// Builder: remove the breed restriction.
    pub fn any_breed(mut self) -> Self {
        self.breed = None;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_zip_codes(mut self, zip_codes: Vec<String>) -> Self {
        self.zip_codes = zip_codes;
        self
    }

    pub fn with_age_range(mut self, age_min: Option<u32>, age_max: Option<u32>) -> Self {
        self.age_min = age_min;
        self.age_max = age_max;
        self
    }

    /// Validate the filter before it is sent.
    pub fn validate(&self) -> CoreResult<()> {
        if self.page_size == 0 {
            return Err(CoreError::InvalidFilter("page_size must be > 0".to_string()));
        }

        if matches!(&self.breed, Some(b) if b.trim().is_empty()) {
            return Err(CoreError::InvalidFilter("breed must not be blank".to_string()));
        }

        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            if min > max {
                return Err(CoreError::InvalidFilter(format!(
                    "age_min ({}) exceeds age_max ({})",
                    min, max
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "breed={} size={} sort={}",
            self.breed.as_deref().unwrap_or("*"),
            self.page_size,
            self.sort
        )
    }
}
