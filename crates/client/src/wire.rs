//! Wire payloads.

use kennel_core::{DogId, ResultPage, SearchCursor, SearchFilter};
use serde::{Deserialize, Serialize};

/// Body of `/dogs/search` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_ids: Vec<DogId>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl From<SearchResponse> for ResultPage {
    fn from(resp: SearchResponse) -> Self {
        ResultPage {
            ids: resp.result_ids,
            total: resp.total,
            next: resp
                .next
                .filter(|next| !next.is_empty())
                .map(SearchCursor::new),
        }
    }
}

/// Body of `/dogs/match` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<DogId>,
}

/// Body of `/auth/login` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
}

/// Query parameters for the first page of a search.
///
/// List values repeat their key (`breeds=a&breeds=b`).
pub fn filter_query(filter: &SearchFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(breed) = &filter.breed {
        params.push(("breeds", breed.clone()));
    }
    for zip in &filter.zip_codes {
        params.push(("zipCodes", zip.clone()));
    }
    if let Some(age_min) = filter.age_min {
        params.push(("ageMin", age_min.to_string()));
    }
    if let Some(age_max) = filter.age_max {
        params.push(("ageMax", age_max.to_string()));
    }
    params.push(("size", filter.page_size.to_string()));
    params.push(("sort", filter.sort.to_string()));

    params
}
