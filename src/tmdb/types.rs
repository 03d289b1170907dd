use serde::{Deserialize, Serialize};

/// One page of `/discover/movie` results.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Summary entry from the catalog listing. Only lives for one selection attempt.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CandidateMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl CandidateMovie {
    pub fn has_poster(&self) -> bool {
        self.poster_path
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Detail record from `/movie/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}
