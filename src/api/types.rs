use serde::{Deserialize, Serialize};

use crate::tmdb::{poster_url, MovieDetails};

/// Minimal movie record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedMovie {
    pub title: String,
    pub vote_average: f64,
    pub poster_path: Option<String>,
    pub id: u64,
}

impl SimplifiedMovie {
    pub fn from_details(details: MovieDetails, image_base_url: &str) -> Self {
        Self {
            title: details.title,
            vote_average: round_rating(details.vote_average),
            poster_path: details
                .poster_path
                .filter(|p| !p.trim().is_empty())
                .map(|p| poster_url(image_base_url, &p)),
            id: details.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn round_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}
