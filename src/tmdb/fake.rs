use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::client::{MovieCatalog, TmdbError};
use super::types::{CandidateMovie, DiscoverPage, MovieDetails};

/// In-memory catalog. Every discover page returns the same listing.
#[derive(Default)]
pub struct FakeCatalog {
    pub movies: Vec<CandidateMovie>,
    pub missing: HashSet<u64>,
    pub broken: HashSet<u64>,
    pub fail_discover: bool,
    /// Detail calls allowed to succeed per id before it starts failing with a 500.
    pub flaky: HashMap<u64, usize>,
    pub discover_delay: Option<Duration>,
    discover_calls: AtomicUsize,
    detail_calls: Mutex<Vec<u64>>,
}

pub fn movie(id: u64, poster: Option<&str>) -> CandidateMovie {
    CandidateMovie {
        id,
        title: format!("Movie {}", id),
        poster_path: poster.map(str::to_string),
        vote_average: 7.25,
        vote_count: 1000,
    }
}

impl FakeCatalog {
    pub fn with_movies(movies: Vec<CandidateMovie>) -> Self {
        Self {
            movies,
            ..Default::default()
        }
    }

    pub fn missing(mut self, ids: &[u64]) -> Self {
        self.missing.extend(ids);
        self
    }

    pub fn broken(mut self, ids: &[u64]) -> Self {
        self.broken.extend(ids);
        self
    }

    pub fn flaky(mut self, ids: &[u64], ok_calls: usize) -> Self {
        self.flaky.extend(ids.iter().map(|&id| (id, ok_calls)));
        self
    }

    pub fn failing_discover(mut self) -> Self {
        self.fail_discover = true;
        self
    }

    pub fn slow_discover(mut self, delay: Duration) -> Self {
        self.discover_delay = Some(delay);
        self
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> Vec<u64> {
        self.detail_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.discover_calls() + self.detail_calls().len()
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.discover_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_discover {
            return Err(TmdbError::Status(503));
        }
        Ok(DiscoverPage {
            page,
            results: self.movies.clone(),
            total_pages: 500,
        })
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        let calls_for_id = {
            let mut calls = self.detail_calls.lock().unwrap();
            calls.push(id);
            calls.iter().filter(|&&c| c == id).count()
        };
        if let Some(&ok_calls) = self.flaky.get(&id) {
            if calls_for_id > ok_calls {
                return Err(TmdbError::Status(500));
            }
        }
        if self.missing.contains(&id) {
            return Err(TmdbError::NotFound);
        }
        if self.broken.contains(&id) {
            return Err(TmdbError::Status(500));
        }
        let movie = self
            .movies
            .iter()
            .find(|m| m.id == id)
            .ok_or(TmdbError::NotFound)?;
        Ok(MovieDetails {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            runtime: Some(120),
            release_date: None,
            overview: None,
        })
    }
}
