//! Random unique-movie selection over the paginated discover listing.
//!
//! Each attempt samples one random page, drops entries without a poster or
//! already used or blacklisted, and validates one random survivor against the
//! detail endpoint. A 404 on validation blacklists the id and costs one attempt.

use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

use super::sets::{Blacklist, UsedIdSet};
use crate::tmdb::{CandidateMovie, MovieCatalog, TmdbError};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Sampling { attempt: u32 },
    Validating { attempt: u32, candidate: CandidateMovie },
    Found(CandidateMovie),
    Exhausted,
}

impl SelectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Found(_) | SelectionState::Exhausted)
    }
}

pub struct Selector<'a> {
    catalog: &'a dyn MovieCatalog,
    blacklist: &'a Blacklist,
    max_attempts: u32,
    max_page: u32,
}

impl<'a> Selector<'a> {
    pub fn new(
        catalog: &'a dyn MovieCatalog,
        blacklist: &'a Blacklist,
        max_attempts: u32,
        max_page: u32,
    ) -> Self {
        Self {
            catalog,
            blacklist,
            max_attempts,
            max_page: max_page.max(1),
        }
    }

    /// Run the state machine to completion. `Ok(None)` means the attempt
    /// budget ran out, which is not an error.
    pub async fn find_unique(
        &self,
        used: &UsedIdSet,
    ) -> Result<Option<CandidateMovie>, TmdbError> {
        let mut state = SelectionState::Sampling { attempt: 0 };
        while !state.is_terminal() {
            state = self.step(state, used).await?;
        }

        match state {
            SelectionState::Found(candidate) => Ok(Some(candidate)),
            _ => {
                info!(attempts = self.max_attempts, "No unique movie found");
                Ok(None)
            }
        }
    }

    pub async fn step(
        &self,
        state: SelectionState,
        used: &UsedIdSet,
    ) -> Result<SelectionState, TmdbError> {
        match state {
            SelectionState::Sampling { attempt } if attempt >= self.max_attempts => {
                Ok(SelectionState::Exhausted)
            }
            SelectionState::Sampling { attempt } => {
                let page = random_page(self.max_page);
                let listing = self.catalog.discover(page).await?;

                let candidates = {
                    let blacklisted = self.blacklist.ids().await;
                    filter_candidates(listing.results, used, &blacklisted)
                };
                debug!(attempt, page, candidates = candidates.len(), "Sampled discover page");

                Ok(match pick_random(candidates) {
                    Some(candidate) => SelectionState::Validating { attempt, candidate },
                    None => SelectionState::Sampling { attempt: attempt + 1 },
                })
            }
            SelectionState::Validating { attempt, candidate } => {
                match self.catalog.movie_details(candidate.id).await {
                    Ok(_) => Ok(SelectionState::Found(candidate)),
                    Err(TmdbError::NotFound) => {
                        info!(movie_id = candidate.id, "Blacklisting movie missing upstream");
                        self.blacklist.insert(candidate.id).await;
                        Ok(SelectionState::Sampling { attempt: attempt + 1 })
                    }
                    Err(e) => Err(e),
                }
            }
            terminal => Ok(terminal),
        }
    }
}

/// Keep entries that have a poster and are neither used nor blacklisted.
pub fn filter_candidates(
    results: Vec<CandidateMovie>,
    used: &UsedIdSet,
    blacklisted: &HashSet<u64>,
) -> Vec<CandidateMovie> {
    results
        .into_iter()
        .filter(|m| m.has_poster() && !used.contains(m.id) && !blacklisted.contains(&m.id))
        .collect()
}

fn random_page(max_page: u32) -> u32 {
    rand::rng().random_range(1..=max_page)
}

fn pick_random<T>(mut items: Vec<T>) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let idx = rand::rng().random_range(0..items.len());
    Some(items.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::fake::{movie, FakeCatalog};

    #[test]
    fn test_filter_candidates() {
        let mut used = UsedIdSet::new(10);
        used.insert(2);
        let blacklisted: HashSet<u64> = [3].into_iter().collect();

        let results = vec![
            movie(1, Some("/a.jpg")),
            movie(2, Some("/b.jpg")),
            movie(3, Some("/c.jpg")),
            movie(4, None),
            movie(5, Some("/e.jpg")),
        ];
        let ids: Vec<u64> = filter_candidates(results, &used, &blacklisted)
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_random_page_in_range() {
        for _ in 0..200 {
            let page = random_page(500);
            assert!((1..=500).contains(&page));
        }
        assert_eq!(random_page(1), 1);
    }

    #[tokio::test]
    async fn test_found_excludes_used_and_blacklisted() {
        let catalog = FakeCatalog::with_movies(vec![
            movie(1, Some("/a.jpg")),
            movie(2, Some("/b.jpg")),
            movie(3, Some("/c.jpg")),
        ]);
        let blacklist = Blacklist::new();
        blacklist.insert(1).await;
        let mut used = UsedIdSet::new(20);
        used.insert(2);

        let selector = Selector::new(&catalog, &blacklist, 10, 500);
        for _ in 0..20 {
            let found = selector.find_unique(&used).await.unwrap().unwrap();
            assert_eq!(found.id, 3);
        }
    }

    #[tokio::test]
    async fn test_exhausted_after_budget() {
        let catalog = FakeCatalog::with_movies(vec![movie(1, None)]);
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);

        let selector = Selector::new(&catalog, &blacklist, 10, 500);
        assert!(selector.find_unique(&used).await.unwrap().is_none());
        assert_eq!(catalog.discover_calls(), 10);
        assert!(catalog.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_blacklists_once() {
        let catalog = FakeCatalog::with_movies(vec![movie(42, Some("/x.jpg"))]).missing(&[42]);
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);
        let selector = Selector::new(&catalog, &blacklist, 10, 500);

        assert!(selector.find_unique(&used).await.unwrap().is_none());
        assert!(blacklist.contains(42).await);
        assert_eq!(catalog.detail_calls(), vec![42]);

        // later selections never validate the dead id again
        assert!(selector.find_unique(&used).await.unwrap().is_none());
        assert_eq!(catalog.detail_calls(), vec![42]);
    }

    #[tokio::test]
    async fn test_not_found_then_other_candidate() {
        let catalog = FakeCatalog::with_movies(vec![
            movie(42, Some("/x.jpg")),
            movie(43, Some("/y.jpg")),
        ])
        .missing(&[42]);
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);
        let selector = Selector::new(&catalog, &blacklist, 10, 500);

        for _ in 0..10 {
            let found = selector.find_unique(&used).await.unwrap().unwrap();
            assert_eq!(found.id, 43);
        }
        let dead_checks = catalog.detail_calls().iter().filter(|&&id| id == 42).count();
        assert!(dead_checks <= 1);
    }

    #[tokio::test]
    async fn test_other_validation_error_is_fatal() {
        let catalog = FakeCatalog::with_movies(vec![movie(9, Some("/x.jpg"))]).broken(&[9]);
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);
        let selector = Selector::new(&catalog, &blacklist, 10, 500);

        let err = selector.find_unique(&used).await.unwrap_err();
        assert!(matches!(err, TmdbError::Status(500)));
        assert!(!blacklist.contains(9).await);
    }

    #[tokio::test]
    async fn test_discover_error_is_fatal() {
        let catalog = FakeCatalog::with_movies(vec![movie(9, Some("/x.jpg"))]).failing_discover();
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);
        let selector = Selector::new(&catalog, &blacklist, 10, 500);

        let err = selector.find_unique(&used).await.unwrap_err();
        assert!(matches!(err, TmdbError::Status(503)));
        assert_eq!(catalog.discover_calls(), 1);
        assert!(catalog.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let catalog = FakeCatalog::with_movies(vec![movie(5, Some("/x.jpg"))]);
        let blacklist = Blacklist::new();
        let used = UsedIdSet::new(20);
        let selector = Selector::new(&catalog, &blacklist, 2, 500);

        let state = selector
            .step(SelectionState::Sampling { attempt: 0 }, &used)
            .await
            .unwrap();
        assert_eq!(
            state,
            SelectionState::Validating {
                attempt: 0,
                candidate: movie(5, Some("/x.jpg"))
            }
        );

        let state = selector.step(state, &used).await.unwrap();
        assert_eq!(state, SelectionState::Found(movie(5, Some("/x.jpg"))));

        let state = selector
            .step(SelectionState::Sampling { attempt: 2 }, &used)
            .await
            .unwrap();
        assert_eq!(state, SelectionState::Exhausted);
    }
}
