use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::selector::Selector;
use super::sets::{Blacklist, UsedIdSet};
use crate::config::PickerConfig;
use crate::tmdb::{MovieCatalog, MovieDetails, TmdbError};

#[derive(Debug, thiserror::Error)]
pub enum PickError {
    #[error("no unique movie found")]
    Exhausted,
    #[error("all detail fetches failed")]
    NoneFetched,
    #[error(transparent)]
    Upstream(#[from] TmdbError),
}

/// Owns the selection state shared by all requests: one used-id set per
/// endpoint and the process-wide blacklist.
pub struct MoviePicker {
    catalog: Arc<dyn MovieCatalog>,
    config: PickerConfig,
    max_page: u32,
    single_used: Mutex<UsedIdSet>,
    batch_used: Mutex<UsedIdSet>,
    blacklist: Blacklist,
}

impl MoviePicker {
    pub fn new(catalog: Arc<dyn MovieCatalog>, config: PickerConfig, max_page: u32) -> Self {
        Self {
            single_used: Mutex::new(UsedIdSet::new(config.single_capacity)),
            batch_used: Mutex::new(UsedIdSet::new(config.batch_capacity)),
            blacklist: Blacklist::new(),
            catalog,
            config,
            max_page,
        }
    }

    fn selector(&self) -> Selector<'_> {
        Selector::new(
            self.catalog.as_ref(),
            &self.blacklist,
            self.config.max_attempts,
            self.max_page,
        )
    }

    #[cfg(test)]
    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    #[cfg(test)]
    pub async fn single_used_len(&self) -> usize {
        self.single_used.lock().await.len()
    }

    #[cfg(test)]
    pub async fn batch_used_len(&self) -> usize {
        self.batch_used.lock().await.len()
    }

    /// Select one unseen movie and fetch its detail record.
    pub async fn pick_one(&self) -> Result<MovieDetails, PickError> {
        let id = match self.claim_unique(&self.single_used, &[]).await? {
            Some(id) => id,
            None => {
                self.single_used.lock().await.clear();
                return Err(PickError::Exhausted);
            }
        };

        self.fetch_details(id).await
    }

    /// Select up to `batch_size` unseen movies and fetch their detail records
    /// concurrently. Failed fetches are dropped.
    pub async fn pick_batch(&self) -> Result<Vec<MovieDetails>, PickError> {
        let mut ids: Vec<u64> = Vec::with_capacity(self.config.batch_size);
        while ids.len() < self.config.batch_size {
            match self.claim_unique(&self.batch_used, &ids).await? {
                Some(id) => ids.push(id),
                None if ids.is_empty() => {
                    self.batch_used.lock().await.clear();
                    return Err(PickError::Exhausted);
                }
                None => {
                    info!(count = ids.len(), "Returning partial batch");
                    break;
                }
            }
        }

        let results = join_all(ids.iter().map(|&id| async move {
            (id, self.catalog.movie_details(id).await)
        }))
        .await;

        let (movies, failures) = partition_details(results);
        for (id, err) in &failures {
            warn!(movie_id = id, error = %err, "Dropping movie from batch");
            if err.is_not_found() {
                self.blacklist.insert(*id).await;
            }
        }

        if movies.is_empty() {
            return Err(PickError::NoneFetched);
        }
        Ok(movies)
    }

    /// Select an id missing from `used` and `reserved` and record it in `used`.
    /// The lock is taken to snapshot and to record, never across upstream calls.
    async fn claim_unique(
        &self,
        used: &Mutex<UsedIdSet>,
        reserved: &[u64],
    ) -> Result<Option<u64>, TmdbError> {
        let selector = self.selector();
        for _ in 0..self.config.max_attempts.max(1) {
            let snapshot = used.lock().await.clone().with_reserved(reserved);
            let Some(candidate) = selector.find_unique(&snapshot).await? else {
                return Ok(None);
            };

            let mut used = used.lock().await;
            if used.contains(candidate.id) {
                debug!(movie_id = candidate.id, "Movie taken by a concurrent request, selecting again");
                continue;
            }
            if used.insert(candidate.id) {
                info!(capacity = used.capacity(), "Used-id set reached capacity, reset");
                // keep the ids already chosen for this batch out of later picks
                for &id in reserved {
                    used.insert(id);
                }
            }
            return Ok(Some(candidate.id));
        }
        Ok(None)
    }

    async fn fetch_details(&self, id: u64) -> Result<MovieDetails, PickError> {
        match self.catalog.movie_details(id).await {
            Ok(details) => Ok(details),
            Err(TmdbError::NotFound) => {
                self.blacklist.insert(id).await;
                Err(PickError::Upstream(TmdbError::NotFound))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Split settled detail fetches into successes and failures, keeping input order.
pub fn partition_details(
    results: Vec<(u64, Result<MovieDetails, TmdbError>)>,
) -> (Vec<MovieDetails>, Vec<(u64, TmdbError)>) {
    let mut movies = Vec::new();
    let mut failures = Vec::new();
    for (id, result) in results {
        match result {
            Ok(details) => movies.push(details),
            Err(e) => failures.push((id, e)),
        }
    }
    (movies, failures)
}
