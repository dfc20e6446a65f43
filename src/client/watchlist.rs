use std::future::Future;

use tracing::{debug, warn};

use super::{ClientError, MovieApi};
use crate::models::{Movie, MovieFilter};

/// The locally cached movie list. All writes go through these methods so a
/// snapshot taken before a change can always put the list back exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieCache {
    records: Vec<Movie>,
}

/// A copy of the cache taken before an optimistic change.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot(Vec<Movie>);

impl MovieCache {
    pub fn records(&self) -> &[Movie] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&Movie> {
        self.records.iter().find(|m| m.id == id)
    }

    pub fn replace_all(&mut self, records: Vec<Movie>) {
        self.records = records;
    }

    pub fn prepend(&mut self, movie: Movie) {
        self.records.insert(0, movie);
    }

    /// Returns false when no record has the given id.
    pub fn update_by_id(&mut self, id: &str, update: impl FnOnce(&mut Movie)) -> bool {
        match self.records.iter_mut().find(|m| m.id == id) {
            Some(movie) => {
                update(movie);
                true
            },
            None => false,
        }
    }

    pub fn replace_by_id(&mut self, movie: Movie) -> bool {
        let id = movie.id.clone();
        self.update_by_id(&id, |existing| *existing = movie)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Movie> {
        let pos = self.records.iter().position(|m| m.id == id)?;
        Some(self.records.remove(pos))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.records.clone())
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.records = snapshot.0;
    }
}

/// Applies `mutate` to the cache right away, then awaits `remote`. If the
/// remote call fails the cache is restored to its state before `mutate`.
pub async fn optimistic<T, Fut>(
    cache: &mut MovieCache,
    mutate: impl FnOnce(&mut MovieCache),
    remote: Fut,
) -> Result<T, ClientError>
where
    Fut: Future<Output = Result<T, ClientError>>,
{
    let snapshot = cache.snapshot();
    mutate(cache);
    match remote.await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(error = %err, "remote update failed, rolling back");
            cache.restore(snapshot);
            Err(err)
        },
    }
}

/// A movie list bound to one filter, with loading and error state.
///
/// Write operations take `&mut self`, so no two of them can be in flight on
/// the same list at once.
pub struct Watchlist<A> {
    pub(super) api: A,
    pub(super) cache: MovieCache,
    is_loading: bool,
    error: Option<String>,
    loaded_filter: Option<MovieFilter>,
}

impl<A: MovieApi> Watchlist<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: MovieCache::default(),
            is_loading: true,
            error: None,
            loaded_filter: None,
        }
    }

    pub fn records(&self) -> &[Movie] {
        self.cache.records()
    }

    pub fn find(&self, id: &str) -> Option<&Movie> {
        self.cache.find(id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&mut self, filter: MovieFilter) {
        self.is_loading = true;
        self.error = None;

        match self.api.list(&filter).await {
            Ok(movies) => {
                debug!(count = movies.len(), filter = ?filter, "watchlist loaded");
                self.cache.replace_all(movies);
            },
            Err(err) => {
                warn!(error = %err, "failed to load watchlist");
                self.error = Some(err.to_string());
                self.cache.replace_all(Vec::new());
            },
        }

        self.loaded_filter = Some(filter);
        self.is_loading = false;
    }

    /// Loads only when `filter` differs by value from the last loaded one.
    /// Returns whether a load happened.
    pub async fn sync(&mut self, filter: &MovieFilter) -> bool {
        if self.loaded_filter.as_ref() == Some(filter) {
            return false;
        }
        self.load(filter.clone()).await;
        true
    }

    pub async fn refetch(&mut self) {
        let filter = self.loaded_filter.clone().unwrap_or_default();
        self.load(filter).await;
    }
}
