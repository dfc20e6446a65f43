use tracing::{debug, info};

use super::{ClientError, MovieApi, Watchlist, optimistic};
use crate::models::{Movie, MovieInput, MoviePatch};

/// Asks the user to approve an irreversible action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ToggleOptions {
    /// Drop the movie from the list instead of flipping it in place, for
    /// views that only show one watched state.
    pub remove_on_toggle: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

impl<A: MovieApi> Watchlist<A> {
    /// Validates locally, creates the movie and puts it at the top of the list.
    /// Invalid input never reaches the server.
    pub async fn add(&mut self, input: MovieInput) -> Result<Movie, ClientError> {
        input.validate()?;
        let movie = self.api.create(&input).await?;
        info!(id = %movie.id, title = %movie.title, "movie added");
        self.cache.prepend(movie.clone());
        Ok(movie)
    }

    pub async fn edit(&mut self, id: &str, input: MovieInput) -> Result<Movie, ClientError> {
        input.validate()?;
        let movie = self.api.replace(id, &input).await?;
        info!(id = %movie.id, title = %movie.title, "movie updated");
        self.cache.replace_by_id(movie.clone());
        Ok(movie)
    }

    /// Flips `watched` in the cache before the request completes and rolls the
    /// cache back if the request fails. Returns the new status.
    pub async fn toggle_watched(
        &mut self,
        id: &str,
        current: bool,
        options: ToggleOptions,
    ) -> Result<bool, ClientError> {
        let watched = !current;
        let patch = MoviePatch::watched(watched);

        optimistic(
            &mut self.cache,
            |cache| {
                if options.remove_on_toggle {
                    cache.remove_by_id(id);
                } else {
                    cache.update_by_id(id, |m| m.watched = watched);
                }
            },
            self.api.update(id, &patch),
        )
        .await?;

        debug!(id = %id, watched, "watched status changed");
        Ok(watched)
    }

    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &impl Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm("Delete this movie? This cannot be undone.") {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.api.delete(id).await?;
        info!(id = %id, "movie deleted");
        self.cache.remove_by_id(id);
        Ok(DeleteOutcome::Deleted)
    }
}
