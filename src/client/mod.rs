//! Client side of the watchlist: an API client, a cached movie list with
//! loading/error state, the write operations that reconcile that cache, and
//! local sorting for display.

mod actions;
mod api;
mod error;
mod sort;
mod watchlist;

pub use actions::{Confirm, DeleteOutcome, ToggleOptions};
pub use api::{HttpMovieApi, MovieApi};
pub use error::ClientError;
pub use sort::{LocalSort, sorted};
pub use watchlist::{Watchlist, optimistic};
