mod client;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod output;
mod routes;
mod store;
mod validation;

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::{
    client::{
        ClientError, Confirm, DeleteOutcome, HttpMovieApi, LocalSort, MovieApi, ToggleOptions,
        Watchlist,
    },
    config::{ClientConfig, Config},
    models::{MovieFilter, MovieInput},
    store::MovieStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: MovieStore,
}

#[derive(Parser)]
#[command(name = "watchlist")]
#[command(about = "A personal movie watchlist: API server and command-line client")]
#[command(version)]
struct Cli {
    /// More log output (-v for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve,
    /// Show movies in one of the list views
    List {
        #[arg(long, value_enum, default_value = "all")]
        view: View,

        /// Display order; each view has its own default
        #[arg(long, value_enum)]
        sort: Option<LocalSort>,
    },
    /// Add a movie
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        genre: String,
        /// Rating from 0 to 10, at most two decimals
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,
    },
    /// Edit a movie; fields not given keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long, conflicts_with = "clear_rating")]
        rating: Option<f64>,
        /// Remove the rating
        #[arg(long, action = ArgAction::SetTrue)]
        clear_rating: bool,
        #[arg(long)]
        watched: Option<bool>,
    },
    /// Mark a movie as watched or pending
    Toggle {
        id: String,
        /// View the toggle happens in; single-state views drop the movie
        #[arg(long, value_enum, default_value = "all")]
        view: View,
    },
    /// Delete a movie
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum View {
    All,
    Watched,
    Pending,
    ByRating,
}

impl View {
    fn filter(self) -> MovieFilter {
        match self {
            View::All | View::ByRating => MovieFilter::all(),
            View::Watched => MovieFilter::watched(true),
            View::Pending => MovieFilter::watched(false),
        }
    }

    fn default_sort(self) -> LocalSort {
        match self {
            View::ByRating => LocalSort::RatingDesc,
            _ => LocalSort::Default,
        }
    }

    fn toggle_options(self) -> ToggleOptions {
        ToggleOptions { remove_on_toggle: matches!(self, View::Watched | View::Pending) }
    }

    fn empty_message(self) -> &'static str {
        match self {
            View::Watched => "No movies marked as watched yet.",
            View::Pending => "Nothing pending.",
            View::All | View::ByRating => "No movies added yet.",
        }
    }
}

struct PromptConfirm {
    assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        io::stdout().flush().ok();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose > 0 {
        "debug,sqlx=warn"
    } else if matches!(cli.command, Commands::Serve) {
        "info,watchlist=debug,sqlx=warn"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()))
        .with_writer(io::stderr)
        .init();

    run(cli.command).await
}

async fn serve() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url)
        .await
        .context("connecting to the database")?;
    let state = Arc::new(AppState { config: config.clone(), store: MovieStore::new(db) });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, cors = ?config.cors, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn watchlist() -> anyhow::Result<Watchlist<HttpMovieApi>> {
    let config = ClientConfig::from_env();
    let api = HttpMovieApi::new(config.backend_url).context("building the HTTP client")?;
    Ok(Watchlist::new(api))
}

async fn load_view(watchlist: &mut Watchlist<HttpMovieApi>, view: View) -> anyhow::Result<()> {
    watchlist.sync(&view.filter()).await;
    if let Some(err) = watchlist.error() {
        anyhow::bail!("could not load movies: {err}");
    }
    tracing::debug!(
        view = ?view,
        count = watchlist.records().len(),
        loading = watchlist.is_loading(),
        "view ready"
    );
    Ok(())
}

/// Names the offending field for validation failures.
fn write_error(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Validation(err) => match err.field() {
            Some(field) => anyhow::anyhow!("invalid {field}: {err}"),
            None => anyhow::anyhow!("invalid movie: {err}"),
        },
        err => err.into(),
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve => serve().await?,
        Commands::List { view, sort } => {
            let mut watchlist = watchlist()?;
            load_view(&mut watchlist, view).await?;
            let movies = client::sorted(watchlist.records(), sort.unwrap_or(view.default_sort()));
            output::print_movies(&movies, view.empty_message());
        },
        Commands::Add { title, year, genre, rating, watched } => {
            let mut watchlist = watchlist()?;
            let input = MovieInput { title, year, genre, watched, rating };
            let movie = watchlist.add(input).await.map_err(write_error)?;
            println!("Added:");
            output::print_movie(&movie);
        },
        Commands::Edit { id, title, year, genre, rating, clear_rating, watched } => {
            let mut watchlist = watchlist()?;
            let current = match watchlist.api().get(&id).await {
                Ok(movie) => movie,
                Err(err) if err.is_not_found() => anyhow::bail!("no movie with id {id}"),
                Err(err) => return Err(err.into()),
            };
            let mut input = MovieInput::from(&current);
            if let Some(title) = title {
                input.title = title;
            }
            if let Some(year) = year {
                input.year = year;
            }
            if let Some(genre) = genre {
                input.genre = genre;
            }
            if let Some(watched) = watched {
                input.watched = watched;
            }
            if clear_rating {
                input.rating = None;
            } else if rating.is_some() {
                input.rating = rating;
            }
            let movie = watchlist.edit(&id, input).await.map_err(write_error)?;
            println!("Updated:");
            output::print_movie(&movie);
        },
        Commands::Toggle { id, view } => {
            let mut watchlist = watchlist()?;
            load_view(&mut watchlist, view).await?;
            let current = watchlist
                .find(&id)
                .map(|m| m.watched)
                .with_context(|| format!("movie {id} is not in the {view:?} view"))?;
            let options = view.toggle_options();
            let watched = match watchlist.toggle_watched(&id, current, options).await {
                Ok(watched) => watched,
                Err(err) => {
                    // Pick up any change made elsewhere before reporting.
                    watchlist.refetch().await;
                    let status = match watchlist.find(&id) {
                        Some(movie) if movie.watched => "watched",
                        Some(_) => "pending",
                        None => "no longer in this view",
                    };
                    let context = format!("toggle failed, {id} is {status}");
                    return Err(anyhow::Error::new(err).context(context));
                },
            };
            println!("{id} is now {}", if watched { "watched" } else { "pending" });
        },
        Commands::Delete { id, yes } => {
            let mut watchlist = watchlist()?;
            match watchlist.delete(&id, &PromptConfirm { assume_yes: yes }).await? {
                DeleteOutcome::Deleted => println!("Deleted {id}"),
                DeleteOutcome::Cancelled => println!("Cancelled"),
            }
        },
    }

    Ok(())
}
