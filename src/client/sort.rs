use std::cmp::Ordering;

use crate::models::Movie;

/// Display orderings applied to an already loaded list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum LocalSort {
    /// Id order, which follows creation order.
    #[default]
    Default,
    TitleAsc,
    TitleDesc,
    YearAsc,
    YearDesc,
    DateAsc,
    DateDesc,
    /// Best rated first.
    RatingDesc,
    /// Worst rated first.
    RatingAsc,
}

/// Returns a sorted copy of `movies`. Unrated movies always come last when
/// sorting by rating.
pub fn sorted(movies: &[Movie], key: LocalSort) -> Vec<Movie> {
    let mut out = movies.to_vec();
    match key {
        LocalSort::Default => out.sort_by(|a, b| a.id.cmp(&b.id)),
        LocalSort::TitleAsc => out.sort_by(|a, b| by_title(a, b)),
        LocalSort::TitleDesc => out.sort_by(|a, b| by_title(b, a)),
        LocalSort::YearAsc => out.sort_by_key(|m| m.year),
        LocalSort::YearDesc => out.sort_by(|a, b| b.year.cmp(&a.year)),
        LocalSort::DateAsc => out.sort_by_key(|m| m.created_at),
        LocalSort::DateDesc => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        LocalSort::RatingDesc => out.sort_by(|a, b| by_rating(a.rating, b.rating, true)),
        LocalSort::RatingAsc => out.sort_by(|a, b| by_rating(a.rating, b.rating, false)),
    }
    out
}

fn by_title(a: &Movie, b: &Movie) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase()).then_with(|| a.title.cmp(&b.title))
}

fn by_rating(a: Option<f64>, b: Option<f64>, best_first: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if best_first => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
