use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::movie,
    validation::{self, ValidationError},
};

/// A movie as it travels over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub watched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: Timestamp,
}

impl TryFrom<movie::Model> for Movie {
    type Error = jiff::Error;

    fn try_from(model: movie::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            title: model.title,
            year: model.year,
            genre: model.genre,
            watched: model.watched,
            rating: model.rating,
            created_at: Timestamp::from_millisecond(model.created_at)?,
        })
    }
}

/// A number that may arrive as a JSON number or as a numeric string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Blank text counts as no value.
    pub fn value(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        match self {
            LooseNumber::Number(n) => Ok(Some(*n)),
            LooseNumber::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse().map(Some).map_err(|_| ValidationError::NotNumeric { field })
            },
        }
    }
}

/// Validated fields of a movie, used for create and full replace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub year: i32,
    pub genre: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl MovieInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_text("title", &self.title)?;
        validation::validate_text("genre", &self.genre)?;
        validation::validate_year(self.year)?;
        if let Some(rating) = self.rating {
            validation::validate_rating(rating)?;
        }
        Ok(())
    }
}

impl From<&Movie> for MovieInput {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            genre: movie.genre.clone(),
            watched: movie.watched,
            rating: movie.rating,
        }
    }
}

/// Request body for create and replace, before coercion and validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<LooseNumber>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub watched: Option<bool>,
    #[serde(default)]
    pub rating: Option<LooseNumber>,
}

impl MovieDraft {
    pub fn into_input(self) -> Result<MovieInput, ValidationError> {
        let title = self.title.filter(|t| !t.trim().is_empty());
        let genre = self.genre.filter(|g| !g.trim().is_empty());
        let year = self.year.map(|y| y.value("year")).transpose()?.flatten();

        let (Some(title), Some(genre), Some(year)) = (title, genre, year) else {
            return Err(ValidationError::MissingRequired);
        };

        let input = MovieInput {
            title: title.trim().to_string(),
            year: validation::coerce_year(year)?,
            genre: genre.trim().to_string(),
            watched: self.watched.unwrap_or(false),
            rating: self.rating.map(|r| r.value("rating")).transpose()?.flatten(),
        };
        input.validate()?;
        Ok(input)
    }
}

/// Request body for a partial update. Only present fields are applied;
/// `"rating": null` clears the rating while an omitted rating keeps it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub rating: Option<Option<LooseNumber>>,
}

impl MoviePatch {
    pub fn watched(watched: bool) -> Self {
        Self { watched: Some(watched), ..Default::default() }
    }

    pub fn into_changes(self) -> Result<MovieChanges, ValidationError> {
        let title = self.title.map(|t| trimmed("title", t)).transpose()?;
        let genre = self.genre.map(|g| trimmed("genre", g)).transpose()?;

        let year = match self.year {
            Some(y) => match y.value("year")? {
                Some(y) => Some(validation::coerce_year(y)?),
                None => return Err(ValidationError::Empty { field: "year" }),
            },
            None => None,
        };

        let rating = match self.rating {
            Some(Some(r)) => {
                let rating = r.value("rating")?;
                if let Some(rating) = rating {
                    validation::validate_rating(rating)?;
                }
                Some(rating)
            },
            Some(None) => Some(None),
            None => None,
        };

        Ok(MovieChanges { title, year, genre, watched: self.watched, rating })
    }
}

fn trimmed(field: &'static str, value: String) -> Result<String, ValidationError> {
    validation::validate_text(field, &value)?;
    Ok(value.trim().to_string())
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated partial update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub watched: Option<bool>,
    pub rating: Option<Option<f64>>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SortField {
    Title,
    Year,
    Genre,
    Watched,
    Rating,
    CreatedAt,
}

impl SortField {
    /// Any name starting with `rating` (e.g. `rating_desc`) selects the rating.
    pub fn parse(name: &str) -> Option<Self> {
        if name.starts_with("rating") {
            return Some(SortField::Rating);
        }
        match name {
            "title" => Some(SortField::Title),
            "year" => Some(SortField::Year),
            "genre" => Some(SortField::Genre),
            "watched" => Some(SortField::Watched),
            "createdAt" | "created_at" | "date" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Genre => "genre",
            SortField::Watched => "watched",
            SortField::Rating => "rating",
            SortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { field: SortField::CreatedAt, order: SortOrder::Desc }
    }
}

/// Filter and sort for a list query. Compared by value so that an
/// equivalent filter never triggers a second load.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct MovieFilter {
    pub watched: Option<bool>,
    pub sort: Option<SortSpec>,
}

impl MovieFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn watched(watched: bool) -> Self {
        Self { watched: Some(watched), sort: None }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if let Some(watched) = self.watched {
            pairs.push(("watched", if watched { "true" } else { "false" }));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sortBy", sort.field.as_param()));
            pairs.push(("order", sort.order.as_param()));
        }
        pairs
    }
}

/// Raw list query string as received by the server.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub watched: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    /// `watched` filters only when present; any value other than `true` means false.
    pub fn into_filter(self) -> MovieFilter {
        let watched = self.watched.map(|w| w == "true");
        let sort = self.sort_by.as_deref().and_then(SortField::parse).map(|field| SortSpec {
            field,
            order: SortOrder::parse(self.order.as_deref()),
        });
        if sort.is_none() && self.sort_by.is_some() {
            tracing::debug!(sort_by = ?self.sort_by, "unknown sort field, using default order");
        }
        MovieFilter { watched, sort }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteAck {
    pub sucesso: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub erro: String,
}
