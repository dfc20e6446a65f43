//! Field rules shared by the API handlers and the client write operations.

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2025;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
pub const MAX_RATING_DECIMALS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title, year and genre are required")]
    MissingRequired,
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be a number")]
    NotNumeric { field: &'static str },
    #[error("year must be a whole number")]
    YearNotInteger,
    #[error("year must be between {min} and {max}", min = MIN_YEAR, max = MAX_YEAR)]
    YearOutOfRange,
    #[error("rating must be between 0 and 10")]
    RatingOutOfRange,
    #[error("rating can have at most two decimal places")]
    RatingPrecision,
}

impl ValidationError {
    /// The field the error refers to, if it concerns a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingRequired => None,
            ValidationError::Empty { field } | ValidationError::NotNumeric { field } => {
                Some(*field)
            },
            ValidationError::YearNotInteger | ValidationError::YearOutOfRange => Some("year"),
            ValidationError::RatingOutOfRange | ValidationError::RatingPrecision => Some("rating"),
        }
    }
}

pub fn validate_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::YearOutOfRange);
    }
    Ok(())
}

/// Converts a loosely typed year into an integer and checks its range.
pub fn coerce_year(value: f64) -> Result<i32, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::YearNotInteger);
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(ValidationError::YearOutOfRange);
    }
    let year = value as i32;
    validate_year(year)?;
    Ok(year)
}

pub fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange);
    }
    if fractional_digits(rating) > MAX_RATING_DECIMALS {
        return Err(ValidationError::RatingPrecision);
    }
    Ok(())
}

// `Display` for f64 prints the shortest representation that round-trips, so
// 7.12 prints as "7.12" even though it is not exactly representable.
fn fractional_digits(value: f64) -> usize {
    let text = value.to_string();
    text.split_once('.').map(|(_, fraction)| fraction.len()).unwrap_or(0)
}
