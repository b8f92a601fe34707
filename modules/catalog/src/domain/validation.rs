use chrono::{DateTime, NaiveDate};

use crate::contract::model::MovieData;
use crate::domain::error::DomainError;

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_DURATION_MINUTES: i32 = 500;

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is taken.
pub fn parse_release_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            DomainError::validation(
                "release",
                format!("'{raw}' is not a date (expected YYYY-MM-DD)"),
            )
        })
}

/// Check movie fields and return them with the title trimmed.
pub fn validate_movie(mut data: MovieData) -> Result<MovieData, DomainError> {
    let title = data.title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(
            "title",
            format!("must be at most {MAX_TITLE_LEN} characters"),
        ));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&data.duration_minutes) {
        return Err(DomainError::validation(
            "duration_minutes",
            format!("must be between 1 and {MAX_DURATION_MINUTES}"),
        ));
    }
    data.title = data.title.trim().to_string();
    Ok(data)
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation("email", "invalid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(title: &str, duration: i32) -> MovieData {
        MovieData {
            title: title.into(),
            release_date: NaiveDate::from_ymd_opt(2021, 10, 22).unwrap(),
            plot: None,
            duration_minutes: duration,
            poster_url: None,
            trailer_url: None,
        }
    }

    #[test]
    fn release_date_formats() {
        let d = NaiveDate::from_ymd_opt(2021, 10, 22).unwrap();
        assert_eq!(parse_release_date("2021-10-22").unwrap(), d);
        assert_eq!(parse_release_date(" 2021-10-22T10:00:00Z ").unwrap(), d);
        assert_eq!(parse_release_date("2021-10-22T23:30:00+02:00").unwrap(), d);

        for bad in ["", "22.10.2021", "2021-13-01", "yesterday"] {
            let err = parse_release_date(bad).unwrap_err();
            assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "release"));
        }
    }

    #[test]
    fn movie_invariants() {
        assert!(validate_movie(data("Dune", 155)).is_ok());
        assert!(validate_movie(data("   ", 155)).is_err());
        assert!(validate_movie(data("Dune", 0)).is_err());
        assert!(validate_movie(data("Dune", -5)).is_err());
        assert!(validate_movie(data("Dune", 501)).is_err());
        assert!(validate_movie(data(&"x".repeat(256), 90)).is_err());
    }

    #[test]
    fn title_is_trimmed() {
        let ok = validate_movie(data("  Dune \t", 155)).unwrap();
        assert_eq!(ok.title, "Dune");

        let padded = format!(" {} ", "x".repeat(255));
        assert_eq!(validate_movie(data(&padded, 90)).unwrap().title.len(), 255);
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.io").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.io").is_err());
        assert!(validate_email("plain").is_err());
    }
}
