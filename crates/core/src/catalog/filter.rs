//! Catalog filter composition.
//!
//! Turns the loosely typed query string of a catalog listing into a
//! [`Predicate`]. Each parameter may be absent, empty, or the literal `all`,
//! all of which disable the corresponding clause.

use std::ops::Bound;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::catalog::predicate::Predicate;
use crate::error::ValidationError;

/// Date record type used by the year filter.
pub const ON_SALE_DATE: &str = "onsaleDate";

/// Raw catalog listing parameters, as received on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub price_range: Option<String>,
    pub sort_order: Option<String>,
    pub category: Option<String>,
    pub format: Option<String>,
    pub year: Option<String>,
}

/// Returns the trimmed parameter value, or `None` if it disables its filter.
#[must_use]
pub fn active(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}

/// Price range buckets offered by the catalog UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    /// price < 5
    Under5,
    /// 5 <= price <= 10
    From5To10,
    /// 10 <= price <= 20
    From10To20,
    /// price > 20
    Over20,
}

impl PriceBucket {
    /// Parse a bucket label.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPriceRange`] for unknown labels.
    pub fn parse(label: &str) -> Result<Self, ValidationError> {
        match label {
            "<5" => Ok(Self::Under5),
            "5-10" => Ok(Self::From5To10),
            "10-20" => Ok(Self::From10To20),
            "20+" => Ok(Self::Over20),
            other => Err(ValidationError::InvalidPriceRange(other.to_string())),
        }
    }

    /// The canonical price bounds of this bucket.
    #[must_use]
    pub const fn bounds(self) -> (Bound<f64>, Bound<f64>) {
        match self {
            Self::Under5 => (Bound::Unbounded, Bound::Excluded(5.0)),
            Self::From5To10 => (Bound::Included(5.0), Bound::Included(10.0)),
            Self::From10To20 => (Bound::Included(10.0), Bound::Included(20.0)),
            Self::Over20 => (Bound::Excluded(20.0), Bound::Unbounded),
        }
    }

    #[must_use]
    pub const fn predicate(self) -> Predicate {
        let (lower, upper) = self.bounds();
        Predicate::PriceWithin { lower, upper }
    }
}

/// The inclusive wall-clock window covering a calendar year.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidYear`] unless `raw` is an integer in
/// `1..=9999`.
pub fn year_window(raw: &str) -> Result<(NaiveDateTime, NaiveDateTime), ValidationError> {
    let invalid = || ValidationError::InvalidYear(raw.to_string());

    let year: i32 = raw.parse().map_err(|_| invalid())?;
    if !(1..=9999).contains(&year) {
        return Err(invalid());
    }

    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(invalid)?;

    Ok((first.and_time(NaiveTime::MIN), last.and_time(end_of_day)))
}

/// Parse the wall-clock part of a stored date string.
///
/// Only the first 19 characters (`YYYY-MM-DDTHH:MM:SS`) are considered, so a
/// trailing offset such as `-0500` is ignored. A bare `YYYY-MM-DD` means
/// midnight.
#[must_use]
pub fn wall_clock(raw: &str) -> Option<NaiveDateTime> {
    let full = raw
        .get(..19)
        .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S").ok());
    if full.is_some() {
        return full;
    }

    raw.get(..10)
        .filter(|_| raw.len() == 10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Titles containing `name`, ignoring case.
#[must_use]
pub fn series_filter(name: &str) -> Predicate {
    Predicate::Contains {
        field: "title".to_string(),
        needle: name.to_string(),
    }
}

impl CatalogQuery {
    /// Compose the filter predicate for this listing.
    ///
    /// Pagination and sort parameters are not part of the filter; see
    /// [`crate::catalog::page`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown price bucket or a
    /// malformed year.
    pub fn predicate(&self) -> Result<Predicate, ValidationError> {
        let mut clauses = Vec::new();

        if let Some(search) = active(self.search.as_deref()) {
            let keywords = search
                .split_whitespace()
                .map(|word| Predicate::Contains {
                    field: "title".to_string(),
                    needle: word.to_string(),
                })
                .collect();
            clauses.push(Predicate::Or(keywords));
        }

        if let Some(category) = active(self.category.as_deref()) {
            clauses.push(Predicate::Contains {
                field: "categories".to_string(),
                needle: category.to_string(),
            });
        }

        if let Some(format) = active(self.format.as_deref()) {
            clauses.push(Predicate::EqualsIgnoreCase {
                field: "format".to_string(),
                value: format.to_string(),
            });
        }

        if let Some(bucket) = active(self.price_range.as_deref()) {
            clauses.push(PriceBucket::parse(bucket)?.predicate());
        }

        if let Some(year) = active(self.year.as_deref()) {
            let (from, to) = year_window(year)?;
            clauses.push(Predicate::DateRecord {
                field: "dates".to_string(),
                kind: ON_SALE_DATE.to_string(),
                from,
                to,
            });
        }

        Ok(Predicate::And(clauses))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query() -> CatalogQuery {
        CatalogQuery::default()
    }

    #[test]
    fn test_no_parameters_matches_everything() {
        assert!(query().predicate().unwrap().is_all());
    }

    #[test]
    fn test_sentinels_disable_filters() {
        let q = CatalogQuery {
            search: Some("   ".to_string()),
            price_range: Some("ALL".to_string()),
            category: Some(String::new()),
            format: Some(" all ".to_string()),
            year: Some("all".to_string()),
            ..query()
        };
        assert!(q.predicate().unwrap().is_all());
    }

    #[test]
    fn test_search_splits_into_or_of_keywords() {
        let q = CatalogQuery {
            search: Some("amazing  spider".to_string()),
            ..query()
        };
        let Predicate::And(clauses) = q.predicate().unwrap() else {
            panic!("expected And");
        };
        assert_eq!(
            clauses,
            vec![Predicate::Or(vec![
                Predicate::Contains {
                    field: "title".to_string(),
                    needle: "amazing".to_string()
                },
                Predicate::Contains {
                    field: "title".to_string(),
                    needle: "spider".to_string()
                },
            ])]
        );
    }

    #[test]
    fn test_regex_metacharacters_stay_literal() {
        let q = CatalogQuery {
            search: Some("x-men.*".to_string()),
            ..query()
        };
        let Predicate::And(clauses) = q.predicate().unwrap() else {
            panic!("expected And");
        };
        assert_eq!(
            clauses[0],
            Predicate::Or(vec![Predicate::Contains {
                field: "title".to_string(),
                needle: "x-men.*".to_string()
            }])
        );
    }

    #[test]
    fn test_category_and_format_clauses() {
        let q = CatalogQuery {
            category: Some("Horror".to_string()),
            format: Some("Comic".to_string()),
            ..query()
        };
        let Predicate::And(clauses) = q.predicate().unwrap() else {
            panic!("expected And");
        };
        assert_eq!(clauses.len(), 2);
        assert!(matches!(&clauses[0], Predicate::Contains { field, .. } if field == "categories"));
        assert!(
            matches!(&clauses[1], Predicate::EqualsIgnoreCase { field, value } if field == "format" && value == "Comic")
        );
    }

    #[test]
    fn test_price_buckets() {
        assert_eq!(
            PriceBucket::parse("<5").unwrap().bounds(),
            (Bound::Unbounded, Bound::Excluded(5.0))
        );
        assert_eq!(
            PriceBucket::parse("5-10").unwrap().bounds(),
            (Bound::Included(5.0), Bound::Included(10.0))
        );
        assert_eq!(
            PriceBucket::parse("20+").unwrap().bounds(),
            (Bound::Excluded(20.0), Bound::Unbounded)
        );
        assert_eq!(
            PriceBucket::parse("cheap"),
            Err(ValidationError::InvalidPriceRange("cheap".to_string()))
        );
    }

    #[test]
    fn test_unknown_bucket_is_rejected() {
        let q = CatalogQuery {
            price_range: Some("1-2".to_string()),
            ..query()
        };
        assert!(matches!(
            q.predicate(),
            Err(ValidationError::InvalidPriceRange(_))
        ));
    }

    #[test]
    fn test_year_window() {
        let (from, to) = year_window("2019").unwrap();
        assert_eq!(from.to_string(), "2019-01-01 00:00:00");
        assert_eq!(to.to_string(), "2019-12-31 23:59:59");
    }

    #[test]
    fn test_malformed_year_is_rejected() {
        for raw in ["19x9", "0", "10000", "-5", "2019.5"] {
            assert_eq!(
                year_window(raw),
                Err(ValidationError::InvalidYear(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_year_clause() {
        let q = CatalogQuery {
            year: Some(" 1962 ".to_string()),
            ..query()
        };
        let Predicate::And(clauses) = q.predicate().unwrap() else {
            panic!("expected And");
        };
        assert!(
            matches!(&clauses[0], Predicate::DateRecord { field, kind, .. } if field == "dates" && kind == ON_SALE_DATE)
        );
    }

    #[test]
    fn test_wall_clock_ignores_offset() {
        let at = wall_clock("2019-12-31T23:59:59-0500").unwrap();
        assert_eq!(at.to_string(), "2019-12-31 23:59:59");
        assert_eq!(
            wall_clock("1962-08-10").unwrap().to_string(),
            "1962-08-10 00:00:00"
        );
        assert!(wall_clock("-0001-11-30T00:00:00-0500").is_none());
        assert!(wall_clock("soon").is_none());
    }

    #[test]
    fn test_series_filter() {
        assert_eq!(
            series_filter("Batman"),
            Predicate::Contains {
                field: "title".to_string(),
                needle: "Batman".to_string()
            }
        );
    }

    #[test]
    fn test_query_deserializes_camel_case_and_ignores_unknown_keys() {
        let q: CatalogQuery = serde_json::from_value(serde_json::json!({
            "priceRange": "5-10",
            "sortOrder": "desc",
            "search[$ne]": "1"
        }))
        .unwrap();
        assert_eq!(q.price_range.as_deref(), Some("5-10"));
        assert_eq!(q.sort_order.as_deref(), Some("desc"));
        assert_eq!(q.search, None);
    }
}
