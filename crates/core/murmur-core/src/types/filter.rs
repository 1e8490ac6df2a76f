//! Filter constraints applied to a similarity search

use crate::{MurmurError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Highest rating a customer can give; a ceiling at this value filters nothing
pub const MAX_RATING: i32 = 5;

/// Lowest rating a customer can give
pub const MIN_RATING: i32 = 1;

/// Longest substring accepted for the text filter
pub const MAX_CONTAINS_LEN: usize = 200;

/// Rating categories stored on every feedback record.
///
/// Declaration order is the predicate order used by the query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingCategory {
    /// Quality of the work performed
    QualityOfWork,
    /// Whether the service was on time
    Timeliness,
    /// Politeness of the staff
    Politeness,
    /// Cleanliness of the site after service
    Cleanliness,
    /// Overall experience
    OverallExperience,
}

impl RatingCategory {
    /// Every category, in predicate order
    pub const ALL: [RatingCategory; 5] = [
        RatingCategory::QualityOfWork,
        RatingCategory::Timeliness,
        RatingCategory::Politeness,
        RatingCategory::Cleanliness,
        RatingCategory::OverallExperience,
    ];

    /// Column holding this rating in the feedback table
    pub fn column(self) -> &'static str {
        match self {
            RatingCategory::QualityOfWork => "rating_quality_of_work",
            RatingCategory::Timeliness => "rating_timeliness",
            RatingCategory::Politeness => "rating_politeness",
            RatingCategory::Cleanliness => "rating_cleanliness",
            RatingCategory::OverallExperience => "rating_overall_experience",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            RatingCategory::QualityOfWork => "Quality of Work",
            RatingCategory::Timeliness => "Timeliness",
            RatingCategory::Politeness => "Politeness",
            RatingCategory::Cleanliness => "Cleanliness",
            RatingCategory::OverallExperience => "Overall Experience",
        }
    }

    /// Key used in JSON payloads and field names
    pub fn key(self) -> &'static str {
        match self {
            RatingCategory::QualityOfWork => "quality_of_work",
            RatingCategory::Timeliness => "timeliness",
            RatingCategory::Politeness => "politeness",
            RatingCategory::Cleanliness => "cleanliness",
            RatingCategory::OverallExperience => "overall_experience",
        }
    }
}

impl fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RatingCategory {
    type Err = MurmurError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix("rating_").unwrap_or(&normalized);
        RatingCategory::ALL
            .into_iter()
            .find(|c| c.key() == normalized)
            .ok_or_else(|| {
                MurmurError::validation("rating_category", format!("unknown category '{}'", s))
            })
    }
}

/// Unvalidated filter values as supplied by a caller (CLI flags, form fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFilter {
    /// Per-category ceilings; missing categories are unconstrained
    #[serde(default)]
    pub ratings: BTreeMap<RatingCategory, i64>,

    /// Maximum cosine distance
    #[serde(default)]
    pub distance_threshold: Option<f64>,

    /// Case-insensitive substring of the feedback text
    #[serde(default)]
    pub contains: Option<String>,

    /// Maximum number of rows to return
    pub top_n: i64,
}

/// Validated, normalized search constraints.
///
/// Absent fields mean "no constraint" and produce no predicate at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    rating_ceilings: BTreeMap<RatingCategory, i32>,
    distance_threshold: Option<f64>,
    text_contains: Option<String>,
    top_n: u32,
}

impl FilterSpec {
    /// Filter with no optional constraints
    pub fn unconstrained(top_n: u32) -> Result<Self> {
        Self::validate(RawFilter {
            top_n: i64::from(top_n),
            ..Default::default()
        })
    }

    /// Validate raw caller values.
    ///
    /// A ceiling equal to [`MAX_RATING`] is normalized to absent, as is a blank
    /// substring.
    pub fn validate(raw: RawFilter) -> Result<Self> {
        let mut rating_ceilings = BTreeMap::new();
        for (category, ceiling) in raw.ratings {
            if !(i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&ceiling) {
                return Err(MurmurError::validation(
                    category.column(),
                    format!(
                        "rating ceiling must be between {} and {}, got {}",
                        MIN_RATING, MAX_RATING, ceiling
                    ),
                ));
            }
            let ceiling = ceiling as i32;
            if ceiling < MAX_RATING {
                rating_ceilings.insert(category, ceiling);
            }
        }

        if let Some(threshold) = raw.distance_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(MurmurError::validation(
                    "distance_threshold",
                    format!("must be between 0 and 1, got {}", threshold),
                ));
            }
        }

        let text_contains = match raw.contains {
            Some(text) => {
                let trimmed = text.trim();
                if trimmed.chars().count() > MAX_CONTAINS_LEN {
                    return Err(MurmurError::validation(
                        "contains",
                        format!("must be at most {} characters", MAX_CONTAINS_LEN),
                    ));
                }
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            None => None,
        };

        if raw.top_n <= 0 {
            return Err(MurmurError::validation(
                "top_n",
                format!("must be a positive integer, got {}", raw.top_n),
            ));
        }
        let top_n = u32::try_from(raw.top_n).map_err(|_| {
            MurmurError::validation("top_n", format!("too large: {}", raw.top_n))
        })?;

        Ok(Self {
            rating_ceilings,
            distance_threshold: raw.distance_threshold,
            text_contains,
            top_n,
        })
    }

    /// Ceiling for a category, if constrained
    pub fn rating_ceiling(&self, category: RatingCategory) -> Option<i32> {
        self.rating_ceilings.get(&category).copied()
    }

    /// Constrained categories with their ceilings, in predicate order
    pub fn rating_ceilings(&self) -> impl Iterator<Item = (RatingCategory, i32)> + '_ {
        RatingCategory::ALL
            .into_iter()
            .filter_map(|c| self.rating_ceiling(c).map(|ceiling| (c, ceiling)))
    }

    /// Maximum cosine distance, if constrained
    pub fn distance_threshold(&self) -> Option<f64> {
        self.distance_threshold
    }

    /// Substring filter, if constrained
    pub fn text_contains(&self) -> Option<&str> {
        self.text_contains.as_deref()
    }

    /// Row limit
    pub fn top_n(&self) -> u32 {
        self.top_n
    }

    /// Number of optional predicates this filter produces
    pub fn constraint_count(&self) -> usize {
        self.rating_ceilings.len()
            + usize::from(self.distance_threshold.is_some())
            + usize::from(self.text_contains.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(top_n: i64) -> RawFilter {
        RawFilter {
            top_n,
            ..Default::default()
        }
    }

    #[test]
    fn test_unconstrained_filter() {
        let spec = FilterSpec::unconstrained(10).unwrap();
        assert_eq!(spec.constraint_count(), 0);
        assert_eq!(spec.top_n(), 10);
        assert!(spec.distance_threshold().is_none());
        assert!(spec.text_contains().is_none());
    }

    #[test]
    fn test_max_rating_normalizes_to_absent() {
        let mut r = raw(5);
        r.ratings.insert(RatingCategory::Politeness, MAX_RATING as i64);
        r.ratings.insert(RatingCategory::Timeliness, 3);
        let spec = FilterSpec::validate(r).unwrap();

        assert_eq!(spec.rating_ceiling(RatingCategory::Politeness), None);
        assert_eq!(spec.rating_ceiling(RatingCategory::Timeliness), Some(3));
        assert_eq!(spec.constraint_count(), 1);
    }

    #[test]
    fn test_rating_out_of_range_names_column() {
        for bad in [0, 6, -1] {
            let mut r = raw(5);
            r.ratings.insert(RatingCategory::Cleanliness, bad);
            match FilterSpec::validate(r) {
                Err(MurmurError::Validation { field, .. }) => {
                    assert_eq!(field, "rating_cleanliness")
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_distance_threshold_bounds() {
        let mut r = raw(5);
        r.distance_threshold = Some(0.0);
        assert!(FilterSpec::validate(r.clone()).is_ok());
        r.distance_threshold = Some(1.0);
        assert!(FilterSpec::validate(r.clone()).is_ok());

        for bad in [-0.01, 1.01, f64::NAN] {
            r.distance_threshold = Some(bad);
            match FilterSpec::validate(r.clone()) {
                Err(MurmurError::Validation { field, .. }) => {
                    assert_eq!(field, "distance_threshold")
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_top_n_must_be_positive() {
        for bad in [0, -3] {
            match FilterSpec::validate(raw(bad)) {
                Err(MurmurError::Validation { field, .. }) => assert_eq!(field, "top_n"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_blank_contains_is_absent() {
        let mut r = raw(5);
        r.contains = Some("   ".to_string());
        assert!(FilterSpec::validate(r.clone()).unwrap().text_contains().is_none());

        r.contains = Some("  late arrival ".to_string());
        assert_eq!(
            FilterSpec::validate(r).unwrap().text_contains(),
            Some("late arrival")
        );
    }

    #[test]
    fn test_contains_too_long() {
        let mut r = raw(5);
        r.contains = Some("x".repeat(MAX_CONTAINS_LEN + 1));
        assert!(FilterSpec::validate(r).unwrap_err().is_validation());
    }

    #[test]
    fn test_ceilings_iterate_in_fixed_order() {
        let mut r = raw(5);
        r.ratings.insert(RatingCategory::OverallExperience, 2);
        r.ratings.insert(RatingCategory::QualityOfWork, 4);
        r.ratings.insert(RatingCategory::Cleanliness, 1);
        let spec = FilterSpec::validate(r).unwrap();

        let order: Vec<_> = spec.rating_ceilings().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![
                RatingCategory::QualityOfWork,
                RatingCategory::Cleanliness,
                RatingCategory::OverallExperience
            ]
        );
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "rating_overall_experience".parse::<RatingCategory>().unwrap(),
            RatingCategory::OverallExperience
        );
        assert_eq!(
            "Timeliness".parse::<RatingCategory>().unwrap(),
            RatingCategory::Timeliness
        );
        assert!("speed".parse::<RatingCategory>().is_err());
    }
}
