use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Score bands used by both the filter and the statistics panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceBand {
    pub const EXCELLENT_MIN: f64 = 80.0;
    pub const GOOD_MIN: f64 = 60.0;
    pub const AVERAGE_MIN: f64 = 40.0;

    /// Every percentage lands in exactly one band; NaN counts as poor.
    pub fn of(percentage: f64) -> Self {
        if percentage >= Self::EXCELLENT_MIN {
            PerformanceBand::Excellent
        } else if percentage >= Self::GOOD_MIN {
            PerformanceBand::Good
        } else if percentage >= Self::AVERAGE_MIN {
            PerformanceBand::Average
        } else {
            PerformanceBand::Poor
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandFilter {
    #[default]
    All,
    Excellent,
    Good,
    Average,
    Poor,
}

impl BandFilter {
    pub fn matches(&self, percentage: f64) -> bool {
        let band = PerformanceBand::of(percentage);
        match self {
            BandFilter::All => true,
            BandFilter::Excellent => band == PerformanceBand::Excellent,
            BandFilter::Good => band == PerformanceBand::Good,
            BandFilter::Average => band == PerformanceBand::Average,
            BandFilter::Poor => band == PerformanceBand::Poor,
        }
    }
}

impl FromStr for BandFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(BandFilter::All),
            "excellent" => Ok(BandFilter::Excellent),
            "good" => Ok(BandFilter::Good),
            "average" => Ok(BandFilter::Average),
            "poor" => Ok(BandFilter::Poor),
            other => Err(AppError::ValidationError(format!(
                "Unknown performance filter '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Name,
    Id,
    Score,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortKey {
    fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Name => "name",
            SortKey::Id => "id",
            SortKey::Score => "score",
        }
    }
}

impl SortDirection {
    fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Transient view state of the results catalog. Survives reloads.
#[derive(Clone, Debug, PartialEq, Default, Deserialize, Serialize)]
pub struct FilterState {
    pub search: String,
    pub band: BandFilter,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl FilterState {
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_band(mut self, band: BandFilter) -> Self {
        self.band = band;
        self
    }

    pub fn with_sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    /// Applies a combined sort option such as `score-desc` or `name-asc`,
    /// the form the sort selector emits.
    pub fn set_sort_option(&mut self, option: &str) -> Result<(), AppError> {
        let invalid = || AppError::ValidationError(format!("Unknown sort option '{}'", option));
        let (key, direction) = option.trim().split_once('-').ok_or_else(invalid)?;

        self.sort_key = match key.to_lowercase().as_str() {
            "date" => SortKey::Date,
            "name" => SortKey::Name,
            "id" => SortKey::Id,
            "score" => SortKey::Score,
            _ => return Err(invalid()),
        };
        self.sort_direction = match direction.to_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(())
    }

    pub fn sort_option(&self) -> String {
        format!("{}-{}", self.sort_key.as_str(), self.sort_direction.as_str())
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "search='{}' band={:?} sort={}",
            self.search,
            self.band,
            self.sort_option()
        )
    }
}
