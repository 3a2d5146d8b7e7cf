//! Birth-date post-filter and age arithmetic

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{Result, SearchError};

/// Inclusive birth-date window applied after enrichment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BirthDateBounds {
    pub born_after: Option<NaiveDate>,
    pub born_before: Option<NaiveDate>,
}

impl BirthDateBounds {
    pub fn new(born_after: Option<NaiveDate>, born_before: Option<NaiveDate>) -> Result<Self> {
        if let (Some(after), Some(before)) = (born_after, born_before) {
            if after > before {
                return Err(SearchError::InvalidQuery(format!(
                    "born-after {} is later than born-before {}",
                    after, before
                )));
            }
        }
        Ok(Self {
            born_after,
            born_before,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.born_after.is_none() && self.born_before.is_none()
    }

    /// Whether a person born on `birth_date` passes the filter
    ///
    /// An unknown birth date only passes when no bound is set.
    pub fn contains(&self, birth_date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = birth_date else {
            return false;
        };
        self.born_after.map_or(true, |after| date >= after)
            && self.born_before.map_or(true, |before| date <= before)
    }
}

/// Latest birth date of someone at least `min_age` years old on `today`
pub fn born_before_for_min_age(min_age: u32, today: NaiveDate) -> Result<NaiveDate> {
    let result = years_back(today, min_age, 0)?;
    if result.month() == 3 && result.day() == 1 && is_leap_year(result.year()) {
        return result
            .pred_opt()
            .ok_or_else(|| out_of_range("minimum age", min_age));
    }
    Ok(result)
}

/// Earliest birth date of someone at most `max_age` years old on `today`
pub fn born_after_for_max_age(max_age: u32, today: NaiveDate) -> Result<NaiveDate> {
    let years = max_age
        .checked_add(1)
        .ok_or_else(|| out_of_range("maximum age", max_age))?;
    years_back(today, years, 1)
}

/// Same month and day `years` earlier, plus `extra_days`; a day that does not
/// exist in the target month rolls over into the next one (Feb 29 -> Mar 1)
fn years_back(today: NaiveDate, years: u32, extra_days: u64) -> Result<NaiveDate> {
    let year = i32::try_from(years)
        .ok()
        .and_then(|years| today.year().checked_sub(years))
        .ok_or_else(|| out_of_range("age", years))?;

    NaiveDate::from_ymd_opt(year, today.month(), 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(today.day() - 1) + extra_days)))
        .ok_or_else(|| out_of_range("age", years))
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn out_of_range(what: &str, value: u32) -> SearchError {
    SearchError::InvalidQuery(format!("{} {} is out of range", what, value))
}
