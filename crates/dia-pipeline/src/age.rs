//! Age derivation from the raw date pair.

use crate::error::{PipelineError, Result};
use chrono::{Datelike, NaiveDate};

/// Whole-years age at observation time: the number of complete year
/// boundaries crossed between the birthday and the observation date.
///
/// Calendar-aware, not a day-count divide: the year counter only advances
/// once the observation's (month, day) has reached the birthday's. A Feb-29
/// birthday therefore ages on Mar 1 in non-leap years.
///
/// `observation_id` is carried into the error for row context; an
/// observation that precedes the birthday is a data-integrity failure, not
/// a negative age.
pub fn whole_years(
    observation_id: i64,
    birthday: NaiveDate,
    observation: NaiveDate,
) -> Result<i32> {
    if observation < birthday {
        return Err(PipelineError::InvalidDateRange {
            observation_id,
            birthday,
            observation,
        });
    }

    let mut years = observation.year() - birthday.year();
    if (observation.month(), observation.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    Ok(years)
}
