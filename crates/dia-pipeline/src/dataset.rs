//! Record batch → feature frame construction.
//!
//! Age is derived here, per record, before the frame exists: a bad date
//! pair aborts the whole batch with row context instead of producing a
//! poisoned column.

use crate::age::whole_years;
use crate::error::Result;
use crate::schema::columns;
use crate::source::ScreeningRecord;
use polars::prelude::*;

/// Split a raw batch into labelled records and their aligned target cells,
/// dropping rows without a final diagnosis. Returns the dropped count so
/// the caller can log it.
pub fn split_labelled(records: Vec<ScreeningRecord>) -> (Vec<ScreeningRecord>, Vec<bool>, usize) {
    let mut labelled = Vec::with_capacity(records.len());
    let mut target = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for record in records {
        match record.diagnosis {
            Some(diagnosis) => {
                labelled.push(record);
                target.push(diagnosis);
            }
            None => dropped += 1,
        }
    }
    (labelled, target, dropped)
}

/// Build the raw feature frame: the seven clinical measurements plus the
/// derived age, one row per record, in schema order.
pub fn feature_frame(records: &[ScreeningRecord]) -> Result<DataFrame> {
    let mut ages = Vec::with_capacity(records.len());
    for r in records {
        let age = whole_years(r.observation_id, r.birthday_date, r.observation_date)?;
        ages.push(age as f64);
    }

    let df = df![
        columns::PREGNANCIES => records.iter().map(|r| r.pregnancies).collect::<Vec<_>>(),
        columns::GLUCOSE => records.iter().map(|r| r.glucose).collect::<Vec<_>>(),
        columns::BLOOD_PRESSURE => records.iter().map(|r| r.blood_pressure).collect::<Vec<_>>(),
        columns::SKIN_THICKNESS => records.iter().map(|r| r.skin_thickness).collect::<Vec<_>>(),
        columns::INSULIN => records.iter().map(|r| r.insulin).collect::<Vec<_>>(),
        columns::BMI => records.iter().map(|r| r.bmi).collect::<Vec<_>>(),
        columns::DIABETES_PEDIGREE_FUNCTION =>
            records.iter().map(|r| r.diabetes_pedigree_function).collect::<Vec<_>>(),
        columns::AGE => ages,
    ]?;
    Ok(df)
}
