use polars::prelude::*;
use serde::de::DeserializeOwned;

use crate::loader::{DRIVER_ID, ROUND};

/// Stable sort by driver identity then round, missing rounds last.
pub(crate) fn driver_round_order() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_maintain_order(true)
        .with_nulls_last(true)
}

pub(crate) fn sort_by_driver_round(lf: LazyFrame) -> LazyFrame {
    lf.sort([DRIVER_ID, ROUND], driver_round_order())
}

/// Decode every row of `df` into `T` through the frame's JSON form.
pub(crate) fn frame_rows<T: DeserializeOwned>(df: &mut DataFrame) -> crate::Result<Vec<T>> {
    if df.height() == 0 {
        return Ok(vec![]);
    }
    let mut j = Vec::<u8>::new();
    JsonWriter::new(&mut j)
        .with_json_format(JsonFormat::Json)
        .finish(df)?;
    let rows = serde_json::from_slice::<Vec<T>>(&j)?;
    Ok(rows)
}
