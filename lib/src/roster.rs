use crate::Result;
use derive_deref::Deref;
use polars::prelude::*;
use std::path::Path;

/// Seasonal roster table. Not consumed by the scorers; passed through to callers.
#[derive(Clone, Deref)]
pub struct RosterDf(DataFrame);

impl RosterDf {
    pub fn new(df: DataFrame) -> Self {
        RosterDf(df)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Ok(RosterDf(df))
    }

    /// Drops repeated rows for the same player, keeping the first.
    pub fn unique_players(self) -> Result<Self> {
        let expr = col("gsis_id").is_first_distinct();
        let df = self.0.lazy().filter(expr).collect()?;
        Ok(RosterDf(df))
    }
}
