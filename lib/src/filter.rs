use crate::Result;
use polars::{prelude::*, sql::SQLContext};

/// Name the play-by-play frame is registered under for SQL predicates.
pub const PLAYS_TABLE: &str = "plays";

/// Restricts `df` to the rows matching a SQL `WHERE` predicate over the `plays` table.
pub fn filter_sql(df: LazyFrame, predicate: &str) -> Result<LazyFrame> {
    let mut ctx = SQLContext::new();
    ctx.register(PLAYS_TABLE, df);
    let query = format!("SELECT * FROM {} WHERE {}", PLAYS_TABLE, predicate);
    let df = ctx.execute(&query)?;
    Ok(df)
}
