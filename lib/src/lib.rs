use parse_display::{Display, FromStr};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
pub mod filter;
pub mod form;
pub mod pbp;
pub mod player;
pub mod provider;
pub mod report;
pub mod roster;
pub mod schedule;
pub mod stats;
pub mod team;

pub use error::Error;
pub use form::FormConfig;
pub use player::PlayerThresholds;
pub use provider::{DataProvider, ParquetProvider};

pub type Result<T> = std::result::Result<T, error::Error>;

/// Lineup position of a rostered fantasy player.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, FromStr, Serialize, Deserialize,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
    K,
    Dst,
}

impl Position {
    /// Positions eligible for the flex slot.
    pub fn is_flex_eligible(self) -> bool {
        matches!(self, Position::Rb | Position::Wr | Position::Te)
    }
}

pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let mut file = std::fs::File::open(path)?;
    let df = ParquetReader::new(&mut file).finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_uppercase() {
        assert_eq!("QB".parse::<Position>().unwrap(), Position::Qb);
        assert_eq!("DST".parse::<Position>().unwrap(), Position::Dst);
        assert_eq!(Position::Te.to_string(), "TE");
        assert!("qb".parse::<Position>().is_err());
    }

    #[test]
    fn flex_eligibility() {
        assert!(Position::Rb.is_flex_eligible());
        assert!(Position::Te.is_flex_eligible());
        assert!(!Position::Qb.is_flex_eligible());
        assert!(!Position::K.is_flex_eligible());
    }
}
