//! Sources of play-by-play, schedule and roster tables.

use crate::{
    error::Error,
    pbp::{PbpDf, PLAY_COLUMNS},
    roster::RosterDf,
    schedule::ScheduleDf,
    Result,
};
use polars::prelude::*;
use std::path::{Path, PathBuf};

pub trait DataProvider {
    fn fetch_plays(&self, years: &[u16]) -> Result<PbpDf>;
    fn fetch_schedule(&self, years: &[u16]) -> Result<ScheduleDf>;
    fn fetch_rosters(&self, years: &[u16]) -> Result<RosterDf>;
}

/// Reads nflverse-style parquet exports: `pbp_{year}.parquet`,
/// `schedules_{year}.parquet` and `rosters_{year}.parquet` in one directory.
#[derive(Clone, Debug)]
pub struct ParquetProvider {
    data_dir: PathBuf,
}

impl ParquetProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, kind: &str, year: u16) -> PathBuf {
        self.data_dir.join(format!("{}_{}.parquet", kind, year))
    }

    /// Loads and stacks one file per year, keeping only `columns` when given.
    /// Any failure, or no rows at all, is `DataUnavailable`.
    fn load_years(&self, kind: &str, years: &[u16], columns: Option<&[&str]>) -> Result<DataFrame> {
        let mut stacked: Option<DataFrame> = None;
        for &year in years {
            let path = self.path(kind, year);
            log::info!("Loading {} for {} from {}", kind, year, path.display());
            let unavailable =
                |e: Error| Error::DataUnavailable(format!("{} ({}): {}", kind, path.display(), e));

            let mut df = crate::load_parquet(&path).map_err(unavailable)?;
            if let Some(columns) = columns {
                df = df
                    .select(columns.iter().copied())
                    .map_err(|e| unavailable(e.into()))?;
            }
            match stacked.as_mut() {
                Some(acc) => {
                    acc.vstack_mut(&df).map_err(|e| unavailable(e.into()))?;
                }
                None => stacked = Some(df),
            }
        }

        match stacked {
            Some(df) if df.height() > 0 => {
                log::debug!("{} {} rows loaded", df.height(), kind);
                Ok(df)
            }
            _ => Err(Error::DataUnavailable(format!(
                "no {} rows for years {:?}",
                kind, years
            ))),
        }
    }
}

impl DataProvider for ParquetProvider {
    fn fetch_plays(&self, years: &[u16]) -> Result<PbpDf> {
        Ok(PbpDf::new(self.load_years("pbp", years, Some(&PLAY_COLUMNS[..]))?))
    }

    fn fetch_schedule(&self, years: &[u16]) -> Result<ScheduleDf> {
        Ok(ScheduleDf::new(self.load_years("schedules", years, None)?))
    }

    fn fetch_rosters(&self, years: &[u16]) -> Result<RosterDf> {
        Ok(RosterDf::new(self.load_years("rosters", years, None)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbp::tests::sample_frame;

    fn write_parquet(dir: &Path, name: &str, df: &mut DataFrame) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        ParquetWriter::new(&mut file).finish(df).unwrap();
    }

    #[test]
    fn stacks_multiple_years() {
        let dir = tempfile::tempdir().unwrap();
        write_parquet(dir.path(), "pbp_2023.parquet", &mut sample_frame());
        write_parquet(dir.path(), "pbp_2024.parquet", &mut sample_frame());

        let provider = ParquetProvider::new(dir.path());
        let pbp = provider.fetch_plays(&[2023, 2024]).unwrap();
        assert_eq!(pbp.height(), 8);
        assert_eq!(pbp.plays().unwrap().len(), 8);
    }

    #[test]
    fn stacks_years_with_different_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut wide = sample_frame();
        wide.with_column(Series::new("desc", &["a", "b", "c", "d"]))
            .unwrap();
        write_parquet(dir.path(), "pbp_2023.parquet", &mut wide);
        write_parquet(dir.path(), "pbp_2024.parquet", &mut sample_frame());

        let pbp = ParquetProvider::new(dir.path())
            .fetch_plays(&[2023, 2024])
            .unwrap();
        assert_eq!(pbp.height(), 8);
        assert_eq!(pbp.width(), PLAY_COLUMNS.len());
    }

    #[test]
    fn mismatched_years_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut text_epa = sample_frame();
        text_epa
            .with_column(Series::new("epa", &["0.5", "-0.2", "", "0.0"]))
            .unwrap();
        write_parquet(dir.path(), "pbp_2023.parquet", &mut text_epa);
        write_parquet(dir.path(), "pbp_2024.parquet", &mut sample_frame());

        let err = ParquetProvider::new(dir.path())
            .fetch_plays(&[2023, 2024])
            .unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ParquetProvider::new(dir.path());
        let err = provider.fetch_schedule(&[2025]).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn empty_table_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut empty = sample_frame().head(Some(0));
        write_parquet(dir.path(), "pbp_2024.parquet", &mut empty);

        let provider = ParquetProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_plays(&[2024]),
            Err(Error::DataUnavailable(_))
        ));
        assert!(matches!(
            provider.fetch_rosters(&[]),
            Err(Error::DataUnavailable(_))
        ));
    }

    #[test]
    fn loads_rosters() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = df!("gsis_id" => &["00-1"], "team" => &["KC"]).unwrap();
        write_parquet(dir.path(), "rosters_2024.parquet", &mut df);

        let roster = ParquetProvider::new(dir.path()).fetch_rosters(&[2024]).unwrap();
        assert_eq!(roster.height(), 1);
    }
}
