use crate::{error::Error, filter, Result};
use derive_deref::Deref;
use parse_display::Display;
use polars::prelude::*;
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[display(style = "lowercase")]
pub enum PlayType {
    Pass,
    Run,
    Other,
}

impl PlayType {
    /// Anything that isn't a pass or a run (kickoffs, punts, penalties, nulls) is `Other`.
    pub fn classify(play_type: Option<&str>) -> Self {
        match play_type {
            Some("pass") => PlayType::Pass,
            Some("run") => PlayType::Run,
            _ => PlayType::Other,
        }
    }
}

/// Identity of a player in one role on a play.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    fn from_columns(id: Option<String>, name: Option<String>) -> Option<Self> {
        Some(Self { id: id?, name: name? })
    }
}

/// One snap of play-by-play data.
#[derive(Clone, Debug, PartialEq)]
pub struct Play {
    pub play_type: PlayType,
    pub posteam: Option<String>,
    pub defteam: Option<String>,
    pub week: u32,
    pub epa: Option<f64>,
    pub success: Option<f64>,
    pub cpoe: Option<f64>,
    pub xyac_epa: Option<f64>,
    pub passer: Option<PlayerRef>,
    pub rusher: Option<PlayerRef>,
    pub receiver: Option<PlayerRef>,
}

impl Play {
    /// A play of the given type with every optional field empty.
    pub fn new(play_type: PlayType, week: u32) -> Self {
        Self {
            play_type,
            posteam: None,
            defteam: None,
            week,
            epa: None,
            success: None,
            cpoe: None,
            xyac_epa: None,
            passer: None,
            rusher: None,
            receiver: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.play_type == PlayType::Pass
    }

    pub fn is_run(&self) -> bool {
        self.play_type == PlayType::Run
    }
}

/// Columns `PbpDf::plays` reads.
pub const PLAY_COLUMNS: [&str; 14] = [
    "play_type",
    "posteam",
    "defteam",
    "week",
    "epa",
    "success",
    "cpoe",
    "xyac_epa",
    "passer_player_id",
    "passer_player_name",
    "rusher_player_id",
    "rusher_player_name",
    "receiver_player_id",
    "receiver_player_name",
];

#[derive(Clone, Debug, Deref)]
pub struct PbpDf(DataFrame);

impl PbpDf {
    pub fn new(df: DataFrame) -> Self {
        PbpDf(df)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Ok(PbpDf(df))
    }

    pub fn filter(self, filter: Expr) -> Result<Self> {
        let df = self.0.lazy().filter(filter).collect()?;
        Ok(PbpDf(df))
    }

    /// Keeps the plays matching a SQL predicate, e.g. `posteam <> 'KC'`.
    pub fn filter_sql(self, predicate: &str) -> Result<Self> {
        let df = filter::filter_sql(self.0.lazy(), predicate)?.collect()?;
        log::debug!("{} plays match `{}`", df.height(), predicate);
        Ok(PbpDf(df))
    }

    pub fn max_week(&self) -> Result<Option<u32>> {
        Ok(int_column(&self.0, "week")?.into_iter().flatten().max())
    }

    /// Converts the frame into typed play records.
    pub fn plays(&self) -> Result<Vec<Play>> {
        log::trace!("pbp::plays");
        let df = &self.0;

        let play_type = str_column(df, "play_type")?;
        let posteam = str_column(df, "posteam")?;
        let defteam = str_column(df, "defteam")?;
        let week = int_column(df, "week")?;
        let epa = f64_column(df, "epa")?;
        let success = f64_column(df, "success")?;
        let cpoe = f64_column(df, "cpoe")?;
        let xyac_epa = f64_column(df, "xyac_epa")?;
        let passer_id = str_column(df, "passer_player_id")?;
        let passer_name = str_column(df, "passer_player_name")?;
        let rusher_id = str_column(df, "rusher_player_id")?;
        let rusher_name = str_column(df, "rusher_player_name")?;
        let receiver_id = str_column(df, "receiver_player_id")?;
        let receiver_name = str_column(df, "receiver_player_name")?;

        let mut plays = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let week = week[row].ok_or(Error::MissingValue {
                column: "week",
                row,
            })?;
            plays.push(Play {
                play_type: PlayType::classify(play_type[row].as_deref()),
                posteam: posteam[row].clone(),
                defteam: defteam[row].clone(),
                week,
                epa: epa[row],
                success: success[row],
                cpoe: cpoe[row],
                xyac_epa: xyac_epa[row],
                passer: PlayerRef::from_columns(passer_id[row].clone(), passer_name[row].clone()),
                rusher: PlayerRef::from_columns(rusher_id[row].clone(), rusher_name[row].clone()),
                receiver: PlayerRef::from_columns(
                    receiver_id[row].clone(),
                    receiver_name[row].clone(),
                ),
            });
        }
        log::debug!("{} plays converted", plays.len());
        Ok(plays)
    }
}

pub(crate) fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::String)?;
    let values = series.str()?.into_iter().map(|v| v.map(str::to_owned)).collect();
    Ok(values)
}

/// Float column; `NaN` reads as null.
pub(crate) fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| !v.is_nan()))
        .collect();
    Ok(values)
}

/// Integer column as `u32`; negative values read as null.
pub(crate) fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<u32>>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    let values = series
        .i64()?
        .into_iter()
        .map(|v| v.and_then(|v| u32::try_from(v).ok()))
        .collect();
    Ok(values)
}

#[derive(Clone)]
pub struct PbpFilter {
    filter_expr: Option<Expr>,
}

impl PbpFilter {
    pub fn new() -> Self {
        Self { filter_expr: None }
    }

    /// Keeps plays where `team` has the ball.
    pub fn team(mut self, team: &str) -> Self {
        let expr = col("posteam").eq(lit(team));
        self.extend_filter(expr)
    }

    /// Keeps weeks `start..=end`.
    pub fn week_range(mut self, start: u32, end: u32) -> Self {
        let expr = col("week").is_between(lit(start), lit(end), ClosedInterval::Both);
        self.extend_filter(expr)
    }

    // Combines the current filter with a new one using AND logic
    fn extend_filter(&mut self, new_expr: Expr) -> Self {
        self.filter_expr = match self.filter_expr.take() {
            Some(existing_expr) => Some(existing_expr.and(new_expr)),
            None => Some(new_expr),
        };
        self.clone()
    }

    // Builds the final filter expression
    pub fn build(self) -> Expr {
        self.filter_expr.unwrap_or_else(|| lit(true))
    }
}

impl Default for PbpFilter {
    fn default() -> Self {
        Self::new()
    }
}
