use crate::{error::Error, pbp, Result};
use derive_deref::Deref;
use parse_display::Display;
use polars::prelude::*;
use std::path::Path;

/// A scheduled game between two teams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
}

impl Game {
    pub fn new(week: u32, home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            week,
            home_team: home_team.into(),
            away_team: away_team.into(),
        }
    }

    /// The other side of this game, if `team` plays in it.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.home_team == team {
            Some(&self.away_team)
        } else if self.away_team == team {
            Some(&self.home_team)
        } else {
            None
        }
    }
}

/// Who a team faces in a given week.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum Opponent {
    #[display("{0}")]
    Team(String),
    #[display("BYE")]
    Bye,
}

impl Opponent {
    pub fn team(&self) -> Option<&str> {
        match self {
            Opponent::Team(team) => Some(team),
            Opponent::Bye => None,
        }
    }
}

/// Looks up `team`'s opponent in `week`; the first matching game wins.
pub fn opponent(games: &[Game], team: &str, week: u32) -> Opponent {
    games
        .iter()
        .filter(|game| game.week == week)
        .find_map(|game| game.opponent_of(team))
        .map(|opp| Opponent::Team(opp.to_owned()))
        .unwrap_or(Opponent::Bye)
}

#[derive(Clone, Debug, Deref)]
pub struct ScheduleDf(DataFrame);

impl ScheduleDf {
    pub fn new(df: DataFrame) -> Self {
        ScheduleDf(df)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Ok(ScheduleDf(df))
    }

    pub fn games(&self) -> Result<Vec<Game>> {
        let df = &self.0;
        let week = pbp::int_column(df, "week")?;
        let home = pbp::str_column(df, "home_team")?;
        let away = pbp::str_column(df, "away_team")?;

        let mut games = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            games.push(Game {
                week: week[row].ok_or(Error::MissingValue { column: "week", row })?,
                home_team: home[row].clone().ok_or(Error::MissingValue {
                    column: "home_team",
                    row,
                })?,
                away_team: away[row].clone().ok_or(Error::MissingValue {
                    column: "away_team",
                    row,
                })?,
            });
        }
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn games() -> Vec<Game> {
        vec![
            Game::new(16, "SF", "DET"),
            Game::new(17, "KC", "PIT"),
            Game::new(17, "DET", "SF"),
        ]
    }

    #[test]
    fn opponent_from_either_side() {
        assert_eq!(opponent(&games(), "SF", 17), Opponent::Team("DET".into()));
        assert_eq!(opponent(&games(), "KC", 17), Opponent::Team("PIT".into()));
        assert_eq!(opponent(&games(), "PIT", 17), Opponent::Team("KC".into()));
    }

    #[test]
    fn missing_game_is_a_bye() {
        let opp = opponent(&games(), "BUF", 17);
        assert_eq!(opp, Opponent::Bye);
        assert_eq!(opp.to_string(), "BYE");
        assert_eq!(opp.team(), None);
    }

    #[test]
    fn converts_frame_to_games() {
        let df = df!(
            "week" => &[17i32, 18],
            "home_team" => &["KC", "SF"],
            "away_team" => &["PIT", "ARI"]
        )
        .unwrap();
        let games = ScheduleDf::new(df).games().unwrap();
        assert_eq!(games, vec![Game::new(17, "KC", "PIT"), Game::new(18, "SF", "ARI")]);
    }
}
