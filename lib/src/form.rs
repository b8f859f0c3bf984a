//! Recent form of a fixed fantasy lineup, adjusted for an upcoming matchup.
//!
//! Unlike the season rankings, nothing here is z-scored: a player's average EPA
//! over the trailing window is blended with the raw EPA per play the opponent's
//! defense allows to the player's position.

use crate::pbp::{Play, PlayerRef};
use crate::schedule::{self, Game, Opponent};
use crate::{stats, Position, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_WEEKS: u32 = 5;
pub const DEFAULT_MATCHUP_WEEK: u32 = 17;
pub const FLEX_SIZE: usize = 5;

const FORM_WEIGHT: f64 = 0.7;
const MATCHUP_WEIGHT: f64 = 0.3;

fn default_weeks() -> u32 {
    DEFAULT_WEEKS
}

fn default_matchup_week() -> u32 {
    DEFAULT_MATCHUP_WEEK
}

/// The lineup to evaluate and the window to evaluate it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Player names as they appear in play-by-play data (e.g. `B.Purdy`), by position.
    pub lineup: BTreeMap<Position, Vec<String>>,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
    #[serde(default = "default_matchup_week")]
    pub matchup_week: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        let lineup = [
            (Position::Qb, vec!["B.Purdy"]),
            (
                Position::Rb,
                vec!["C.McCaffrey", "A.Jeanty", "T.Henderson", "T.Tracy"],
            ),
            (Position::Wr, vec!["J.Smith-Njigba", "C.Olave"]),
            (Position::Te, vec!["T.McBride"]),
            (Position::K, vec!["C.Santos"]),
            (Position::Dst, vec!["Buf"]),
        ]
        .into_iter()
        .map(|(pos, names)| (pos, names.into_iter().map(String::from).collect()))
        .collect();

        Self {
            lineup,
            weeks: DEFAULT_WEEKS,
            matchup_week: DEFAULT_MATCHUP_WEEK,
        }
    }
}

impl FormConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    /// Every rostered player with their position, in lineup order.
    /// A name listed more than once keeps only its first position.
    pub fn players(&self) -> impl Iterator<Item = (&str, Position)> {
        self.lineup
            .iter()
            .flat_map(|(pos, names)| names.iter().map(move |name| (name.as_str(), *pos)))
            .unique_by(|(name, _)| *name)
    }
}

/// Inclusive range of weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: u32,
    pub end: u32,
}

impl WeekWindow {
    /// The last `weeks` weeks up to and including `current_week`, clamped at week 1.
    pub fn trailing(current_week: u32, weeks: u32) -> Self {
        let start = (current_week + 1).saturating_sub(weeks).max(1);
        Self {
            start,
            end: current_week,
        }
    }

    pub fn contains(&self, week: u32) -> bool {
        (self.start..=self.end).contains(&week)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormScore {
    pub player: String,
    pub position: Position,
    pub team: Option<String>,
    pub opponent: Opponent,
    pub avg_epa: Option<f64>,
    pub success_rate: Option<f64>,
    /// Passes thrown, rushes and targets in the window.
    pub usage_count: usize,
    pub def_epa_allowed: Option<f64>,
    pub composite_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormReport {
    /// `None` when there were no plays to take a current week from.
    pub window: Option<WeekWindow>,
    pub matchup_week: u32,
    /// Best first; undefined scores last.
    pub scores: Vec<FormScore>,
    /// Lineup players with no plays in the window.
    pub skipped: Vec<String>,
}

impl FormReport {
    pub fn by_position(&self, position: Position) -> Vec<&FormScore> {
        self.scores
            .iter()
            .filter(|s| s.position == position)
            .collect()
    }

    /// The best `n` scored RB, WR and TE options.
    pub fn flex(&self, n: usize) -> Vec<&FormScore> {
        self.scores
            .iter()
            .filter(|s| s.position.is_flex_eligible() && s.composite_score.is_some())
            .take(n)
            .collect()
    }
}

/// Mean EPA per play `opponent`'s defense allows, over the play type that
/// matters to `position`. Positions without a relevant play type score zero.
pub fn matchup_difficulty(plays: &[Play], opponent: &Opponent, position: Position) -> Option<f64> {
    let opponent = opponent.team()?;
    let relevant: fn(&Play) -> bool = match position {
        Position::Qb | Position::Wr | Position::Te => Play::is_pass,
        Position::Rb => Play::is_run,
        Position::Flex | Position::K | Position::Dst => return Some(0.0),
    };
    stats::mean(
        plays
            .iter()
            .filter(|play| play.defteam.as_deref() == Some(opponent) && relevant(play))
            .map(|play| play.epa),
    )
}

/// Plays `name` was involved in: passes thrown, then rushes, then targets.
fn involvement<'a>(plays: &[&'a Play], name: &str) -> Vec<&'a Play> {
    let named = |role: &Option<PlayerRef>| role.as_ref().is_some_and(|p| p.name == name);
    let passes = plays.iter().filter(|p| p.is_pass() && named(&p.passer));
    let rushes = plays.iter().filter(|p| p.is_run() && named(&p.rusher));
    let targets = plays.iter().filter(|p| p.is_pass() && named(&p.receiver));
    passes.chain(rushes).chain(targets).copied().collect()
}

/// Scores each lineup player on their trailing-window form and their
/// `config.matchup_week` matchup.
///
/// Matchup difficulty is measured over every play in `plays`, not just the window.
pub fn score_recent_form(plays: &[Play], games: &[Game], config: &FormConfig) -> FormReport {
    log::trace!("form::score_recent_form");

    let window = plays
        .iter()
        .map(|play| play.week)
        .max()
        .map(|current| WeekWindow::trailing(current, config.weeks));
    let recent: Vec<&Play> = match window {
        Some(window) => {
            log::info!("Analyzing form from week {} to {}", window.start, window.end);
            plays.iter().filter(|p| window.contains(p.week)).collect()
        }
        None => Vec::new(),
    };

    let mut scores = Vec::new();
    let mut skipped = Vec::new();
    for (name, position) in config.players() {
        let involved = involvement(&recent, name);
        if involved.is_empty() {
            log::warn!("No recent data for {}", name);
            skipped.push(name.to_owned());
            continue;
        }

        let team = involved.iter().find_map(|p| p.posteam.clone());
        let opponent = match team.as_deref() {
            Some(team) => schedule::opponent(games, team, config.matchup_week),
            None => Opponent::Bye,
        };
        if opponent == Opponent::Bye {
            log::warn!(
                "{} ({}) has no week {} opponent",
                name,
                team.as_deref().unwrap_or("no team"),
                config.matchup_week
            );
        }

        let avg_epa = stats::mean(involved.iter().map(|p| p.epa));
        let def_epa_allowed = matchup_difficulty(plays, &opponent, position);
        scores.push(FormScore {
            player: name.to_owned(),
            position,
            team,
            opponent,
            avg_epa,
            success_rate: stats::mean(involved.iter().map(|p| p.success)),
            usage_count: involved.len(),
            def_epa_allowed,
            composite_score: stats::weighted(&[
                (FORM_WEIGHT, avg_epa),
                (MATCHUP_WEIGHT, def_epa_allowed),
            ]),
        });
    }
    log::debug!("{} lineup players scored, {} skipped", scores.len(), skipped.len());

    // Stable: equal scores keep lineup order.
    scores.sort_by(|a, b| stats::cmp_score_desc(a.composite_score, b.composite_score));
    FormReport {
        window,
        matchup_week: config.matchup_week,
        scores,
        skipped,
    }
}
