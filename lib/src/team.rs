use crate::pbp::Play;
use crate::stats;
use itertools::Itertools;
use std::collections::BTreeMap;

const OFFENSE_WEIGHT: f64 = 0.6;
const DEFENSE_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamAggregate {
    pub team: String,
    /// Mean EPA per play on offense.
    pub off_epa: Option<f64>,
    /// Mean EPA per play allowed on defense; lower is better.
    pub def_epa: Option<f64>,
    pub off_z: Option<f64>,
    pub def_z: Option<f64>,
    pub prediction_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRankings {
    /// Best first.
    pub teams: Vec<TeamAggregate>,
}

impl TeamRankings {
    /// The predicted champion, if any team has a defined score.
    pub fn champion(&self) -> Option<&TeamAggregate> {
        self.teams.first().filter(|t| t.prediction_score.is_some())
    }

    pub fn top(&self, n: usize) -> Vec<&TeamAggregate> {
        self.teams
            .iter()
            .filter(|t| t.prediction_score.is_some())
            .take(n)
            .collect()
    }
}

fn mean_epa_by<'a>(
    plays: &'a [Play],
    team: impl Fn(&'a Play) -> Option<&'a String>,
) -> BTreeMap<&'a str, Option<f64>> {
    plays
        .iter()
        .filter_map(|play| team(play).map(|t| (t.as_str(), play.epa)))
        .into_group_map()
        .into_iter()
        .map(|(team, epa)| (team, stats::mean(epa)))
        .collect()
}

/// Scores every team over all plays, regardless of play type.
///
/// Teams seen on only one side of the ball are dropped.
pub fn score_teams(plays: &[Play]) -> TeamRankings {
    log::trace!("team::score_teams");

    let offense = mean_epa_by(plays, |play| play.posteam.as_ref());
    let defense = mean_epa_by(plays, |play| play.defteam.as_ref());

    let mut teams = offense
        .iter()
        .filter_map(|(team, off_epa)| {
            defense.get(team).map(|def_epa| TeamAggregate {
                team: team.to_string(),
                off_epa: *off_epa,
                def_epa: *def_epa,
                off_z: None,
                def_z: None,
                prediction_score: None,
            })
        })
        .collect_vec();
    log::debug!(
        "{} teams on offense, {} on defense, {} on both",
        offense.len(),
        defense.len(),
        teams.len()
    );

    let off_z = stats::zscores(&teams.iter().map(|t| t.off_epa).collect_vec());
    let def_z = stats::zscores(&teams.iter().map(|t| t.def_epa).collect_vec());
    for ((team, off_z), def_z) in teams.iter_mut().zip(off_z).zip(def_z) {
        team.off_z = off_z;
        team.def_z = def_z;
        team.prediction_score =
            stats::weighted(&[(OFFENSE_WEIGHT, off_z), (DEFENSE_WEIGHT, def_z.map(|z| -z))]);
    }

    // Stable sort over alphabetical input: ties stay in abbreviation order.
    teams.sort_by(|a, b| stats::cmp_score_desc(a.prediction_score, b.prediction_score));
    TeamRankings { teams }
}
