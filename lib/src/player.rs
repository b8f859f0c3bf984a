//! Ranks individual players by a composite "impressiveness" score.
//!
//! Each role is scored independently: plays are grouped by the player filling
//! the role, groups under the role's minimum sample are dropped, and the
//! remaining group is z-scored and combined with fixed weights:
//!
//! | Position | Plays  | Min | Score                          |
//! |----------|--------|-----|--------------------------------|
//! | QB       | passes | 100 | 0.6 z(EPA) + 0.4 z(CPOE)       |
//! | RB       | runs   | 50  | 0.5 z(EPA) + 0.5 z(success)    |
//! | WR/TE    | passes | 30  | 0.6 z(EPA) + 0.4 z(xYAC EPA)   |

use crate::pbp::{Play, PlayerRef};
use crate::stats;
use itertools::Itertools;
use parse_display::Display;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum RoleGroup {
    #[display("QB")]
    Qb,
    #[display("RB")]
    Rb,
    #[display("WR/TE")]
    Receiver,
}

/// Minimum plays a player needs in a role before being scored in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerThresholds {
    pub qb: usize,
    pub rb: usize,
    pub receiver: usize,
}

impl Default for PlayerThresholds {
    fn default() -> Self {
        Self {
            qb: 100,
            rb: 50,
            receiver: 30,
        }
    }
}

/// One player's season in one role.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAggregate {
    pub player: PlayerRef,
    pub position: RoleGroup,
    /// First offense observed; a mid-window trade is not tracked.
    pub team: Option<String>,
    pub plays: usize,
    pub epa: Option<f64>,
    /// CPOE, success rate or xYAC EPA depending on the role.
    pub secondary: Option<f64>,
    pub epa_z: Option<f64>,
    pub secondary_z: Option<f64>,
    pub impressiveness_score: Option<f64>,
}

impl PlayerAggregate {
    pub fn player_name(&self) -> &str {
        &self.player.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRankings {
    pub qbs: Vec<PlayerAggregate>,
    pub rbs: Vec<PlayerAggregate>,
    pub receivers: Vec<PlayerAggregate>,
    /// Every scored row across roles, best first.
    pub all: Vec<PlayerAggregate>,
}

impl PlayerRankings {
    /// The `n` best players with a defined score.
    pub fn top(&self, n: usize) -> Vec<&PlayerAggregate> {
        self.all
            .iter()
            .filter(|p| p.impressiveness_score.is_some())
            .take(n)
            .collect()
    }
}

struct RoleScoring {
    position: RoleGroup,
    min_plays: usize,
    epa_weight: f64,
    secondary_weight: f64,
    eligible: fn(&Play) -> bool,
    player: fn(&Play) -> Option<&PlayerRef>,
    secondary: fn(&Play) -> Option<f64>,
    /// Treat a missing secondary average as zero so the player stays in the population.
    zero_fill_secondary: bool,
}

#[derive(Default)]
struct Accumulator {
    team: Option<String>,
    plays: usize,
    epa: Vec<Option<f64>>,
    secondary: Vec<Option<f64>>,
}

fn passer(play: &Play) -> Option<&PlayerRef> {
    play.passer.as_ref()
}

fn rusher(play: &Play) -> Option<&PlayerRef> {
    play.rusher.as_ref()
}

fn receiver(play: &Play) -> Option<&PlayerRef> {
    play.receiver.as_ref()
}

fn cpoe(play: &Play) -> Option<f64> {
    play.cpoe
}

fn success(play: &Play) -> Option<f64> {
    play.success
}

fn xyac_epa(play: &Play) -> Option<f64> {
    play.xyac_epa
}

impl RoleScoring {
    fn qb(min_plays: usize) -> Self {
        Self {
            position: RoleGroup::Qb,
            min_plays,
            epa_weight: 0.6,
            secondary_weight: 0.4,
            eligible: Play::is_pass,
            player: passer,
            secondary: cpoe,
            zero_fill_secondary: false,
        }
    }

    fn rb(min_plays: usize) -> Self {
        Self {
            position: RoleGroup::Rb,
            min_plays,
            epa_weight: 0.5,
            secondary_weight: 0.5,
            eligible: Play::is_run,
            player: rusher,
            secondary: success,
            zero_fill_secondary: false,
        }
    }

    fn receiver(min_plays: usize) -> Self {
        Self {
            position: RoleGroup::Receiver,
            min_plays,
            epa_weight: 0.6,
            secondary_weight: 0.4,
            eligible: Play::is_pass,
            player: receiver,
            secondary: xyac_epa,
            zero_fill_secondary: true,
        }
    }

    fn score(&self, plays: &[Play]) -> Vec<PlayerAggregate> {
        let mut groups: BTreeMap<&PlayerRef, Accumulator> = BTreeMap::new();
        for play in plays.iter().filter(|play| (self.eligible)(play)) {
            let Some(player) = (self.player)(play) else {
                continue;
            };
            let acc = groups.entry(player).or_default();
            if acc.team.is_none() {
                acc.team = play.posteam.clone();
            }
            acc.plays += 1;
            acc.epa.push(play.epa);
            acc.secondary.push((self.secondary)(play));
        }
        let total = groups.len();

        let mut rows: Vec<PlayerAggregate> = groups
            .into_iter()
            .filter(|(_, acc)| acc.plays >= self.min_plays)
            .map(|(player, acc)| {
                let secondary = stats::mean(acc.secondary);
                PlayerAggregate {
                    player: player.clone(),
                    position: self.position,
                    team: acc.team,
                    plays: acc.plays,
                    epa: stats::mean(acc.epa),
                    secondary: if self.zero_fill_secondary {
                        Some(secondary.unwrap_or(0.0))
                    } else {
                        secondary
                    },
                    epa_z: None,
                    secondary_z: None,
                    impressiveness_score: None,
                }
            })
            .collect();
        log::debug!(
            "{}: {} of {} players meet the {} play minimum",
            self.position,
            rows.len(),
            total,
            self.min_plays
        );

        let epa_z = stats::zscores(&rows.iter().map(|r| r.epa).collect_vec());
        let secondary_z = stats::zscores(&rows.iter().map(|r| r.secondary).collect_vec());
        for ((row, epa_z), secondary_z) in rows.iter_mut().zip(epa_z).zip(secondary_z) {
            row.epa_z = epa_z;
            row.secondary_z = secondary_z;
            row.impressiveness_score = stats::weighted(&[
                (self.epa_weight, epa_z),
                (self.secondary_weight, secondary_z),
            ]);
        }
        rows
    }
}

/// Best first; ties go to the larger sample, then to the player name.
fn rank(rows: &mut [PlayerAggregate]) {
    rows.sort_by(|a, b| {
        stats::cmp_score_desc(a.impressiveness_score, b.impressiveness_score)
            .then_with(|| b.plays.cmp(&a.plays))
            .then_with(|| a.player.name.cmp(&b.player.name))
    });
}

/// Scores every passer, rusher and receiver in `plays`.
///
/// A player filling several roles gets one independent row per role.
pub fn score_players(plays: &[Play], thresholds: &PlayerThresholds) -> PlayerRankings {
    log::trace!("player::score_players");

    let mut qbs = RoleScoring::qb(thresholds.qb).score(plays);
    let mut rbs = RoleScoring::rb(thresholds.rb).score(plays);
    let mut receivers = RoleScoring::receiver(thresholds.receiver).score(plays);
    rank(&mut qbs);
    rank(&mut rbs);
    rank(&mut receivers);

    let mut all = qbs
        .iter()
        .chain(&rbs)
        .chain(&receivers)
        .cloned()
        .collect_vec();
    rank(&mut all);

    PlayerRankings {
        qbs,
        rbs,
        receivers,
        all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbp::PlayType;

    fn pass(passer: &str, epa: f64, cpoe: f64) -> Play {
        let mut play = Play::new(PlayType::Pass, 1);
        play.posteam = Some("KC".into());
        play.defteam = Some("BUF".into());
        play.passer = Some(PlayerRef::new(format!("id-{passer}"), passer));
        play.epa = Some(epa);
        play.cpoe = Some(cpoe);
        play
    }

    fn target(receiver: &str, epa: f64, xyac_epa: Option<f64>) -> Play {
        let mut play = Play::new(PlayType::Pass, 1);
        play.posteam = Some("SF".into());
        play.receiver = Some(PlayerRef::new(format!("id-{receiver}"), receiver));
        play.epa = Some(epa);
        play.xyac_epa = xyac_epa;
        play
    }

    fn rush(rusher: &str, epa: f64, success: f64) -> Play {
        let mut play = Play::new(PlayType::Run, 1);
        play.posteam = Some("DET".into());
        play.rusher = Some(PlayerRef::new(format!("id-{rusher}"), rusher));
        play.epa = Some(epa);
        play.success = Some(success);
        play
    }

    fn repeat(play: Play, n: usize) -> Vec<Play> {
        vec![play; n]
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map_or(false, |a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn qb_composite_matches_league_standardization() {
        let mut plays = repeat(pass("P.Mahomes", 0.25, 5.0), 150);
        plays.extend(repeat(pass("J.Allen", -0.05, -1.0), 150));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        assert_eq!(rankings.qbs.len(), 2);

        let best = &rankings.qbs[0];
        assert_eq!(best.player_name(), "P.Mahomes");
        assert_eq!(best.position, RoleGroup::Qb);
        assert_eq!(best.team.as_deref(), Some("KC"));
        assert_eq!(best.plays, 150);
        assert!(close(best.epa_z, 1.0));
        assert!(close(best.secondary_z, 1.0));
        assert!(close(best.impressiveness_score, 1.0));
        assert!(close(rankings.qbs[1].impressiveness_score, -1.0));
    }

    #[test]
    fn players_below_threshold_are_excluded_before_standardizing() {
        let mut plays = repeat(pass("P.Mahomes", 0.25, 5.0), 100);
        plays.extend(repeat(pass("J.Allen", -0.05, -1.0), 120));
        plays.extend(repeat(pass("Backup", 3.0, 40.0), 99));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        let names = rankings.qbs.iter().map(|p| p.player_name()).collect_vec();
        assert_eq!(names, vec!["P.Mahomes", "J.Allen"]);
        assert!(close(rankings.qbs[0].impressiveness_score, 1.0));
        assert!(rankings.all.iter().all(|p| p.player_name() != "Backup"));
    }

    #[test]
    fn missing_xyac_counts_as_zero() {
        let mut plays = repeat(target("A.Nobody", 0.1, None), 30);
        plays.extend(repeat(target("B.Some", 0.2, Some(1.0)), 30));
        plays.extend(repeat(target("C.Lots", 0.3, Some(2.0)), 30));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        assert_eq!(rankings.receivers.len(), 3);
        let nobody = rankings
            .receivers
            .iter()
            .find(|p| p.player_name() == "A.Nobody")
            .unwrap();
        assert_eq!(nobody.position, RoleGroup::Receiver);
        assert_eq!(nobody.secondary, Some(0.0));
        assert!(close(nobody.secondary_z, -(1.5f64).sqrt()));
        assert_eq!(rankings.receivers[0].player_name(), "C.Lots");
    }

    #[test]
    fn single_qualifier_has_undefined_score() {
        let plays = repeat(rush("C.McCaffrey", 0.1, 1.0), 60);
        let rankings = score_players(&plays, &PlayerThresholds::default());

        assert_eq!(rankings.rbs.len(), 1);
        assert_eq!(rankings.rbs[0].impressiveness_score, None);
        assert_eq!(rankings.all.len(), 1);
        assert!(rankings.top(DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn multi_role_players_get_a_row_per_role() {
        let mut plays = repeat(pass("L.Jackson", 0.3, 4.0), 100);
        plays.extend(repeat(pass("Other", 0.0, 0.0), 100));
        plays.extend(repeat(rush("L.Jackson", 0.4, 1.0), 50));
        plays.extend(repeat(rush("RB2", 0.0, 0.0), 50));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        let jackson = rankings
            .all
            .iter()
            .filter(|p| p.player_name() == "L.Jackson")
            .map(|p| p.position)
            .sorted()
            .collect_vec();
        assert_eq!(jackson, vec![RoleGroup::Qb, RoleGroup::Rb]);
    }

    #[test]
    fn non_scrimmage_plays_are_ignored() {
        let mut plays = repeat(pass("P.Mahomes", 0.25, 5.0), 150);
        let mut kick = pass("P.Mahomes", 10.0, 50.0);
        kick.play_type = PlayType::Other;
        plays.extend(repeat(kick, 20));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        assert_eq!(rankings.qbs[0].plays, 150);
        assert!(close(rankings.qbs[0].epa, 0.25));
    }

    #[test]
    fn ranking_is_sorted_and_deterministic() {
        let mut plays = repeat(pass("P.Mahomes", 0.25, 5.0), 150);
        plays.extend(repeat(pass("J.Allen", -0.05, -1.0), 150));
        plays.extend(repeat(rush("D.Henry", 0.2, 0.6), 80));
        plays.extend(repeat(rush("S.Barkley", 0.1, 0.4), 60));
        plays.extend(repeat(target("J.Chase", 0.4, Some(0.3)), 40));
        plays.extend(repeat(target("T.Kelce", 0.1, None), 35));

        let thresholds = PlayerThresholds::default();
        let first = score_players(&plays, &thresholds);
        let second = score_players(&plays, &thresholds);
        assert_eq!(first, second);

        assert_eq!(first.all.len(), 6);
        let scores = first.all.iter().map(|p| p.impressiveness_score.unwrap()).collect_vec();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(first.top(3).len(), 3);
    }

    #[test]
    fn ties_prefer_larger_samples() {
        let mut plays = repeat(rush("Small", 0.5, 1.0), 50);
        plays.extend(repeat(rush("Large", 0.5, 1.0), 70));
        plays.extend(repeat(rush("Low", 0.0, 0.0), 50));

        let rankings = score_players(&plays, &PlayerThresholds::default());
        let names = rankings.rbs.iter().map(|p| p.player_name()).collect_vec();
        assert_eq!(names, vec!["Large", "Small", "Low"]);
    }
}
