//! Presentation of scorer output: console tables and the markdown report.

use crate::{
    error::Error,
    form::{FormReport, FormScore, FLEX_SIZE},
    player::PlayerAggregate,
    team::{TeamAggregate, TeamRankings},
    Position, Result,
};
use polars::prelude::*;
use std::fmt::Write;

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "N/A".to_string(),
    }
}

pub fn players_frame(players: &[&PlayerAggregate]) -> Result<DataFrame> {
    let df = df!(
        "player_name" => players.iter().map(|p| p.player.name.as_str()).collect::<Vec<_>>(),
        "position" => players.iter().map(|p| p.position.to_string()).collect::<Vec<_>>(),
        "team" => players.iter().map(|p| p.team.as_deref()).collect::<Vec<_>>(),
        "plays" => players.iter().map(|p| p.plays as u32).collect::<Vec<_>>(),
        "impressiveness_score" => players.iter().map(|p| p.impressiveness_score).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn teams_frame(rankings: &TeamRankings, n: usize) -> Result<DataFrame> {
    let teams = rankings.teams.iter().take(n).collect::<Vec<_>>();
    let df = df!(
        "team" => teams.iter().map(|t| t.team.as_str()).collect::<Vec<_>>(),
        "off_epa" => teams.iter().map(|t| t.off_epa).collect::<Vec<_>>(),
        "def_epa" => teams.iter().map(|t| t.def_epa).collect::<Vec<_>>(),
        "prediction_score" => teams.iter().map(|t| t.prediction_score).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn form_frame(scores: &[&FormScore]) -> Result<DataFrame> {
    let df = df!(
        "player" => scores.iter().map(|s| s.player.as_str()).collect::<Vec<_>>(),
        "position" => scores.iter().map(|s| s.position.to_string()).collect::<Vec<_>>(),
        "team" => scores.iter().map(|s| s.team.as_deref()).collect::<Vec<_>>(),
        "opponent" => scores.iter().map(|s| s.opponent.to_string()).collect::<Vec<_>>(),
        "form_epa" => scores.iter().map(|s| s.avg_epa).collect::<Vec<_>>(),
        "success_rate" => scores.iter().map(|s| s.success_rate).collect::<Vec<_>>(),
        "opp_epa_allowed" => scores.iter().map(|s| s.def_epa_allowed).collect::<Vec<_>>(),
        "composite_score" => scores.iter().map(|s| s.composite_score).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Markdown summary of the player and team rankings.
///
/// Fails with `DataUnavailable` when no team could be scored.
pub fn analysis_report(
    season: &str,
    top_players: &[&PlayerAggregate],
    teams: &TeamRankings,
) -> Result<String> {
    let champion = teams.champion().ok_or_else(|| {
        Error::DataUnavailable("no team has a defined prediction score".to_string())
    })?;

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, season, top_players, teams, champion);
    Ok(out)
}

fn write_report(
    out: &mut String,
    season: &str,
    top_players: &[&PlayerAggregate],
    teams: &TeamRankings,
    champion: &TeamAggregate,
) -> std::fmt::Result {
    writeln!(out, "# NFL {} Quantitative Analysis Report\n", season)?;

    writeln!(out, "## Top {} Most Impressive Players", top_players.len())?;
    writeln!(out, "This ranking is based on a composite score of advanced metrics:")?;
    writeln!(out, "- **QBs**: EPA/Play (60%) + CPOE (40%)")?;
    writeln!(out, "- **RBs**: EPA/Play (50%) + Success Rate (50%)")?;
    writeln!(out, "- **WRs/TEs**: EPA/Target (60%) + Expected YAC EPA (40%)\n")?;

    writeln!(out, "| Rank | Player | Position | Team | Impressiveness Score |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for (i, p) in top_players.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            p.player.name,
            p.position,
            p.team.as_deref().unwrap_or("N/A"),
            fmt_opt(p.impressiveness_score, 2)
        )?;
    }

    writeln!(out, "\n## Super Bowl Prediction Thesis")?;
    writeln!(out, "### Predicted Winner: **{}**\n", champion.team)?;
    writeln!(out, "**Quantitative Reasoning:**")?;
    writeln!(
        out,
        "The prediction model values a balanced team with a slight bias towards elite offense."
    )?;
    writeln!(
        out,
        "- **Offensive EPA/Play**: {} (Z-Score: {})",
        fmt_opt(champion.off_epa, 3),
        fmt_opt(champion.off_z, 2)
    )?;
    writeln!(
        out,
        "- **Defensive EPA/Play**: {} (Z-Score: {})",
        fmt_opt(champion.def_epa, 3),
        fmt_opt(champion.def_z, 2)
    )?;
    writeln!(
        out,
        "- **Composite Prediction Score**: {}\n",
        fmt_opt(champion.prediction_score, 2)
    )?;

    writeln!(out, "### Team Tiers")?;
    writeln!(out, "| Rank | Team | Off EPA | Def EPA | Prediction Score |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for (i, t) in teams.teams.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            t.team,
            fmt_opt(t.off_epa, 3),
            fmt_opt(t.def_epa, 3),
            fmt_opt(t.prediction_score, 2)
        )?;
    }
    Ok(())
}

/// Plain-text lineup recommendations from a recent-form run.
pub fn form_summary(report: &FormReport) -> String {
    let mut out = String::new();
    let _ = write_form_summary(&mut out, report);
    out
}

fn write_form_summary(out: &mut String, report: &FormReport) -> std::fmt::Result {
    match report.window {
        Some(window) => writeln!(
            out,
            "Form window: weeks {}-{}, matchups from week {}",
            window.start, window.end, report.matchup_week
        )?,
        None => writeln!(out, "No plays to analyze")?,
    }

    write_section(out, "Running Backs", &report.by_position(Position::Rb))?;
    write_section(out, "Wide Receivers", &report.by_position(Position::Wr))?;
    write_section(out, "Flex Rankings", &report.flex(FLEX_SIZE))?;

    if !report.skipped.is_empty() {
        writeln!(out, "\nNo recent data: {}", report.skipped.join(", "))?;
    }
    Ok(())
}

fn write_section(out: &mut String, title: &str, rows: &[&FormScore]) -> std::fmt::Result {
    writeln!(out, "\n{}:", title)?;
    for s in rows {
        writeln!(
            out,
            "  {:<18} {:<4} vs {:<4} {}",
            s.player,
            s.position.to_string(),
            s.opponent.to_string(),
            fmt_opt(s.composite_score, 3)
        )?;
    }
    Ok(())
}
