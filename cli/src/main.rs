use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::LevelFilter;
use nflq::{
    form::{self, FormConfig},
    pbp::{PbpDf, PbpFilter, Play},
    player::{self, PlayerThresholds, DEFAULT_TOP_N},
    report, team, DataProvider, ParquetProvider,
};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding pbp_{year}.parquet, schedules_{year}.parquet and rosters_{year}.parquet
    #[arg(short = 'd', long = "data-dir", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[arg(short = 'y', long = "year", default_values_t = [2024], global = true)]
    years: Vec<u16>,

    /// Analyze as of this week, ignoring later plays
    #[arg(long = "through-week", global = true)]
    through_week: Option<u32>,

    /// Only plays where this team has the ball
    #[arg(short = 't', long, global = true)]
    team: Option<String>,

    /// SQL predicate over the `plays` table applied before scoring
    #[arg(long = "where", global = true)]
    predicate: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank players by impressiveness score
    Players {
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
    /// Rank teams by championship prediction score
    Teams {
        #[arg(short = 'n', long, default_value_t = 5)]
        top: usize,
    },
    /// Score a fantasy lineup on recent form and upcoming matchup
    Form {
        /// JSON lineup file; defaults to the built-in lineup
        #[arg(short = 'l', long)]
        lineup: Option<PathBuf>,

        #[arg(short = 'w', long, value_parser = clap::value_parser!(u32).range(1..))]
        weeks: Option<u32>,

        #[arg(short = 'm', long = "matchup-week")]
        matchup_week: Option<u32>,
    },
    /// Write the markdown analysis report
    Report {
        #[arg(short = 'o', long, default_value = "ANALYSIS_REPORT.md")]
        output: PathBuf,
    },
    /// Check which source tables are available
    Check,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set the default level based on verbosity
    let default_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new().add_filter_allow_str("nflq").build();

    TermLogger::init(
        default_level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to initialize logger")?;

    log::trace!("Args {:#?}", args);

    if args.years.is_empty() {
        bail!("At least one --year is required");
    }
    let provider = ParquetProvider::new(&args.data_dir);

    match &args.command {
        Command::Players { top } => {
            let plays = load_plays(&provider, &args)?;
            let rankings = player::score_players(&plays, &PlayerThresholds::default());
            println!("{}", report::players_frame(&rankings.top(*top))?);
        }
        Command::Teams { top } => {
            let plays = load_plays(&provider, &args)?;
            let rankings = team::score_teams(&plays);
            println!("{}", report::teams_frame(&rankings, *top)?);
            if let Some(champion) = rankings.champion() {
                println!("Predicted champion: {}", champion.team);
            }
        }
        Command::Form {
            lineup,
            weeks,
            matchup_week,
        } => {
            let mut config = match lineup {
                Some(path) => FormConfig::from_json_file(path)
                    .with_context(|| format!("reading lineup {}", path.display()))?,
                None => FormConfig::default(),
            };
            if let Some(weeks) = weeks {
                config.weeks = *weeks;
            }
            if let Some(week) = matchup_week {
                config.matchup_week = *week;
            }

            let plays = load_plays(&provider, &args)?;
            let games = provider.fetch_schedule(&args.years)?.games()?;
            let form = form::score_recent_form(&plays, &games, &config);
            if form.scores.is_empty() {
                bail!("No player data found to analyze");
            }

            println!("{}", report::form_frame(&form.scores.iter().collect_vec())?);
            println!("{}", report::form_summary(&form));
        }
        Command::Report { output } => {
            let plays = load_plays(&provider, &args)?;
            let players = player::score_players(&plays, &PlayerThresholds::default());
            let teams = team::score_teams(&plays);

            let season = args.years.iter().join(", ");
            let markdown = report::analysis_report(&season, &players.top(DEFAULT_TOP_N), &teams)?;
            std::fs::write(output, markdown)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Report generated at {}", output.display());
        }
        Command::Check => check(&provider, &args)?,
    }

    Ok(())
}

fn load_pbp(provider: &ParquetProvider, args: &Args) -> Result<PbpDf> {
    let mut pbp = provider.fetch_plays(&args.years)?;
    let mut filter = PbpFilter::new();
    if let Some(week) = args.through_week {
        filter = filter.week_range(1, week);
    }
    if let Some(team) = &args.team {
        filter = filter.team(team);
    }
    if args.through_week.is_some() || args.team.is_some() {
        pbp = pbp.filter(filter.build())?;
    }
    if let Some(predicate) = &args.predicate {
        pbp = pbp.filter_sql(predicate)?;
    }
    Ok(pbp)
}

/// Loads the play table; an empty result aborts the run.
fn load_plays(provider: &ParquetProvider, args: &Args) -> Result<Vec<Play>> {
    let plays = load_pbp(provider, args)?.plays()?;
    log::info!("Loaded {} plays", plays.len());
    if plays.is_empty() {
        bail!("No plays left to analyze");
    }
    Ok(plays)
}

fn check(provider: &ParquetProvider, args: &Args) -> Result<()> {
    match load_pbp(provider, args).and_then(|pbp| Ok((pbp.height(), pbp.max_week()?))) {
        Ok((rows, max_week)) => println!(
            "Play-by-play: {} rows, through week {}",
            rows,
            max_week.map_or_else(|| "?".to_string(), |w| w.to_string())
        ),
        Err(e) => println!("Play-by-play failed: {:#}", e),
    }

    match provider.fetch_schedule(&args.years) {
        Ok(schedule_df) => match schedule_df.games() {
            Ok(games) => {
                let week = form::DEFAULT_MATCHUP_WEEK;
                let matchups = games.iter().filter(|g| g.week == week).collect_vec();
                println!("Schedule: {} games, {} in week {}", games.len(), matchups.len(), week);
                for game in matchups.iter().take(5) {
                    println!("  {} @ {}", game.away_team, game.home_team);
                }
            }
            Err(e) => println!("Schedule unreadable: {:#}", e),
        },
        Err(e) => println!("Schedule failed: {:#}", e),
    }

    match provider
        .fetch_rosters(&args.years)
        .and_then(|roster| roster.unique_players())
    {
        Ok(players) => println!("Rosters: {} players", players.height()),
        Err(e) => println!("Rosters failed: {:#}", e),
    }

    Ok(())
}
