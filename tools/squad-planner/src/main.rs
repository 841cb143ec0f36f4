//! Squad Planner
//!
//! Reads a league snapshot (player pool plus the manager's squad), runs the
//! transfer engine and prints the result as JSON on stdout:
//! - decide: transfers, then the lineup for the updated squad (default)
//! - lineup: lineup for the squad as it stands
//! - validate: audit a hand-written transfer list

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use logging::LogFormat;
use player_registry::{LeagueSnapshot, PlayerRegistry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use transfer_engine::{
    Chip, GameweekDecision, OptimizerConfig, TeamRequest, TransferEngine, TransferRequest,
    ValidationReport,
};

#[derive(Parser, Debug)]
#[command(name = "squad-planner")]
#[command(about = "Recommend transfers and a starting lineup from a league snapshot")]
#[command(version = "0.1.0")]
struct Cli {
    /// League snapshot JSON file
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Optimizer configuration TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the free transfers banked in the snapshot
    #[arg(long)]
    free_transfers: Option<u8>,

    /// Look-ahead in gameweeks (1-5)
    #[arg(long)]
    horizon: Option<u32>,

    /// Active chip: wildcard or free-hit
    #[arg(long)]
    chip: Option<Chip>,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Plan transfers and pick the lineup for the updated squad
    Decide,

    /// Pick the lineup for the current squad without transfers
    Lineup,

    /// Check a transfer list against the squad and league rules
    Validate {
        /// Transfer as OUT:IN player ids, repeatable
        #[arg(short, long = "transfer", value_parser = parse_transfer)]
        transfers: Vec<TransferRequest>,
    },
}

/// Decision plus an audit of its own transfers
#[derive(Debug, Serialize)]
struct DecisionOutput {
    #[serde(flatten)]
    decision: GameweekDecision,
    validation: ValidationReport,
}

fn parse_transfer(value: &str) -> Result<TransferRequest, String> {
    let (out, incoming) =
        value.split_once(':').ok_or_else(|| format!("expected OUT:IN, got '{value}'"))?;
    let out = out.trim().parse().map_err(|_| format!("invalid player id '{out}'"))?;
    let incoming = incoming.trim().parse().map_err(|_| format!("invalid player id '{incoming}'"))?;
    Ok(TransferRequest::new(out, incoming))
}

/// File config, then `OPTIMIZER_*` environment overrides, then flags
fn load_config(cli: &Cli, snapshot_gameweek: Option<u32>) -> Result<OptimizerConfig> {
    let mut config = match &cli.config {
        Some(path) => OptimizerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => OptimizerConfig::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid OPTIMIZER_* environment override")?;

    if let Some(horizon) = cli.horizon {
        config.scoring.horizon = horizon;
    }
    if config.scoring.next_gameweek.is_none() {
        config.scoring.next_gameweek = snapshot_gameweek;
    }
    config.validate().context("Invalid optimizer configuration")?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<serde_json::Value> {
    let snapshot = LeagueSnapshot::load_from_file(&cli.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", cli.snapshot.display()))?;
    let config = load_config(cli, snapshot.gameweek)?;

    let (registry, mut squad) =
        PlayerRegistry::from_snapshot(snapshot).context("Snapshot squad does not match its player pool")?;
    if let Some(free) = cli.free_transfers {
        squad = squad.with_free_transfers(free);
    }
    let pool = registry.to_pool();
    info!("Planning for a squad of {} from a pool of {}", squad.len(), pool.len());

    let engine = TransferEngine::new(config);
    let output = match cli.command.clone().unwrap_or(Command::Decide) {
        Command::Decide => {
            let decision = engine.decide(TeamRequest::new(&squad, &pool).with_chip(cli.chip));
            let transfers = TransferRequest::from_plan(&decision.plan);
            let validation = engine.validate(&squad, &transfers, &pool, cli.chip);
            serde_json::to_value(DecisionOutput { decision, validation })?
        }
        Command::Lineup => serde_json::to_value(engine.compute_lineup(&squad))?,
        Command::Validate { transfers } => {
            if transfers.is_empty() {
                bail!("validate needs at least one --transfer OUT:IN");
            }
            serde_json::to_value(engine.validate(&squad, &transfers, &pool, cli.chip))?
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize_logging(cli.log_format)?;

    let output = run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_registry::{Fixture, Money, Player, Position, SquadSnapshot};
    use std::path::Path;

    fn player(id: u32, position: Position, club: u32, price: i64, points: f64) -> Player {
        Player::new(id, &format!("Player {id}"), position, club, Money::from_tenths(price))
            .with_fixture(Fixture::new(3, 20, 2).with_prediction(points))
    }

    fn write_snapshot(dir: &Path) -> PathBuf {
        let positions = [
            Position::Goalkeeper,
            Position::Goalkeeper,
            Position::Defender,
            Position::Defender,
            Position::Defender,
            Position::Defender,
            Position::Defender,
            Position::Midfielder,
            Position::Midfielder,
            Position::Midfielder,
            Position::Midfielder,
            Position::Midfielder,
            Position::Forward,
            Position::Forward,
            Position::Forward,
        ];
        let mut players: Vec<Player> = positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let id = i as u32 + 1;
                player(id, *position, i as u32 / 3 + 1, 50, f64::from(id % 6))
            })
            .collect();
        players.push(player(100, Position::Forward, 9, 50, 12.0));

        let snapshot = LeagueSnapshot {
            gameweek: Some(3),
            players,
            squad: SquadSnapshot {
                player_ids: (1..=15).collect(),
                bank: Money::from_tenths(5),
                free_transfers: 1,
                transfer_penalty: 4.0,
                selling_prices: Default::default(),
            },
        };

        let path = dir.join("snapshot.json");
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_parse_transfer() {
        assert_eq!(parse_transfer("15:200"), Ok(TransferRequest::new(15, 200)));
        assert_eq!(parse_transfer(" 3 : 4 "), Ok(TransferRequest::new(3, 4)));
        assert!(parse_transfer("15-200").is_err());
        assert!(parse_transfer("x:1").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "squad-planner",
            "--snapshot",
            "league.json",
            "--chip",
            "free-hit",
            "--horizon",
            "3",
            "--log-format",
            "json",
            "validate",
            "-t",
            "1:2",
            "--transfer",
            "3:4",
        ])
        .unwrap();

        assert_eq!(cli.chip, Some(Chip::FreeHit));
        assert_eq!(cli.horizon, Some(3));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(
            cli.command,
            Some(Command::Validate {
                transfers: vec![TransferRequest::new(1, 2), TransferRequest::new(3, 4)]
            })
        );

        assert!(Cli::try_parse_from(["squad-planner", "--snapshot", "x", "--chip", "triple"]).is_err());
    }

    #[test]
    fn test_decide_from_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "squad-planner",
            "--snapshot",
            write_snapshot(dir.path()).to_str().unwrap(),
        ])
        .unwrap();

        let output = run(&cli).unwrap();
        assert_eq!(output["gameweek"], 3);
        assert_eq!(output["plan"]["transfers"][0]["player_in"], 100);
        assert_eq!(output["lineup"]["captain"], 100);
        assert_eq!(output["validation"]["status"], "pass");
    }

    #[test]
    fn test_validate_command_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "squad-planner",
            "--snapshot",
            write_snapshot(dir.path()).to_str().unwrap(),
            "validate",
            "--transfer",
            "1:100",
        ])
        .unwrap();

        let output = run(&cli).unwrap();
        assert_eq!(output["status"], "fail");
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let cli = Cli::try_parse_from(["squad-planner", "--snapshot", "/nonexistent/league.json"])
            .unwrap();
        let error = run(&cli).unwrap_err();
        assert!(error.to_string().contains("Failed to load snapshot"));
    }
}
