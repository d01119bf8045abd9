//! Herald: a server-list reporter driven from the console.
//!
//! Stands in for a game server: the host status comes from the command line
//! and players join and leave through console commands (`help` lists them).
//!
//! Run with: `cargo run -p herald-reporter -- --endpoint 127.0.0.1:9001`

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use herald_config::{CliArgs, SettingsLoader};
use herald_report::{GameMode, ModControlMode, WarpMode};
use herald_reporter::{
    COMMANDS, HostStatus, OperatorCommand, Reporter, ReporterTiming, VersionInfo,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// CLI arguments for the reporter binary.
#[derive(Parser, Debug)]
#[command(name = "herald", about = "Server-list reporter")]
struct Args {
    #[command(flatten)]
    settings: CliArgs,

    /// Server name shown on the list.
    #[arg(long, default_value = "Herald server")]
    server_name: String,

    /// Game port.
    #[arg(long, default_value_t = 6702)]
    port: i32,

    /// HTTP status port (0 when disabled).
    #[arg(long, default_value_t = 0)]
    http_port: i32,

    /// Player cap.
    #[arg(long, default_value_t = 20)]
    max_players: i32,

    /// Game mode (sandbox, science, career).
    #[arg(long, default_value_t = GameMode::Sandbox)]
    game_mode: GameMode,

    /// Warp mode (mcw-force, mcw-vote, mcw-lowest, subspace-simple, subspace, none).
    #[arg(long, default_value_t = WarpMode::Subspace)]
    warp_mode: WarpMode,

    /// Mod control mode (disabled, stop-invalid-part-sync, stop-invalid-part-launch).
    #[arg(long, default_value_t = ModControlMode::StopInvalidPartSync)]
    mod_control: ModControlMode,

    /// Enable cheats.
    #[arg(long)]
    cheats: bool,

    /// Game protocol version.
    #[arg(long, default_value_t = 48)]
    protocol_version: i32,

    /// Directory for the JSON log file (debug builds only).
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let loader = match SettingsLoader::from_cli(&args.settings) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to locate settings directory: {e}");
            std::process::exit(1);
        }
    };
    let settings = match loader.load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load reporting settings from {}: {e}", loader.dir().display());
            std::process::exit(1);
        }
    };

    herald_log::init_logging(
        args.log_dir.as_deref(),
        cfg!(debug_assertions),
        Some(&settings.config),
    );
    info!("Herald reporter");
    info!("Settings: {}", loader.dir().display());
    info!("Identity: {}", settings.identity);

    let host = HostStatus {
        server_name: args.server_name,
        port: args.port,
        http_port: args.http_port,
        max_players: args.max_players,
        mod_control: args.mod_control,
        game_mode: args.game_mode,
        cheats: args.cheats,
        warp_mode: args.warp_mode,
        ..Default::default()
    };
    let version = VersionInfo {
        protocol_version: args.protocol_version,
        program_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let reporter = Reporter::new(
        loader,
        settings,
        Arc::new(host),
        version,
        ReporterTiming::default(),
    );
    if let Err(e) = reporter.start() {
        error!("Failed to start reporter: {e}");
        std::process::exit(1);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read console: {e}");
                break;
            }
        };

        match OperatorCommand::parse(&line) {
            Ok(OperatorCommand::ReloadReporter) => {
                if let Err(e) = reporter.reload().await {
                    warn!("Reload kept previous settings: {e}");
                }
            }
            Ok(OperatorCommand::Join(name)) => reporter.player_joined(&name),
            Ok(OperatorCommand::Leave(name)) => reporter.player_left(&name),
            Ok(OperatorCommand::Report) => reporter.report_now(),
            Ok(OperatorCommand::Status) => {
                let players = reporter.players();
                println!("state: {}", reporter.state());
                println!("players ({}): {}", players.len(), players.join(", "));
            }
            Ok(OperatorCommand::Help) => {
                for (name, help) in COMMANDS {
                    println!("  {name:<16} {help}");
                }
            }
            Ok(OperatorCommand::Quit) => break,
            Err(herald_reporter::CommandError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    reporter.stop().await;
}
