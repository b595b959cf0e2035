use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use poker_seat::config::{DATA_DIR_ENV, default_data_dir};
use poker_seat::exec::SystemRunner;
use poker_seat::game::Street;
use poker_seat::tools::OddsArgs;
use poker_seat::{SeatConfig, SessionStore, ToolBox, display, stdio, web};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "poker-seat",
    version,
    about = "Seat an AI agent at a live poker table",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding current_game.json, player_stats.json and config.json
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Camera device to use instead of probing the configured list
    #[arg(long, global = true)]
    device: Option<String>,

    /// Where captured frames are written
    #[arg(long, global = true)]
    image_path: Option<PathBuf>,

    /// Text-to-speech program
    #[arg(long, global = true)]
    voice_program: Option<String>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer line-delimited JSON tool calls on stdin (the default)
    Stdio,
    /// Serve the tool surface over HTTP
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Print the current table
    State,
    /// Pot odds for calling `bet` into `pot`
    Odds {
        #[arg(long)]
        pot: i64,
        #[arg(long)]
        bet: i64,
        /// Outs for a rule-of-four-and-two equity estimate
        #[arg(long)]
        outs: Option<u32>,
        #[arg(long)]
        street: Option<StreetArg>,
    },
    /// Print a line of table talk
    Talk {
        situation: String,
        #[arg(long)]
        target: Option<String>,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum StreetArg {
    Preflop,
    Flop,
    Turn,
    River,
}

impl From<StreetArg> for Street {
    fn from(arg: StreetArg) -> Self {
        match arg {
            StreetArg::Preflop => Street::Preflop,
            StreetArg::Flop => Street::Flop,
            StreetArg::Turn => Street::Turn,
            StreetArg::River => Street::River,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries protocol responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_toolbox(cli: &Cli) -> Result<ToolBox> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let mut config = SeatConfig::load(&data_dir)?;
    if let Some(device) = &cli.device {
        config.capture.devices = vec![device.clone()];
    }
    if let Some(path) = &cli.image_path {
        config.capture.image_path = path.clone();
    }
    if let Some(program) = &cli.voice_program {
        config.voice.program = program.clone();
    }

    let store = SessionStore::open(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    Ok(ToolBox::from_config(store, &config, Arc::new(SystemRunner)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    init_tracing();
    let cli = Cli::parse();
    let mut toolbox = build_toolbox(&cli)?;

    match cli.command {
        None | Some(Commands::Stdio) => {
            stdio::serve(&mut toolbox, io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Serve { addr }) => {
            let addr: SocketAddr = addr.parse()?;
            web::serve(addr, toolbox).await?;
        }
        Some(Commands::State) => {
            println!("{}", display::render_summary(&toolbox.game_state(), cli.no_color));
        }
        Some(Commands::Odds {
            pot,
            bet,
            outs,
            street,
        }) => {
            let args = OddsArgs {
                pot,
                bet,
                outs,
                street: street.map(Street::from),
            };
            let report = toolbox.poker_odds(&args)?;
            println!("{}", display::render_odds(&report, cli.no_color));
        }
        Some(Commands::Talk { situation, target }) => {
            let talk = toolbox.poker_trash_talk(&situation, target.as_deref())?;
            println!("{}", display::render_talk(&talk, cli.no_color));
        }
    }

    Ok(())
}
