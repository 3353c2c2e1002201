//! Tuning Simulator CLI
//!
//! Replays command lists, runs an interactive training session on the
//! terminal, and drives the JSON API from files.

mod input;
mod logging;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tune_core::api::{load_config_file, load_config_from_env, FrameExport};
use tune_core::{EngineConfig, PlanePos, TuningEngine};

use input::{parse_command, parse_line, Input, HELP};
use render::{render, Panel, PanelSet};

#[derive(Parser)]
#[command(name = "tune_cli")]
#[command(about = "NMR probe tuning/matching trainer", version = tune_core::VERSION)]
struct Cli {
    /// Log filter (e.g. "info", "tune_core=debug"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Session seed; taken from the clock when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Starting origin as "x,y"; drawn from the seed when absent
    #[arg(long, value_parser = parse_origin, allow_hyphen_values = true)]
    origin: Option<PlanePos>,

    /// Config file (.json, .yaml); falls back to TUNE_CONFIG_PATH
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in preset used when no config file is given
    #[arg(long, value_enum, default_value_t = Preset::Reference)]
    preset: Preset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Reference,
    Coarse,
    Fine,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a command list and print the final frame
    Replay {
        #[command(flatten)]
        engine: EngineArgs,

        /// Button codes (1-8) or names (tune-up, M>>, ...)
        #[arg(value_delimiter = ',', allow_hyphen_values = true)]
        commands: Vec<String>,

        /// Print the final frame as JSON instead of drawing it
        #[arg(long, default_value = "false")]
        json: bool,

        /// Draw every intermediate frame
        #[arg(long, default_value = "false")]
        all_frames: bool,

        /// Panels to draw
        #[arg(long, value_enum, value_delimiter = ',')]
        panels: Vec<Panel>,
    },

    /// Read commands from stdin, one per line
    Interactive {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Run a JSON session request
    RunJson {
        /// Request file path
        #[arg(long)]
        r#in: PathBuf,

        /// Response file path; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the JSON Schema of a session request
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Replay { engine, commands, json, all_frames, panels } => {
            let panels = if panels.is_empty() { PanelSet::default() } else { PanelSet::only(&panels) };
            replay(engine, &commands, json, all_frames, panels)
        }
        Commands::Interactive { engine } => interactive(engine),
        Commands::RunJson { r#in, out } => run_json(r#in, out),
        Commands::Schema => {
            println!("{}", tune_core::session_request_schema_json()?);
            Ok(())
        }
    }
}

fn parse_origin(s: &str) -> Result<PlanePos, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    let origin = (parse(x)?, parse(y)?);
    if !(origin.0.is_finite() && origin.1.is_finite()) {
        return Err(format!("origin must be finite, got {s:?}"));
    }
    Ok(origin)
}

fn clock_seed() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
}

fn resolve_config(args: &EngineArgs) -> Result<EngineConfig> {
    if let Some(path) = &args.config {
        return load_config_file(path).with_context(|| format!("loading {}", path.display()));
    }
    if let Some(config) = load_config_from_env().context("loading config from environment")? {
        return Ok(config);
    }
    Ok(match args.preset {
        Preset::Reference => EngineConfig::reference(),
        Preset::Coarse => EngineConfig::coarse(),
        Preset::Fine => EngineConfig::fine(),
    })
}

fn build_engine(args: &EngineArgs) -> Result<TuningEngine> {
    let config = resolve_config(args)?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(seed, "starting session");
    let engine = match args.origin {
        Some(origin) => TuningEngine::with_origin(config, seed, origin)?,
        None => TuningEngine::new(config, seed)?,
    };
    Ok(engine)
}

fn replay(
    args: EngineArgs,
    commands: &[String],
    json: bool,
    all_frames: bool,
    panels: PanelSet,
) -> Result<()> {
    let commands = commands
        .iter()
        .map(|token| parse_command(token.trim()))
        .collect::<Result<Vec<_>>>()?;
    let mut engine = build_engine(&args)?;

    let mut stdout = io::stdout().lock();
    for command in commands {
        let frame = engine.apply(command);
        if all_frames && !json {
            writeln!(stdout, "== {command} ==")?;
            write!(stdout, "{}", render(&frame, &panels))?;
        }
    }

    let frame = engine.current_frame();
    if json {
        let export = FrameExport::from_frame(&frame, false);
        writeln!(stdout, "{}", serde_json::to_string_pretty(&export)?)?;
    } else if !all_frames || engine.state().commands_applied() == 0 {
        write!(stdout, "{}", render(&frame, &panels))?;
    }
    Ok(())
}

fn interactive(args: EngineArgs) -> Result<()> {
    let mut engine = build_engine(&args)?;
    let mut panels = PanelSet::default();

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{HELP}")?;
    write!(stdout, "{}", render(&engine.current_frame(), &panels))?;
    stdout.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                writeln!(stdout, "error: {err}")?;
                continue;
            }
        };

        let frame = match input {
            Input::Quit => break,
            Input::Help => {
                writeln!(stdout, "{HELP}")?;
                continue;
            }
            Input::Status => {
                let state = engine.state();
                writeln!(
                    stdout,
                    "seed {} epoch {} commands {} best {:.4}",
                    engine.seed(),
                    state.epoch(),
                    state.commands_applied(),
                    state.best_reflection()
                )?;
                continue;
            }
            Input::Command(command) => engine.apply(command),
            Input::Reset => engine.reset(),
            Input::Show(panel) => {
                panels.set(panel, true);
                engine.current_frame()
            }
            Input::Hide(panel) => {
                panels.set(panel, false);
                engine.current_frame()
            }
            Input::Toggle(panel) => {
                panels.toggle(panel);
                engine.current_frame()
            }
            Input::Redraw => engine.current_frame(),
        };
        write!(stdout, "{}", render(&frame, &panels))?;
        stdout.flush()?;
    }
    Ok(())
}

fn run_json(input: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let request = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let response = tune_core::simulate_session_json(&request)?;
    match out {
        Some(path) => {
            std::fs::write(&path, response).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "response written");
        }
        None => println!("{response}"),
    }
    Ok(())
}
