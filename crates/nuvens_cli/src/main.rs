//! Nuvens CLI
//!
//! Headless driver for the theme and cloud engines:
//! - inspect and change the persisted theme preference
//! - print the CSS custom properties a theme resolves to
//! - run cloud motion for a number of frames and print the transforms

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nuvens_app::{init_tracing, NuvensConfig, CONFIG_FILE};
use nuvens_clouds::MotionStyle;
use nuvens_theme::{
    FileStorage, KeyValueStore, MemoryStorage, OutlineContext, OutlinePreset, ThemeKind,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nuvens")]
#[command(about = "Theme and cloud motion engines, headless")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <state-dir>/nuvens.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted preference
    #[arg(long, global = true, default_value = ".nuvens")]
    state_dir: PathBuf,

    /// Pretend the system prefers a dark color scheme
    #[arg(long, global = true)]
    system_dark: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Theme preference and CSS output
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Run cloud motion headlessly
    Clouds(CloudArgs),
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    /// Effective theme and where it came from
    Show,
    /// Store a choice: light, dark or system
    Set { mode: String },
    /// Switch between light and dark
    Toggle,
    /// Forget the stored choice
    Reset,
    /// Print the custom properties for a theme
    Css {
        #[arg(long, conflicts_with = "dark")]
        light: bool,
        #[arg(long)]
        dark: bool,
    },
    /// Print the text-shadow outline for a preset: normal, title or title-blur
    Outline {
        #[arg(default_value = "normal")]
        preset: OutlinePreset,
        /// Use the narrow-screen radii
        #[arg(long)]
        mobile: bool,
    },
}

#[derive(Args, Debug)]
struct CloudArgs {
    /// Clouds to register
    #[arg(long, default_value_t = 3)]
    count: usize,

    /// Frames to run, 16 ms apart
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// RNG seed for reproducible paths
    #[arg(long)]
    seed: Option<u64>,

    /// gentle, dynamic or elastic
    #[arg(long)]
    style: Option<MotionStyle>,

    /// Global speed multiplier
    #[arg(long)]
    speed: Option<f32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.state_dir.join(CONFIG_FILE));
    let mut config = NuvensConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if cli.verbose {
        config.logging.filter = "nuvens=debug".to_string();
    }
    init_tracing(&config.logging);

    let output = match cli.command {
        Command::Theme(command) => {
            let storage: Box<dyn KeyValueStore> = match command {
                ThemeCommand::Css { light: true, .. } => Box::new(MemoryStorage::with_entry(
                    &config.theme.storage_key,
                    ThemeKind::Light.as_str(),
                )),
                ThemeCommand::Css { dark: true, .. } => Box::new(MemoryStorage::with_entry(
                    &config.theme.storage_key,
                    ThemeKind::Dark.as_str(),
                )),
                _ => Box::new(FileStorage::in_dir(&cli.state_dir)),
            };
            let session = commands::ThemeSession::new(config, storage, cli.system_dark);
            match command {
                ThemeCommand::Show => session.show(),
                ThemeCommand::Set { mode } => session.set(&mode)?,
                ThemeCommand::Toggle => session.toggle()?,
                ThemeCommand::Reset => session.reset()?,
                ThemeCommand::Css { .. } => session.css()?,
                ThemeCommand::Outline { preset, mobile } => {
                    let context = if mobile {
                        OutlineContext::Mobile
                    } else {
                        OutlineContext::Desktop
                    };
                    session.outline(preset, context)
                }
            }
        }
        Command::Clouds(args) => commands::run_clouds(
            config,
            &commands::CloudRun {
                count: args.count,
                frames: args.frames,
                seed: args.seed,
                style: args.style,
                speed: args.speed,
            },
        )?,
    };

    println!("{output}");
    Ok(())
}
