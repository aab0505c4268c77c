//! Particula CLI - render and play the particle collision synth.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "particula")]
#[command(author, version, about = "Particle collision synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a score (or a random one) to a stereo WAV file
    Render(commands::render::RenderArgs),

    /// Play a score (or a random one) through an output device
    Play(commands::play::PlayArgs),

    /// List engine parameters and their ranges
    Params(commands::params::ParamsArgs),

    /// List and export factory scenes
    Scenes(commands::scenes::ScenesArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Scenes(args) => commands::scenes::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
