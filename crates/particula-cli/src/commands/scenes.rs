//! Factory scene listing and export command.

use clap::{Args, Subcommand};
use particula_config::{factory_scenes, get_factory_scene};
use std::path::PathBuf;

#[derive(Args)]
pub struct ScenesArgs {
    #[command(subcommand)]
    command: Option<ScenesCommand>,
}

#[derive(Subcommand)]
enum ScenesCommand {
    /// List factory scenes
    List,

    /// Print a scene as TOML
    Show {
        /// Scene name
        name: String,
    },

    /// Save a scene to a file as a starting point for a custom config
    Export {
        /// Scene name
        name: String,

        /// Destination TOML file
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ScenesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(ScenesCommand::List) {
        ScenesCommand::List => list_scenes(),
        ScenesCommand::Show { name } => {
            let scene = get_factory_scene(&name)?;
            print!("{}", scene.to_toml()?);
            Ok(())
        }
        ScenesCommand::Export {
            name,
            output,
            force,
        } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "'{}' already exists. Use --force to overwrite.",
                    output.display()
                );
            }
            get_factory_scene(&name)?.save(&output)?;
            println!("Saved scene '{}' to {}", name, output.display());
            Ok(())
        }
    }
}

fn list_scenes() -> anyhow::Result<()> {
    println!("Factory Scenes:");
    println!("===============");
    for (name, scene) in factory_scenes() {
        let desc = scene.description.as_deref().unwrap_or("");
        println!("  {:12} - {}", name, desc);
    }
    println!();
    println!("Use a scene with: particula render out.wav --scene <name>");
    Ok(())
}
