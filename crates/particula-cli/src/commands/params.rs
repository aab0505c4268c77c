//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use particula_core::SpawnOrigin;
use particula_engine::{ParamId, ParamUnit};

#[derive(Args)]
pub struct ParamsArgs {
    /// Show details for a specific parameter
    #[arg(value_name = "PARAM")]
    param: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.param {
        let id = ParamId::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown parameter: {}", name))?;
        show_param(id);
        return Ok(());
    }

    println!("Engine Parameters");
    println!("=================\n");
    println!(
        "  {:3}  {:20}  {:12}  {:12}  {:12}",
        "Id", "Name", "Min", "Max", "Default"
    );
    println!(
        "  {:3}  {:20}  {:12}  {:12}  {:12}",
        "--", "----", "---", "---", "-------"
    );
    for id in ParamId::ALL {
        let d = id.descriptor();
        println!(
            "  {:3}  {:20}  {:12}  {:12}  {:12}",
            id.index(),
            d.name,
            d.format(d.min),
            d.format(d.max),
            d.format(d.default)
        );
    }
    println!();
    println!("Override with --set, e.g.:");
    println!("  particula render out.wav --set gravity=2 --set spawn_origin=top-band");
    Ok(())
}

fn show_param(id: ParamId) {
    let d = id.descriptor();
    println!("{}", d.name);
    println!("{}", "=".repeat(d.name.len()));
    println!();
    println!("{}", d.description);
    println!();
    println!("  Id:      {}", id.index());
    println!("  Range:   {} to {}", d.format(d.min), d.format(d.max));
    println!("  Default: {}", d.format(d.default));
    if d.unit != ParamUnit::None {
        println!("  Unit:    {}", d.unit.suffix().trim());
    }
    if d.stepped {
        println!("  Step:    {}", d.step);
    }

    match id {
        ParamId::SpawnOrigin => {
            println!();
            println!("Values:");
            for origin in SpawnOrigin::ALL {
                println!("  {}  {}", origin.index(), origin.name());
            }
        }
        ParamId::SizeByNote => {
            println!();
            println!("Values: on/off, true/false, 1/0");
        }
        _ => {}
    }
}
