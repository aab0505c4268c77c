//! Offline rendering of a score to a WAV file.

use super::common::{EngineArgs, RandomArgs, load_config, load_score, log_stats, resolve_params};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use particula_config::ScoreCursor;
use particula_core::linear_to_db;
use particula_engine::{Event, EventKind, ParticleEngine};
use particula_io::{StereoWavWriter, WavSpec};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Score file (TOML); a random score is used if omitted
    #[arg(long)]
    score: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(flatten)]
    random: RandomArgs,

    /// Output sample rate (overrides the config)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Write the generated event stream as JSON
    #[arg(long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// One generated event with its absolute sample position.
#[derive(Debug, Serialize)]
struct EventRecord {
    sample: u64,
    channel: u8,
    #[serde(flatten)]
    kind: KindRecord,
    midi: [u8; 3],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum KindRecord {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    Pan { value: f32 },
}

impl EventRecord {
    fn new(block_start: u64, event: &Event) -> Self {
        let kind = match event.kind {
            EventKind::NoteOn { note, velocity } => KindRecord::NoteOn { note, velocity },
            EventKind::NoteOff { note } => KindRecord::NoteOff { note },
            EventKind::Pan { value } => KindRecord::Pan { value },
        };
        Self {
            sample: block_start + u64::from(event.time),
            channel: event.channel,
            kind,
            midi: event.to_midi(),
        }
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth {} (expected 16, 24, or 32)", args.bit_depth);
    }

    let mut config = load_config(&args.engine)?;
    if let Some(rate) = args.sample_rate {
        config.engine.sample_rate = rate;
        config.validate()?;
    }
    let params = resolve_params(&config, &args.engine.set)?;
    let settings = config.settings();
    let score = load_score(args.score.as_deref(), &args.random, config.engine.seed)?;

    if let Some(name) = &config.name {
        println!("Scene: {name}");
    }
    println!(
        "Rendering {} note(s), {:.2}s at {} Hz...",
        score.notes.len(),
        score.duration(),
        config.engine.sample_rate
    );

    let mut engine = ParticleEngine::with_params(settings, &params);
    let mut cursor = ScoreCursor::new(score.events(settings.sample_rate));
    let total = score.duration_samples(settings.sample_rate);
    let block = config.engine.block_size.max(1);

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let spec = WavSpec {
        sample_rate: config.engine.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    let mut writer = StereoWavWriter::create(&args.output, spec)?;

    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let mut input = Vec::new();
    let mut generated: Vec<Event> = Vec::new();
    let mut records = Vec::new();
    let mut peak = 0.0f32;
    let mut start = 0u64;

    while start < total {
        let len = block.min((total - start) as usize);
        cursor.take_block(start, len, &mut input);
        generated.clear();
        engine.process(&mut left[..len], &mut right[..len], &input, &mut generated);

        if args.events.is_some() {
            records.extend(generated.iter().map(|e| EventRecord::new(start, e)));
        }
        peak = left[..len]
            .iter()
            .chain(&right[..len])
            .fold(peak, |m, s| m.max(s.abs()));
        writer.write_block(&left[..len], &right[..len])?;

        start += len as u64;
        pb.set_position(start);
    }
    pb.finish_with_message("done");

    let frames = writer.frames();
    writer.finalize()?;

    let stats = engine.stats();
    println!("\nStats:");
    println!("  Physics steps: {}", stats.steps);
    println!("  Collisions:    {}", stats.collisions);
    println!("  Peak:          {:.1} dB", linear_to_db(peak));
    log_stats(&stats);

    if let Some(path) = &args.events {
        std::fs::write(path, serde_json::to_string_pretty(&records)?)?;
        println!("Wrote {} event(s) to {}", records.len(), path.display());
    }

    println!("Wrote {} frames to {}", frames, args.output.display());
    Ok(())
}
