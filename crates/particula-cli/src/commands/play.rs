//! Real-time playback through an output device.

use super::common::{EngineArgs, RandomArgs, load_config, load_score, log_stats, resolve_params};
use clap::Args;
use particula_config::ScoreCursor;
use particula_core::NoteName;
use particula_engine::{FieldSnapshot, ParticleEngine, SnapshotPublisher};
use particula_io::{OutputStream, StreamConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

#[derive(Args)]
pub struct PlayArgs {
    /// Score file (TOML); a random score is used if omitted
    #[arg(value_name = "SCORE")]
    score: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(flatten)]
    random: RandomArgs,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Buffer size in frames
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Loop playback
    #[arg(short, long, alias = "repeat")]
    r#loop: bool,

    /// Print the busiest notes in the field while playing
    #[arg(long)]
    monitor: bool,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let config = load_config(&args.engine)?;
    let params = resolve_params(&config, &args.engine.set)?;

    let mut stream = OutputStream::new(StreamConfig {
        buffer_size: args.buffer_size,
        output_device: args.output.clone(),
    })?;
    let sample_rate = stream.sample_rate();

    // The score is timed at the device rate, not the config rate.
    let mut settings = config.settings();
    settings.sample_rate = sample_rate as f32;
    let score = load_score(args.score.as_deref(), &args.random, config.engine.seed)?;
    let total = score.duration_samples(settings.sample_rate);
    let mut cursor = ScoreCursor::new(score.events(settings.sample_rate));

    let mut engine = ParticleEngine::with_params(settings, &params);
    let publisher = SnapshotPublisher::new();
    engine.attach_snapshot(publisher.clone());

    let looping = args.r#loop;
    println!(
        "Playing {} note(s), {:.1}s at {} Hz{}... Press Ctrl+C to stop.\n",
        score.notes.len(),
        score.duration(),
        sample_rate,
        if looping { " (looping)" } else { "" }
    );

    let stop = stream.stop_handle();
    let ctrlc_stop = stop.clone();
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        ctrlc_stop.stop();
    })?;

    let done = Arc::new(AtomicBool::new(false));
    let monitor = args
        .monitor
        .then(|| spawn_monitor(publisher, Arc::clone(&done)));

    let (stats_tx, stats_rx) = mpsc::channel();
    let end_stop = stop.clone();
    let mut input = Vec::new();
    let mut position = 0u64;

    stream.run_stereo(move |left, right| {
        if position >= total {
            if looping {
                cursor.rewind();
                position = 0;
            } else {
                left.fill(0.0);
                right.fill(0.0);
                let _ = stats_tx.send(engine.stats());
                end_stop.stop();
                return;
            }
        }
        cursor.take_block(position, left.len(), &mut input);
        engine.process(left, right, &input, &mut ());
        position += left.len() as u64;
    })?;

    done.store(true, Ordering::SeqCst);
    if let Some(handle) = monitor {
        let _ = handle.join();
    }
    if let Ok(stats) = stats_rx.try_recv() {
        log_stats(&stats);
    }

    println!("Done!");
    Ok(())
}

/// Print a one-line summary of the field twice a second until `done`.
fn spawn_monitor(publisher: SnapshotPublisher, done: Arc<AtomicBool>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut snapshot = FieldSnapshot::default();
        while !done.load(Ordering::SeqCst) {
            publisher.read_into(&mut snapshot);
            println!("{}", summarize(&snapshot));
            std::thread::sleep(Duration::from_millis(500));
        }
    })
}

/// `"12 particles: C4 x5, G4 x5, E5 x2"`, busiest notes first.
fn summarize(snapshot: &FieldSnapshot) -> String {
    let mut counts = [0usize; 128];
    for p in &snapshot.particles {
        counts[usize::from(p.note.min(127))] += 1;
    }
    let mut busiest: Vec<(u8, usize)> = (0u8..128)
        .filter(|&n| counts[usize::from(n)] > 0)
        .map(|n| (n, counts[usize::from(n)]))
        .collect();
    busiest.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let notes: Vec<String> = busiest
        .iter()
        .take(6)
        .map(|(n, c)| format!("{} x{}", NoteName::from(*n), c))
        .collect();
    if notes.is_empty() {
        format!("{} particles", snapshot.particles.len())
    } else {
        format!("{} particles: {}", snapshot.particles.len(), notes.join(", "))
    }
}
