//! Criterion benchmarks for particula-synth
//!
//! Run with: cargo bench -p particula-synth
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use particula_synth::{ParticleSynth, VoiceParams};

const SAMPLE_RATE: f32 = 48000.0;
const VOICE_COUNTS: &[usize] = &[1, 16, 64, 128];

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParticleSynth");

    for &voices in VOICE_COUNTS {
        group.bench_with_input(BenchmarkId::new("render_512", voices), &voices, |b, &voices| {
            let mut synth = ParticleSynth::new(SAMPLE_RATE, 1);
            synth.set_params(VoiceParams {
                decay_half_life: 2.0,
                waveform: 0.5,
                ..VoiceParams::default()
            });
            for i in 0..voices {
                synth.note_on((i % 16) as u8, 36 + (i % 60) as u8, 0.8);
            }
            let mut left = vec![0.0f32; 512];
            let mut right = vec![0.0f32; 512];
            b.iter(|| {
                left.fill(0.0);
                right.fill(0.0);
                synth.render(&mut left, &mut right);
                black_box(left[511] + right[511])
            });
        });
    }

    group.bench_function("note_on_full_bank", |b| {
        let mut synth = ParticleSynth::new(SAMPLE_RATE, 1);
        for i in 0..128u8 {
            synth.note_on(0, i, 1.0);
        }
        b.iter(|| synth.note_on(black_box(3), black_box(60), 1.0));
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
