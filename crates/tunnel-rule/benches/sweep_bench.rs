use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use tunnel_model::{Lane, Note, SharedNote};
use tunnel_rule::{GameConfig, sweep, validator};

fn dense_chart(count: usize) -> Vec<SharedNote> {
    let lanes = Lane::all();
    (0..count)
        .map(|i| {
            let lane = lanes[i % lanes.len()];
            let time = i as f64 * 25.0;
            let note = if i % 5 == 0 {
                Note::hold(format!("n{i}"), lane, time, 400.0)
            } else {
                Note::tap(format!("n{i}"), lane, time)
            };
            Arc::new(note)
        })
        .collect()
}

fn bench_sweep(c: &mut Criterion) {
    let notes = dense_chart(5000);
    let config = GameConfig::default();

    c.bench_function("sweep_5000_notes_mid_chart", |b| {
        b.iter(|| sweep(&notes, 60_000.0, &config));
    });
}

fn bench_find_pressable(c: &mut Criterion) {
    let notes = dense_chart(5000);
    let config = GameConfig::default();

    c.bench_function("find_pressable_5000_notes", |b| {
        b.iter(|| {
            validator::find_pressable_note(&notes, Lane::Pad2, 60_000.0, config.lead_time_ms, &config)
        });
    });
}

criterion_group!(benches, bench_sweep, bench_find_pressable);
criterion_main!(benches);
