//! Performance benchmarks for state variable operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use statevar::{SlotDefinition, StateCollection, StateTemplate, Stateful};

fn template_with_slots(count: usize) -> StateTemplate {
    let mut builder = StateTemplate::builder("Bench");
    for i in 0..count {
        builder = builder.slot(SlotDefinition::new(format!("slot_{}", i)));
    }
    builder.build()
}

fn bound_collection(template: &StateTemplate) -> StateCollection {
    let mut states = template.instantiate();
    states.bind_owner().unwrap();
    states
}

/// Benchmark set/get of a single slot
fn bench_set_get(c: &mut Criterion) {
    let template = template_with_slots(16);
    let states = bound_collection(&template);

    c.bench_function("slot_set", |b| {
        b.iter(|| {
            states.set("slot_0", json!(42)).unwrap();
        });
    });

    states.set("slot_0", json!(42)).unwrap();
    c.bench_function("slot_get", |b| {
        b.iter(|| {
            black_box(states.get("slot_0").unwrap());
        });
    });
}

/// Benchmark enabling every slot with varying slot counts
fn bench_enable_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("enable_all");

    for slot_count in [4, 16, 64, 256] {
        group.bench_with_input(
            BenchmarkId::new("slots", slot_count),
            &slot_count,
            |b, &count| {
                let template = template_with_slots(count);
                let states = bound_collection(&template);

                b.iter(|| {
                    states.enable("all").unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark instantiating a collection from a template
fn bench_instantiate(c: &mut Criterion) {
    let mut group = c.benchmark_group("instantiate");

    for slot_count in [4, 16, 64, 256] {
        group.bench_with_input(
            BenchmarkId::new("slots", slot_count),
            &slot_count,
            |b, &count| {
                let template = template_with_slots(count);

                b.iter(|| {
                    black_box(bound_collection(&template));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the save/restore serialization path
fn bench_save_restore(c: &mut Criterion) {
    let template = template_with_slots(16);
    let stateful = Stateful::new(&template).unwrap();
    for i in 0..16 {
        stateful
            .states()
            .set(&format!("slot_{}", i), json!([i, i + 1, i + 2]))
            .unwrap();
    }

    c.bench_function("save_states", |b| {
        b.iter(|| {
            black_box(stateful.save_states().unwrap());
        });
    });

    let saved = stateful.save_states().unwrap();
    c.bench_function("restore_states", |b| {
        b.iter(|| {
            black_box(Stateful::restore_states(&template, &saved).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_set_get,
    bench_enable_all,
    bench_instantiate,
    bench_save_restore,
);

criterion_main!(benches);
