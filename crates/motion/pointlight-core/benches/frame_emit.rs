//! Benchmarks for per-frame pose evaluation and clip baking.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pointlight_core::{
    bake, build_skeleton, get_action, Attributes, BakingConfig, FrameEmitter, Jitter,
    MotionCompositor, SessionConfig,
};

fn bench_emit(c: &mut Criterion) {
    let skeleton = build_skeleton(&Attributes::default()).unwrap();
    let emitter = FrameEmitter::from_config(&SessionConfig::new("walk"), &skeleton);
    let jittered = FrameEmitter::from_config(&SessionConfig::new("walk"), &skeleton)
        .with_compositor(MotionCompositor::with_jitter(Jitter::from_seed(7, &skeleton)));

    for name in ["walk", "run", "wave", "sit_down"] {
        let action = get_action(name).unwrap();
        c.bench_function(&format!("emit_{name}"), |b| {
            b.iter(|| emitter.emit(&skeleton, &action, black_box(0.37)))
        });
    }

    let walk = get_action("walk").unwrap();
    c.bench_function("emit_walk_jittered", |b| {
        b.iter(|| jittered.emit(&skeleton, &walk, black_box(0.37)))
    });
}

fn bench_bake(c: &mut Criterion) {
    let skeleton = build_skeleton(&Attributes::default()).unwrap();
    let emitter = FrameEmitter::from_config(&SessionConfig::new("walk"), &skeleton);
    let walk = get_action("walk").unwrap();
    let config = BakingConfig {
        end_time: Some(10.0),
        ..BakingConfig::default()
    };

    c.bench_function("bake_walk_10s", |b| {
        b.iter(|| bake(&skeleton, &walk, &emitter, black_box(&config)))
    });
}

criterion_group!(benches, bench_emit, bench_bake);
criterion_main!(benches);
