use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nettrace::*;

/// Ladder of `rungs` resistors between two rails, with a label on every
/// tenth rung and a ground symbol on the bottom rail.
fn resistor_ladder(rungs: usize) -> Schematic {
    let mut model = Schematic::new();
    let pitch = 40.0;
    let width = rungs as f64 * pitch;

    model
        .add_wire(Wire::segment(0.0, 0.0, width, 0.0).unwrap())
        .add_wire(Wire::segment(0.0, 200.0, width, 200.0).unwrap())
        .add_component(Component::ground("GND1", 0.0, 200.0));

    for i in 0..rungs {
        let x = i as f64 * pitch + pitch / 2.0;
        model
            .add_component(Component::new(
                format!("R{}", i + 1),
                ComponentKind::Resistor,
                vec![Pin::new("1", x, 60.0), Pin::new("2", x, 140.0)],
            ))
            .add_wire(Wire::segment(x, 0.0, x, 60.0).unwrap())
            .add_junction(Junction::new(x, 0.0));

        if i % 10 == 0 {
            model.add_label(NetLabel::new(format!("TAP{}", i / 10), x, 140.0));
        }
    }

    model
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("net_extraction");

    for rungs in [10, 50, 200].iter() {
        let model = resistor_ladder(*rungs);
        group.bench_with_input(BenchmarkId::new("ladder", rungs), &model, |b, model| {
            let extractor = NetExtractor::new();
            b.iter(|| {
                let mut model = model.clone();
                extractor.extract(&mut model)
            });
        });
    }

    group.finish();
}

fn bench_partition_only(c: &mut Criterion) {
    let model = resistor_ladder(200);
    c.bench_function("partition_200_rungs", |b| {
        b.iter(|| build_partition(&model, 10.0))
    });
}

criterion_group!(benches, bench_extraction, bench_partition_only);
criterion_main!(benches);
