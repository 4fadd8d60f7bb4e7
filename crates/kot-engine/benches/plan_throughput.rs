use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kot_engine::{expand, Axis, Check, Fact, Outcome, Parametrize, Registry, Runner};
use serde_json::json;

fn axes() -> Vec<Axis> {
    vec![
        Axis {
            name: "disk".into(),
            values: (0..16).map(|i| json!(format!("sd{i}"))).collect(),
        },
        Axis {
            name: "threshold".into(),
            values: (0..8).map(|i| json!(i * 10)).collect(),
        },
        Axis {
            name: "strict".into(),
            values: vec![json!(true), json!(false)],
        },
    ]
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .add_fact(Fact::new("disks", |_| {
            Ok(json!((0..64).map(|i| format!("sd{i}")).collect::<Vec<_>>()))
        }))
        .expect("fact");
    registry
        .add_check(
            Check::new("disk_ok", |inputs| {
                let disk: String = inputs.get("disk")?;
                Ok(Outcome::pass(disk))
            })
            .with_needs(["disk"])
            .with_parametrize(Parametrize::from_fact("disk", "disks"))
            .with_parametrize(Parametrize::values("attempt", [1, 2, 3, 4])),
        )
        .expect("check");
    registry
}

fn bench_plan(c: &mut Criterion) {
    let axes = axes();
    c.bench_function("expand_256_instances", |b| {
        b.iter(|| expand(black_box("disk_ok"), black_box(&axes)))
    });

    let registry = registry();
    let runner = Runner::new();
    c.bench_function("run_256_instances", |b| {
        b.iter(|| runner.run(black_box(&registry)).expect("run"))
    });
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
