use boardgraph::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn bench_place_remove_churn(c: &mut Criterion) {
    let catalog = ComponentCatalog::builtin();
    let resistor = catalog.get("resistor").cloned().unwrap();

    c.bench_function("place_bind_remove_100", |b| {
        b.iter(|| {
            let mut board = BoardGraph::default();
            let net = board.create_net("BUS").net_id;
            let mut placed = Vec::with_capacity(100);
            for i in 0..100 {
                let id = board
                    .place_definition(&resistor, GridPosition::new(i * 3, 0), 0, None, false)
                    .unwrap()
                    .instance_id;
                let pin = board.pin_ref(id, 0).unwrap();
                board.connect_pin_to_net(net, &pin).unwrap();
                placed.push(id);
            }
            for id in placed {
                board.remove_component(black_box(id));
            }
            board
        });
    });
}

fn bench_check_stage(c: &mut Criterion) {
    let path = fixture_path("divider.json");
    c.bench_function("check_divider_stage", |b| {
        b.iter(|| BoardCheck::check_stage(black_box(&path), &CheckOptions::default()));
    });
}

criterion_group!(benches, bench_place_remove_churn, bench_check_stage);
criterion_main!(benches);
