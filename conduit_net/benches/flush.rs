// Benchmarks for network recomputation.
//
// Measures the two flush shapes that dominate in play: building a long pipe
// run from scratch (every node pending), and cutting that run in the middle
// (two neighbors pending, two components rebuilt).
//
// Run with: cargo bench -p conduit_net --bench flush

use conduit_net::config::NetworkConfig;
use conduit_net::pipe::PipeHost;
use conduit_net::types::{VoxelCoord, WorldId};
use conduit_net::{NetworkCache, NetworkManager};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;

struct Members(usize);

impl NetworkCache for Members {
    type Host = PipeHost;
    fn separate(&mut self) {}
}

const WORLD: WorldId = WorldId(0);

fn line(len: i32) -> (NetworkManager<Members>, Vec<Rc<PipeHost>>) {
    let mut manager =
        NetworkManager::<Members>::new(|members| Members(members.len()), NetworkConfig::default());
    let mut hosts = Vec::new();
    for x in 0..len {
        let host = Rc::new(PipeHost::new());
        manager
            .add_node(WORLD, VoxelCoord::new(x, 0, 0), Rc::clone(&host))
            .unwrap();
        hosts.push(host);
    }
    (manager, hosts)
}

fn bench_build_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_line");
    for len in [64, 1024, 16384] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_with_setup(
                || line(len).0,
                |mut manager| {
                    manager.flush();
                    black_box(manager.network_count())
                },
            );
        });
    }
    group.finish();
}

fn bench_cut_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("cut_line");
    for len in [64, 1024, 16384] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_with_setup(
                || {
                    let (mut manager, hosts) = line(len);
                    manager.flush();
                    (manager, hosts)
                },
                |(mut manager, hosts)| {
                    let mid = len / 2;
                    manager
                        .remove_node(WORLD, VoxelCoord::new(mid, 0, 0), &hosts[mid as usize])
                        .unwrap();
                    manager.flush();
                    black_box(manager.network_count())
                },
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_line, bench_cut_line);
criterion_main!(benches);
