#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use tracestat_core::{FlowTable, IndexChain, TimeNs};

const TTL: TimeNs = 1_000;

fn bench_index_chain_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_chain_churn");

    for capacity in [1024usize, 65536, 1 << 20] {
        group.throughput(criterion::Throughput::Elements(1));
        group.bench_function(format!("capacity_{}", capacity), |b| {
            let mut chain = IndexChain::with_capacity(capacity).unwrap();
            let mut now: TimeNs = 0;
            b.iter(|| {
                now += 1;
                if chain.is_full() {
                    chain.expire_one(now, 0);
                }
                let index = chain.allocate(now).unwrap();
                chain.rejuvenate(black_box(index), now).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_flow_table_insert_expire(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_table_insert_expire");

    for flows in [1024u32, 65536] {
        group.throughput(criterion::Throughput::Elements(1));
        group.bench_function(format!("flows_{}", flows), |b| {
            let mut table = FlowTable::with_capacity(flows as usize * 2).unwrap();
            let mut now: TimeNs = 0;
            let mut n = 0u32;
            b.iter(|| {
                now += 1;
                n = (n + 1) % flows;
                table.expire_all(now, TTL);
                black_box(table.insert((n, !n, 443u16), now).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_index_chain_churn,
    bench_flow_table_insert_expire
);
criterion_main!(benches);
