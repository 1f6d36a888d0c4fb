//! Render benchmarks for blinc_hooks
//!
//! Measures first-pass renders with many slots and renders dominated by
//! render-phase replays.

use blinc_hooks::{deps, ComponentId, HooksConfig, HooksRuntime, RenderPhase};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn benchmark_first_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_pass");

    for slots in [4usize, 32, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, &slots| {
            let mut rt = HooksRuntime::with_config(HooksConfig::quiet());
            b.iter(|| {
                let id = rt.next_component_id();
                rt.render(
                    id,
                    |rt, n: &usize, _: &()| {
                        let mut total = 0usize;
                        for i in 0..*n {
                            let (state, _) = rt.use_state(i)?;
                            let memo = rt.use_memo(|| state * 2, Some(deps![state]))?;
                            total += memo;
                        }
                        Ok(total)
                    },
                    &slots,
                    &(),
                )
                .map(black_box)
            })
        });
    }

    group.finish();
}

fn benchmark_replays(c: &mut Criterion) {
    let mut group = c.benchmark_group("replays");

    for passes in [1u32, 8, 24] {
        group.bench_with_input(BenchmarkId::from_parameter(passes), &passes, |b, &passes| {
            let mut rt = HooksRuntime::with_config(HooksConfig::quiet());
            b.iter(|| {
                rt.render(
                    ComponentId::from_raw(1),
                    |rt, target: &u32, _: &()| {
                        let (count, set_count) = rt.use_state(0u32)?;
                        let (log, dispatch) = rt.use_reducer(
                            |mut log: Vec<u32>, entry: u32| {
                                log.push(entry);
                                log
                            },
                            Vec::new(),
                        )?;
                        if count < *target {
                            set_count.update(rt, |n| n + 1)?;
                            dispatch.dispatch(rt, count)?;
                        }
                        Ok(log.len())
                    },
                    &passes,
                    &(),
                )
                .map(black_box)
            })
        });
    }

    group.finish();
}

fn benchmark_many_updates_one_pass(c: &mut Criterion) {
    c.bench_function("updates_folded_in_one_replay", |b| {
        let mut rt = HooksRuntime::with_config(HooksConfig::quiet());
        b.iter(|| {
            rt.render(
                ComponentId::from_raw(1),
                |rt, _: &(), _: &()| {
                    let (sum, set_sum) = rt.use_state(0u64)?;
                    if rt.phase() == RenderPhase::Rendering {
                        for i in 0..1_000u64 {
                            set_sum.update(rt, move |s| s + i)?;
                        }
                    }
                    Ok(sum)
                },
                &(),
                &(),
            )
            .map(black_box)
        })
    });
}

criterion_group!(
    benches,
    benchmark_first_pass,
    benchmark_replays,
    benchmark_many_updates_one_pass,
);
criterion_main!(benches);
