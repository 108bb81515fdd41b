//! Benchmarks for mkr-signals
//!
//! Run with: cargo bench

use std::cell::Cell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mkr_signals::{listener, Context, Events, Listener, LocalEvent, LocalTarget, SignalRegistry};

fn counter(hits: &Rc<Cell<u64>>) -> Listener<LocalEvent> {
    let hits = hits.clone();
    listener(move |_| hits.set(hits.get() + 1))
}

// =============================================================================
// DISPATCH BENCHMARKS
// =============================================================================

fn bench_registry_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_dispatch");

    for count in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("listeners", count), &count, |b, &count| {
            let registry = SignalRegistry::new();
            let hits = Rc::new(Cell::new(0));
            for _ in 0..count {
                registry.add(counter(&hits), Context::none(), 0).unwrap();
            }
            let event = LocalEvent::new("click");

            b.iter(|| registry.dispatch(black_box(&event)))
        });
    }

    group.finish();
}

fn bench_native_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("native_fan_out");

    for count in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("listeners", count), &count, |b, &count| {
            let events = Events::new();
            let el = LocalTarget::new("el");
            let hits = Rc::new(Cell::new(0));
            for priority in 0..count {
                events
                    .on_with(&el, "click", counter(&hits), Context::none(), priority)
                    .unwrap();
            }
            let event = LocalEvent::new("click");

            b.iter(|| black_box(el.emit(&event)))
        });
    }

    group.finish();
}

// =============================================================================
// REGISTRATION BENCHMARKS
// =============================================================================

fn bench_on_off_churn(c: &mut Criterion) {
    let events = Events::new();
    let el = LocalTarget::new("el");
    let hits = Rc::new(Cell::new(0));
    let l = counter(&hits);

    c.bench_function("on_off_churn", |b| {
        b.iter(|| {
            events.on(&el, "click", l.clone()).unwrap();
            events.off(&el, Some("click"), Some(&l), &Context::none());
        })
    });
}

fn bench_once_fire(c: &mut Criterion) {
    let events = Events::new();
    let el = LocalTarget::new("el");
    let hits = Rc::new(Cell::new(0));
    let l = counter(&hits);
    let event = LocalEvent::new("click");

    c.bench_function("once_fire", |b| {
        b.iter(|| {
            events.once(&el, "click", l.clone()).unwrap();
            black_box(el.emit(&event))
        })
    });
}

fn bench_many_targets(c: &mut Criterion) {
    c.bench_function("bind_100_targets", |b| {
        let hits = Rc::new(Cell::new(0));
        let l = counter(&hits);
        b.iter(|| {
            let events = Events::<LocalTarget>::new();
            let targets: Vec<LocalTarget> =
                (0..100).map(|i| LocalTarget::new(format!("t{i}"))).collect();
            events.on(&targets, "click", l.clone()).unwrap();
            events.clear_listeners();
        })
    });
}

criterion_group!(dispatch_benches, bench_registry_dispatch, bench_native_fan_out);

criterion_group!(
    registration_benches,
    bench_on_off_churn,
    bench_once_fire,
    bench_many_targets,
);

criterion_main!(dispatch_benches, registration_benches);
