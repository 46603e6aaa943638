use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use tether::value::{ValueHolder, ValueModel, ValueObserver};
use tether::{BufferedValue, Trigger};

fn holder_creation_benchmark(c: &mut Criterion) {
    c.bench_function("holder_creation", |b| {
        b.iter(|| {
            let holder: ValueHolder<i32> = ValueHolder::new(black_box(42));
            holder
        });
    });
}

fn holder_read_benchmark(c: &mut Criterion) {
    let holder: ValueHolder<i32> = ValueHolder::new(42);

    c.bench_function("holder_read", |b| {
        b.iter(|| {
            black_box(holder.value());
        });
    });
}

fn holder_write_benchmark(c: &mut Criterion) {
    let holder: ValueHolder<i32> = ValueHolder::new(0);

    c.bench_function("holder_write", |b| {
        let mut i = 0;
        b.iter(|| {
            holder.set_value(Some(black_box(i)));
            i += 1;
        });
    });
}

fn buffered_commit_benchmark(c: &mut Criterion) {
    let subject = Arc::new(ValueHolder::new(0));
    let trigger = Arc::new(Trigger::new());
    let buffered = BufferedValue::new(
        subject as Arc<dyn ValueModel<i32>>,
        trigger.clone(),
    );

    c.bench_function("buffered_commit", |b| {
        let mut i = 0;
        b.iter(|| {
            buffered.set_value(Some(black_box(i)));
            trigger.trigger_commit();
            i += 1;
        });
    });
}

fn notify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("holder_notify");

    for observer_count in [1, 10, 100].iter() {
        let holder = Arc::new(ValueHolder::new(0usize));

        // The registry holds observers weakly; keep them alive here.
        let mut observers = Vec::new();
        for _ in 0..*observer_count {
            let observer: Arc<ValueObserver<usize>> = Arc::new(|_, _| {
                // Empty observer
            });
            holder.add_observer(&observer);
            observers.push(observer);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(observer_count),
            observer_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    holder.set_value(Some(black_box(i)));
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    holder_creation_benchmark,
    holder_read_benchmark,
    holder_write_benchmark,
    buffered_commit_benchmark,
    notify_benchmark,
);
criterion_main!(benches);
