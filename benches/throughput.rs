use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringpipe::{Queue, QueueConfig};
use std::thread;

const MSG_PER_PRODUCER: u64 = 200_000;
const BATCH_SIZE: usize = 256;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_PER_PRODUCER));

    group.bench_function("single_producer_consumer", |b| {
        b.iter(|| {
            let queue = Queue::<u32>::new(QueueConfig::bounded(4096));
            let producer = queue.producer_handle();
            let consumer = queue.consumer_handle();
            drop(queue);

            let producer_handle = thread::spawn(move || {
                let batch = [0u32; BATCH_SIZE];
                let mut sent = 0u64;
                while sent < MSG_PER_PRODUCER {
                    let want = BATCH_SIZE.min((MSG_PER_PRODUCER - sent) as usize);
                    producer.push(&batch[..want]);
                    sent += want as u64;
                }
            });

            let mut buf = [0u32; BATCH_SIZE];
            let mut count = 0u64;
            while count < MSG_PER_PRODUCER {
                let n = consumer.pop(&mut buf);
                black_box(&buf[..n]);
                count += n as u64;
            }

            producer_handle.join().unwrap();
        });
    });

    group.finish();
}

fn bench_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpmc");

    for &num_producers in &[2usize, 4, 8] {
        let total_msgs = MSG_PER_PRODUCER * (num_producers as u64);
        group.throughput(Throughput::Elements(total_msgs));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_2C")),
            &num_producers,
            |b, &n| {
                b.iter(|| {
                    let queue = Queue::<u32>::new(QueueConfig::bounded(4096));

                    let producer_handles: Vec<_> = (0..n)
                        .map(|_| {
                            let producer = queue.producer_handle();
                            thread::spawn(move || {
                                let batch = [0u32; BATCH_SIZE];
                                let mut sent = 0u64;
                                while sent < MSG_PER_PRODUCER {
                                    let want = BATCH_SIZE.min((MSG_PER_PRODUCER - sent) as usize);
                                    producer.push(&batch[..want]);
                                    sent += want as u64;
                                }
                            })
                        })
                        .collect();

                    let consumer_handles: Vec<_> = (0..2)
                        .map(|_| {
                            let consumer = queue.consumer_handle();
                            thread::spawn(move || {
                                let mut buf = [0u32; BATCH_SIZE];
                                let mut count = 0u64;
                                loop {
                                    let n = consumer.pop(&mut buf);
                                    if n == 0 {
                                        break;
                                    }
                                    black_box(&buf[..n]);
                                    count += n as u64;
                                }
                                count
                            })
                        })
                        .collect();

                    drop(queue);

                    for h in producer_handles {
                        h.join().unwrap();
                    }
                    let total: u64 = consumer_handles.into_iter().map(|h| h.join().unwrap()).sum();
                    assert_eq!(total, total_msgs);
                });
            },
        );
    }

    group.finish();
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_sizes");
    group.throughput(Throughput::Elements(MSG_PER_PRODUCER));

    for &batch_size in &[32usize, 64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("batch_{batch_size}")),
            &batch_size,
            |b, &batch| {
                b.iter(|| {
                    let queue = Queue::<u32>::new(QueueConfig::bounded(4096));
                    let producer = queue.producer_handle();
                    let consumer = queue.consumer_handle();
                    drop(queue);

                    let producer_handle = thread::spawn(move || {
                        let chunk = vec![0u32; batch];
                        let mut sent = 0u64;
                        while sent < MSG_PER_PRODUCER {
                            let want = batch.min((MSG_PER_PRODUCER - sent) as usize);
                            producer.push(&chunk[..want]);
                            sent += want as u64;
                        }
                    });

                    let mut buf = vec![0u32; batch];
                    let mut count = 0u64;
                    while count < MSG_PER_PRODUCER {
                        let n = consumer.pop(&mut buf);
                        black_box(&buf[..n]);
                        count += n as u64;
                    }

                    producer_handle.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_small_ring_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let msgs = 20_000u64;
    for &num_producers in &[4usize, 8] {
        let total = msgs * (num_producers as u64);
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_small_ring")),
            &num_producers,
            |b, &n| {
                b.iter(|| {
                    let queue = Queue::<u32>::new(QueueConfig::bounded(64));

                    let handles: Vec<_> = (0..n)
                        .map(|_| {
                            let producer = queue.producer_handle();
                            thread::spawn(move || {
                                for i in 0..msgs {
                                    producer.push(&[i as u32]);
                                }
                            })
                        })
                        .collect();

                    let consumer = queue.consumer_handle();
                    drop(queue);
                    let consumer_handle = thread::spawn(move || {
                        let mut buf = [0u32; 1];
                        let mut count = 0u64;
                        while count < total {
                            count += consumer.pop(&mut buf) as u64;
                        }
                        count
                    });

                    for h in handles {
                        h.join().unwrap();
                    }
                    assert_eq!(consumer_handle.join().unwrap(), total);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_mpmc, bench_batch_sizes, bench_small_ring_contention);
criterion_main!(benches);
