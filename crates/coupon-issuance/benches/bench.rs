use core::{hint::black_box, time::Duration};
use coupon_issuance::{
    CodeGenerator, IssuanceConfig, IssuanceCoordinator, NewCampaign, TimeSource, Timestamp,
};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::Barrier,
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    nanos: u64,
}

impl TimeSource for FixedMockTime {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_nanos(self.nanos)
    }
}

const NOW_NANOS: u64 = 1_742_911_351_203_015_000;

// Number of coupons issued per benchmark iteration (split across threads for
// multi-threaded runs).
const TOTAL_COUPONS: usize = 4096;

fn coordinator() -> IssuanceCoordinator<FixedMockTime> {
    IssuanceCoordinator::with_clock(
        IssuanceConfig::default(),
        FixedMockTime { nanos: NOW_NANOS },
    )
    .expect("default config is valid")
}

fn open_campaign(limit: u64) -> NewCampaign {
    let now = Timestamp::from_unix_nanos(NOW_NANOS);
    NewCampaign {
        coupon_limit: limit,
        name: "bench".into(),
        description: String::new(),
        start_at: now.saturating_sub(Duration::from_secs(3600)),
        end_at: now.saturating_add(Duration::from_secs(3600)),
    }
}

/// Renders codes back to back on one thread.
fn bench_code_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_generator");
    group.throughput(Throughput::Elements(TOTAL_COUPONS as u64));

    group.bench_function(format!("elems/{TOTAL_COUPONS}"), |b| {
        let codes = CodeGenerator::new("테스트").expect("valid prefix");
        let at = Timestamp::from_unix_nanos(NOW_NANOS);
        b.iter(|| {
            for _ in 0..TOTAL_COUPONS {
                black_box(codes.next_code(at).expect("serial space"));
            }
        });
    });

    group.finish();
}

/// Single-threaded issuance against a pool with room for every coupon.
fn bench_issue_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("issue/uncontended");
    group.throughput(Throughput::Elements(TOTAL_COUPONS as u64));

    group.bench_function(format!("elems/{TOTAL_COUPONS}"), |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            for _ in 0..iters {
                let coordinator = coordinator();
                let campaign = coordinator
                    .create_campaign(open_campaign(TOTAL_COUPONS as u64))
                    .expect("valid window");

                let start = Instant::now();
                for _ in 0..TOTAL_COUPONS {
                    black_box(coordinator.issue_coupon(campaign.id()).expect("capacity"));
                }
                elapsed += start.elapsed();
            }
            elapsed
        });
    });

    group.finish();
}

/// Many threads contending for one campaign's pool.
fn bench_issue_contended(c: &mut Criterion, threads: usize) {
    let mut group = c.benchmark_group(format!("issue/contended/threads/{threads}"));
    group.throughput(Throughput::Elements(TOTAL_COUPONS as u64));
    let per_thread = TOTAL_COUPONS / threads;

    group.bench_function(format!("elems/{TOTAL_COUPONS}"), |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            for _ in 0..iters {
                let coordinator = coordinator();
                let campaign = coordinator
                    .create_campaign(open_campaign(TOTAL_COUPONS as u64))
                    .expect("valid window");
                let barrier = Barrier::new(threads + 1);

                elapsed += scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            barrier.wait();
                            for _ in 0..per_thread {
                                black_box(coordinator.issue_coupon(campaign.id()).ok());
                            }
                        });
                    }
                    barrier.wait();
                    Instant::now()
                })
                .elapsed();
            }
            elapsed
        });
    });

    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_code_generator(c);
    bench_issue_uncontended(c);
    for threads in [2, 4, 8] {
        bench_issue_contended(c, threads);
    }
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
