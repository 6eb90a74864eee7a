use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fetchpipe::config::PipelineConfig;
use fetchpipe::pipeline::{self, FileResult, Job, ProcessError};
use fetchpipe::transfer::MemoryTransfer;
use std::sync::Arc;

const NUM_FILES: usize = 1000;

fn setup(file_size: usize) -> (Arc<MemoryTransfer>, Vec<Job>) {
    let payload = Bytes::from(vec![b'x'; file_size]);

    let mut transfer = MemoryTransfer::new();
    let mut jobs = Vec::with_capacity(NUM_FILES);
    for i in 0..NUM_FILES {
        let path = format!("/remote/file_{}.bin", i);
        transfer.insert(path.clone(), payload.clone());
        jobs.push(Job::new(format!("id_{}", i), path));
    }

    (Arc::new(transfer), jobs)
}

async fn reject_empty(result: FileResult) -> Result<(), ProcessError> {
    if result.data.is_empty() {
        return Err(ProcessError::Rejected(format!("empty data for {}", result.id)));
    }
    Ok(())
}

fn bench_default_config(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (transfer, jobs) = setup(500 * 1024);
    let config = PipelineConfig::default();

    let mut group = c.benchmark_group("transfer_files");
    group.throughput(Throughput::Elements(NUM_FILES as u64));
    group.sample_size(20);

    group.bench_function("default_500kb", |b| {
        b.to_async(&runtime).iter(|| {
            let transfer = Arc::clone(&transfer);
            let jobs = jobs.clone();
            async move {
                let summary = pipeline::run(&config, transfer, jobs, Arc::new(reject_empty))
                    .await
                    .unwrap();
                assert_eq!(summary.transferred, NUM_FILES as u64);
            }
        });
    });

    group.finish();
}

fn bench_various_configs(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (transfer, jobs) = setup(100 * 1024);

    let configs = [
        ("Default", PipelineConfig::default()),
        (
            "HighReaders",
            PipelineConfig {
                fetch_concurrency: 200,
                process_concurrency: 10,
                buffer_size: 10,
            },
        ),
        (
            "HighWorkers",
            PipelineConfig {
                fetch_concurrency: 80,
                process_concurrency: 50,
                buffer_size: 10,
            },
        ),
        (
            "LargeBuffer",
            PipelineConfig {
                fetch_concurrency: 80,
                process_concurrency: 10,
                buffer_size: 100,
            },
        ),
    ];

    let mut group = c.benchmark_group("transfer_files_configs");
    group.throughput(Throughput::Elements(NUM_FILES as u64));
    group.sample_size(20);

    for (name, config) in configs {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.to_async(&runtime).iter(|| {
                let config = *config;
                let transfer = Arc::clone(&transfer);
                let jobs = jobs.clone();
                async move {
                    let summary = pipeline::run(&config, transfer, jobs, Arc::new(reject_empty))
                        .await
                        .unwrap();
                    assert_eq!(summary.failed, 0);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_default_config, bench_various_configs);
criterion_main!(benches);
