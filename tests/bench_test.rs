//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release bench -- --ignored --nocapture

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tempfile::TempDir;

use bookfinder::catalog::parse_products;
use bookfinder::config::Config;
use bookfinder::matcher::{AllTokens, KeywordMatcher};
use bookfinder::model::{ProfileFields, Sender};
use bookfinder::service::CatalogService;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_us = duration.as_micros() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}us", avg_us);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn synthetic_catalog(size: usize) -> String {
    (0..size)
        .map(|i| format!("Book Number {i} Volume\nebook: http://x/{i}\npaperback: http://p/{i}\n\n"))
        .collect()
}

#[test]
#[ignore]
fn bench_parse_catalog() {
    println!("\n=== Benchmark: Parse Catalog ===\n");

    let text = synthetic_catalog(5000);
    benchmark("Parse 5000 records", 100, || {
        let products = parse_products(&text);
        assert_eq!(products.len(), 5000);
    });
}

#[test]
#[ignore]
fn bench_find_products() {
    println!("\n=== Benchmark: Find Products ===\n");

    let catalog = parse_products(&synthetic_catalog(5000));
    let any = KeywordMatcher::default();
    let all = KeywordMatcher::new(AllTokens);

    benchmark("AnyToken, matching query", 1000, || {
        let _ = any.find("looking for volume 42", &catalog);
    });
    benchmark("AnyToken, no match", 1000, || {
        let _ = any.find("gardening", &catalog);
    });
    benchmark("AllTokens, matching query", 1000, || {
        let _ = all.find("book volume", &catalog);
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn bench_concurrent_record_message() {
    println!("\n=== Benchmark: Concurrent Record Message ===\n");

    let dir = TempDir::new().unwrap();
    let config = Config::in_dir(dir.path());
    fs::write(&config.products_path, synthetic_catalog(10)).unwrap();
    fs::write(&config.review_links_path, "").unwrap();
    let service = Arc::new(CatalogService::from_config(&config).unwrap());

    let num_tasks = 50;
    let ops_per_task = 10;

    println!("  Running {} concurrent tasks with {} ops each...", num_tasks, ops_per_task);

    let start = Instant::now();
    let mut handles = vec![];

    for task_id in 0..num_tasks {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            for op_id in 0..ops_per_task {
                service
                    .record_message(
                        task_id,
                        &ProfileFields::default(),
                        format!("message {op_id}"),
                        Sender::User,
                        Utc::now(),
                    )
                    .await;
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let duration = start.elapsed();
    let total_ops = num_tasks * ops_per_task;
    let ops_per_sec = total_ops as f64 / duration.as_secs_f64();

    assert_eq!(service.conversations().len(), num_tasks as usize);
    println!("  Total operations: {}", total_ops);
    println!("  Total time: {:?}", duration);
    println!("  Throughput: {:.0} ops/sec\n", ops_per_sec);
}
