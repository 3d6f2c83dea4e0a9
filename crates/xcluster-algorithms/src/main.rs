use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xcluster::attrs::names;
use xcluster::{AttributeSet, Controller, Document, Strategy};
use xcluster_algorithms::term_clustering::COMPONENT_TYPE;

fn sample_documents() -> Vec<Document> {
    [
        ("Rust ownership explained", "Borrowing and ownership rules in Rust"),
        ("Async Rust with tokio", "Futures, executors and async runtimes"),
        ("Tokio runtime internals", "How the tokio scheduler drives futures"),
        ("Ownership and lifetimes", "Lifetimes tie borrowing to scopes"),
        ("Sourdough starter guide", "Feeding and maintaining a starter"),
        ("Baking sourdough bread", "Hydration, starter activity and proofing"),
        ("Untitled", ""),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (title, snippet))| {
        Document::new()
            .with_id(i.to_string())
            .with_field("title", title)
            .with_field("snippet", snippet)
    })
    .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== xcluster demo ===\n");

    let controller = match Controller::builder()
        .components(xcluster_algorithms::register_builtin)
        .strategy(Strategy::Pooling)
        .max_idle_per_type(4)
        .drain_timeout(Duration::from_secs(5))
        .build()
    {
        Ok(controller) => Arc::new(controller),
        Err(e) => {
            eprintln!("Failed to build controller: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = controller.init(AttributeSet::new()) {
        eprintln!("Failed to initialize controller: {}", e);
        std::process::exit(1);
    }

    let documents = sample_documents();
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let controller = controller.clone();
            let documents = documents.clone();
            thread::spawn(move || {
                let request = AttributeSet::new()
                    .with(names::DOCUMENTS, documents)
                    .with(names::QUERY, "guide")
                    .with("worker", worker as i64);
                controller.process(request, COMPONENT_TYPE)
            })
        })
        .collect();

    for (worker, handle) in workers.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(result)) => {
                println!(
                    "worker {} ({} ms):",
                    worker,
                    result.processing_time_ms().unwrap_or_default()
                );
                for cluster in result.clusters() {
                    println!("  {} [{} docs]", cluster.label(), cluster.size());
                    for sub in cluster.subclusters() {
                        println!("    {} [{} docs]", sub.label(), sub.size());
                    }
                }
            }
            Ok(Err(e)) => eprintln!("worker {} failed: {}", worker, e),
            Err(_) => eprintln!("worker {} panicked", worker),
        }
    }

    let stats = controller.pool_stats(COMPONENT_TYPE);
    println!(
        "\npool: created={} idle={} peak={}",
        stats.created, stats.idle, stats.peak_checked_out
    );

    if let Err(e) = controller.dispose() {
        eprintln!("Dispose failed: {}", e);
        std::process::exit(1);
    }
}
