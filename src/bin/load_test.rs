//! Load Testing Tool
//!
//! Fires concurrent 1-unit deposits at a single fresh wallet and checks that
//! none were lost.
//!
//! Run with: cargo run --bin load_test --release -- --requests 1000 --concurrency 100
//! Add `--memory` to skip the database, `--auto-provision` to let every caller
//! race through the create-if-missing path instead of creating the wallet first.

use std::sync::Arc;
use std::time::Instant;

use wallet_balance::{
    db, BalanceService, BalanceStore, Config, InMemoryBalanceStore, OperationContext,
    PgBalanceStore,
};

fn arg_value(args: &[String], flag: &str, default: usize) -> usize {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let total_requests = arg_value(&args, "--requests", 1000);
    let concurrency = arg_value(&args, "--concurrency", 100).max(1);
    let use_memory = args.iter().any(|a| a == "--memory");
    let auto_provision = args.iter().any(|a| a == "--auto-provision");

    let store: Arc<dyn BalanceStore> = if use_memory {
        println!("Load Test - in-memory store");
        Arc::new(InMemoryBalanceStore::new())
    } else {
        let database_url = std::env::var("DATABASE_URL")?;
        let config = Config::from_env()?;
        println!("Load Test - connecting to database...");
        let pool = db::connect(&config, &database_url).await?;
        db::run_migrations(&pool).await?;
        Arc::new(PgBalanceStore::new(pool))
    };

    let service = BalanceService::new(store);
    let wallet_id = uuid::Uuid::new_v4();
    let ctx = OperationContext::new();

    if !auto_provision {
        service.provision(&ctx, wallet_id).await?;
    }

    println!(
        "Issuing {} deposits across {} workers (auto-provision: {})",
        total_requests, concurrency, auto_provision
    );

    let start = Instant::now();
    let per_worker = total_requests / concurrency;
    let remainder = total_requests % concurrency;

    let mut workers = Vec::with_capacity(concurrency);
    for worker in 0..concurrency {
        let service = service.clone();
        let requests = per_worker + usize::from(worker < remainder);
        workers.push(tokio::spawn(async move {
            let ctx = OperationContext::new();
            let mut failures = 0u64;
            for _ in 0..requests {
                if service.deposit(&ctx, wallet_id, 1).await.is_err() {
                    failures += 1;
                }
            }
            failures
        }));
    }

    let mut failures = 0u64;
    for worker in workers {
        failures += worker.await?;
    }

    let elapsed = start.elapsed();
    let balance = service.get_balance(&ctx, wallet_id).await?;
    let succeeded = total_requests as u64 - failures;
    let rate = total_requests as f64 / elapsed.as_secs_f64();

    println!("\n=== Load Test Results ===");
    println!("Total requests: {}", total_requests);
    println!("Successful: {}", succeeded);
    println!("Failed: {}", failures);
    println!("Expected balance: {}", succeeded);
    println!("Actual balance: {}", balance);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} req/sec", rate);

    if balance.value() != succeeded as i64 {
        anyhow::bail!("lost updates detected: expected {}, got {}", succeeded, balance);
    }

    Ok(())
}
