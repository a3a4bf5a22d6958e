//! Example: bootstrap the cache layer and report per-domain statistics
//!
//! Run with: cargo run --example cache_stats -p anistream-infra
//!
//! Reads configuration the same way the application does (config file,
//! `.env`, `ANISTREAM_*` variables), restores persisted entries and prints
//! what each domain cache holds.

use anistream_infra::config::load;
use anistream_infra::{init_tracing, start_cache_runtime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load()?;
    init_tracing(&config.logging)?;

    let runtime = start_cache_runtime(&config)?;

    println!("AniStream cache layer");
    println!("=====================\n");
    println!("database: {}", config.cache.db_path);
    for (domain, stats) in runtime.caches.stats() {
        println!(
            "{:<9} {:>5}/{:<5} entries  {:>8} bytes  hit rate {:.1}%",
            domain.to_string(),
            stats.size,
            stats.max_size,
            stats.memory_usage_bytes,
            stats.hit_rate() * 100.0
        );
    }

    runtime.shutdown();
    Ok(())
}
