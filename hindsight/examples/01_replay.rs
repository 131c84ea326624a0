//! Replay two mock series through the cache and print each merged record.
//!
//! Run with `RUST_LOG=debug` to watch page fetches when the `tracing`
//! feature is enabled.

use std::sync::Arc;

use hindsight::{Backtest, Chain, Protocol, Resolution, SourceInfo};
use hindsight_mock::{MemoryStore, MockSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let hourly = Arc::new(MockSource::new(SourceInfo::new(
        Chain::Arbitrum,
        Protocol::Aave,
        Resolution::Hour,
    )));
    let daily = Arc::new(MockSource::new(SourceInfo::new(
        Chain::Ethereum,
        Protocol::CurveDex,
        Resolution::Day,
    )));

    let mut bt = Backtest::builder(0, 2 * 86_400)
        .with_source(hourly)
        .with_source(daily)
        .with_store(Arc::new(MemoryStore::new()))
        .build()?;

    bt.on_data(|snap| async move {
        let sources: Vec<&String> = snap.data.keys().collect();
        println!("t={:>6}  sources={sources:?}", snap.timestamp);
        Ok(())
    });

    bt.run().await?;

    // A second run over the same window is served from the store.
    bt.run().await?;
    Ok(())
}
