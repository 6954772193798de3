//! Live inference binary: warm-started sliding window over the trade feed.
//!
//! Probes the current ticker price, seeds the window with the most recent
//! close prices so the first live tick can already produce a forecast, then
//! consumes the WebSocket trade stream until ctrl-c. The feed task and this
//! consumer share nothing but the tick channel; stopping simply lets the
//! buffer stop growing.

use tickflow_data::{
    error::DataError,
    exchange::binance::BinanceClient,
    inference::{InferenceTrigger, PersistenceModel},
    live::spawn_trade_feed,
};
use tickflow_pipeline::{init_logging, PipelineConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    init_logging();

    let config = PipelineConfig::from_env();
    info!(
        symbol = config.symbol,
        window_capacity = config.window_capacity,
        "starting live inference"
    );

    if let Err(error) = run(&config).await {
        error!(%error, "live inference failed");
        std::process::exit(1);
    }
}

async fn run(config: &PipelineConfig) -> Result<(), DataError> {
    let client = BinanceClient::new(config.binance_config())?;

    // Startup probe, logged for operators; inference only uses the feed.
    match client.ticker_price(&config.symbol).await {
        Ok(price) => info!(symbol = config.symbol, price, "current ticker price"),
        Err(error) => warn!(symbol = config.symbol, %error, "ticker price probe failed"),
    }

    let mut trigger = InferenceTrigger::new(config.window_capacity, PersistenceModel);

    match client
        .recent_klines(&config.symbol, config.window_capacity as u32)
        .await
    {
        Ok(klines) => {
            let closes: Vec<f64> = klines.iter().map(|kline| kline.close).collect();
            trigger.warm_start(&closes);
            info!(
                seeded = closes.len(),
                ready = trigger.window().is_ready(),
                "window warm started from recent candles"
            );
        }
        Err(error) => {
            warn!(%error, "warm start failed, window fills from live ticks only");
        }
    }

    let (mut tick_rx, stop_tx, feed_handle) =
        spawn_trade_feed(config.feed_config(), config.symbol.clone());

    loop {
        tokio::select! {
            tick = tick_rx.recv() => {
                match tick {
                    Some(tick) => match trigger.push(tick.price) {
                        Ok(Some(prediction)) => {
                            info!(
                                observed = prediction.observed,
                                forecast = prediction.forecast,
                                "next price forecast"
                            );
                        }
                        Ok(None) => {
                            info!(
                                len = trigger.window().len(),
                                capacity = trigger.window().capacity(),
                                "window filling"
                            );
                        }
                        Err(error) => {
                            warn!(%error, "model call failed, window unaffected");
                        }
                    },
                    None => {
                        info!("trade feed channel closed");
                        break;
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(%error, "ctrl-c handler failed, stopping anyway");
                }
                info!("shutdown requested, stopping trade feed");
                let _ = stop_tx.send(true);
            }
        }
    }

    let _ = feed_handle.await;
    info!("live inference stopped");
    Ok(())
}
