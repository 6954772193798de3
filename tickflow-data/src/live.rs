//! Live trade-tick feed over the exchange WebSocket.
//!
//! Connects to the raw `<symbol>@trade` stream, parses each message into a
//! [`TradeTick`] and forwards it over an mpsc channel to the streaming
//! consumer. Reconnects with a fixed delay on disconnect; a malformed tick is
//! dropped with a logged warning and never reaches the inference buffer.

use crate::{
    error::DataError,
    exchange::binance::{WS_BASE_URL_BINANCE_SPOT, trade::BinanceTradeEvent},
    record::TradeTick,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Feed configuration.
///
/// `Default` targets the production spot stream; tests point `ws_base_url` at
/// a local fixture server.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub ws_base_url: String,
    pub reconnect_delay: Duration,
    pub channel_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_base_url: WS_BASE_URL_BINANCE_SPOT.to_string(),
            reconnect_delay: Duration::from_secs(2),
            channel_buffer_size: 1000,
        }
    }
}

impl FeedConfig {
    pub fn with_ws_base_url(mut self, url: impl Into<String>) -> Self {
        self.ws_base_url = url.into();
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }
}

/// Raw-stream URL for one symbol, eg/
/// `wss://stream.binance.com:9443/ws/btcusdt@trade`.
pub fn trade_stream_url(base: &str, symbol: &str) -> Result<url::Url, DataError> {
    let raw = format!("{}/{}@trade", base, symbol.to_lowercase());
    url::Url::parse(&raw).map_err(|error| DataError::Transport(format!("invalid feed url: {error}")))
}

/// Spawn the feed task for `symbol`.
///
/// Returns the tick receiver and a stop handle. The task reconnects forever
/// until the stop signal flips, then closes the connection and drops its
/// sender, which ends the receiver stream; the consumer drains what is
/// buffered and stops. Every forwarded tick is a complete observation, so
/// shutdown needs no rollback on the consumer side.
pub fn spawn_trade_feed(
    config: FeedConfig,
    symbol: impl Into<String>,
) -> (
    mpsc::Receiver<TradeTick>,
    watch::Sender<bool>,
    tokio::task::JoinHandle<()>,
) {
    let symbol = symbol.into();
    let (tick_tx, tick_rx) = mpsc::channel(config.channel_buffer_size);
    let (stop_tx, stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        run_feed_loop(config, symbol, tick_tx, stop_rx).await;
    });

    (tick_rx, stop_tx, handle)
}

async fn run_feed_loop(
    config: FeedConfig,
    symbol: String,
    tick_tx: mpsc::Sender<TradeTick>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let url = match trade_stream_url(&config.ws_base_url, &symbol) {
        Ok(url) => url,
        Err(error) => {
            warn!(symbol, %error, "cannot build feed url, feed task exiting");
            return;
        }
    };

    info!(symbol, %url, "starting live trade feed");

    while !*stop_rx.borrow() {
        match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => {
                info!(symbol, "trade feed connected");
                let (_, mut read) = ws_stream.split();

                loop {
                    tokio::select! {
                        changed = stop_rx.changed() => {
                            if changed.is_err() || *stop_rx.borrow() {
                                info!(symbol, "stop signal received, closing trade feed");
                                return;
                            }
                        }
                        message = read.next() => {
                            match message {
                                Some(Ok(Message::Text(text))) => {
                                    forward_tick(&symbol, &text, &tick_tx).await;
                                }
                                // Pings are answered by tungstenite itself.
                                Some(Ok(_)) => {}
                                Some(Err(error)) => {
                                    warn!(symbol, %error, "trade feed stream error, reconnecting");
                                    break;
                                }
                                None => {
                                    warn!(symbol, "trade feed closed by server, reconnecting");
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            Err(error) => {
                warn!(symbol, %error, "trade feed connection failed, retrying");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            _ = stop_rx.changed() => {}
        }
    }

    info!(symbol, "trade feed stopped");
}

/// Parse one raw message and forward it; a tick missing or mangling the price
/// field is dropped here and never corrupts the downstream window.
async fn forward_tick(symbol: &str, text: &str, tick_tx: &mpsc::Sender<TradeTick>) {
    match serde_json::from_str::<BinanceTradeEvent>(text) {
        Ok(event) => {
            let tick = TradeTick::from(event);
            debug!(symbol, price = tick.price, "live trade tick");
            if tick_tx.send(tick).await.is_err() {
                debug!(symbol, "tick receiver dropped, discarding tick");
            }
        }
        Err(error) => {
            warn!(symbol, %error, payload = text, "dropping malformed live tick");
        }
    }
}
