//! Streaming inference over the live price window.
//!
//! The model itself lives behind the [`Predictor`] seam; this module only
//! owns the trigger discipline: update the window on every tick, fire the
//! model exactly once per tick once the window is full, never in between.

use crate::{error::DataError, window::SlidingWindow};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Sequence-prediction model seam.
///
/// Receives one fixed-length ordered price sequence, returns one scalar
/// forecast. Model architecture, training and loading are out of scope; the
/// pipeline only needs this call. Synchronous on purpose: the trigger fires
/// once per push and must not overlap calls for one buffer instance.
pub trait Predictor {
    fn predict(&self, window: &[f64]) -> Result<f64, DataError>;
}

/// One scalar forecast produced from a full window.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Prediction {
    /// Last observed price in the window that produced the forecast.
    pub observed: f64,
    /// Model forecast for the next value.
    pub forecast: f64,
    pub time: DateTime<Utc>,
}

/// Couples a [`SlidingWindow`] with a [`Predictor`].
///
/// Each [`push`](Self::push) appends the observation and, iff the window is
/// full afterwards, submits the current window to the model and returns its
/// forecast. At most one firing per push, no coalescing, no skipped ticks. A
/// model failure surfaces as `Err` and leaves the window intact: the
/// observation was already absorbed, so the next tick proceeds normally.
#[derive(Debug)]
pub struct InferenceTrigger<Model> {
    window: SlidingWindow,
    model: Model,
}

impl<Model> InferenceTrigger<Model>
where
    Model: Predictor,
{
    pub fn new(capacity: usize, model: Model) -> Self {
        Self {
            window: SlidingWindow::new(capacity),
            model,
        }
    }

    /// Seed the window from recorded history so the first live tick can
    /// already produce a forecast.
    pub fn warm_start(&mut self, prices: &[f64]) {
        for &price in prices {
            self.window.push(price);
        }
        debug!(
            seeded = prices.len(),
            len = self.window.len(),
            ready = self.window.is_ready(),
            "warm started inference window"
        );
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Absorb one observation; `Ok(Some)` iff the window was full after the
    /// push, `Ok(None)` while still filling.
    pub fn push(&mut self, price: f64) -> Result<Option<Prediction>, DataError> {
        self.window.push(price);

        if !self.window.is_ready() {
            return Ok(None);
        }

        let forecast = self.model.predict(&self.window.to_vec())?;

        Ok(Some(Prediction {
            observed: price,
            forecast,
            time: Utc::now(),
        }))
    }
}

/// Naive persistence baseline: the next price is forecast to equal the last
/// observed one. Ships so the live binary runs end to end without a trained
/// model on disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersistenceModel;

impl Predictor for PersistenceModel {
    fn predict(&self, window: &[f64]) -> Result<f64, DataError> {
        window
            .last()
            .copied()
            .ok_or_else(|| DataError::Model("empty input window".to_string()))
    }
}
