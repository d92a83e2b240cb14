//! Measuring countdown.
//!
//! A [`SamplingWindow`] collects one sensor sample per tick and completes
//! after a fixed number of ticks with the rounded mean of what it collected.
//! The window itself is a plain state machine; [`Ticker`] drives it from a
//! tokio task when a real clock is wanted.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::logbook::rounded_mean;

pub const DEFAULT_SAMPLING_TICKS: u32 = 5;
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// A single reading from the ambient light sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorSample {
    Available(f64),
    Unavailable,
}

/// Source of the most recent sensor reading
pub trait SensorFeed: Send + Sync {
    fn latest(&self) -> SensorSample;
}

/// Outcome of feeding one tick to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowProgress {
    Pending { ticks_remaining: u32 },
    /// Rounded mean of the collected samples; `None` when none were available
    Complete(Option<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingWindow {
    ticks_total: u32,
    ticks_remaining: u32,
    samples: Vec<u32>,
}

impl Default for SamplingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLING_TICKS)
    }
}

impl SamplingWindow {
    /// A window of at least one tick
    pub fn new(ticks: u32) -> Self {
        let ticks = ticks.max(1);
        Self {
            ticks_total: ticks,
            ticks_remaining: ticks,
            samples: Vec::with_capacity(ticks as usize),
        }
    }

    pub fn ticks_total(&self) -> u32 {
        self.ticks_total
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    pub fn samples(&self) -> &[u32] {
        &self.samples
    }

    pub fn is_complete(&self) -> bool {
        self.ticks_remaining == 0
    }

    /// Consume one tick. Readings are rounded to whole lux; negative and
    /// non-finite readings count as missing.
    pub fn record(&mut self, sample: SensorSample) -> WindowProgress {
        if self.is_complete() {
            return WindowProgress::Complete(rounded_mean(self.samples.iter().copied()));
        }

        if let SensorSample::Available(lux) = sample {
            if lux.is_finite() && lux >= 0.0 {
                self.samples.push(lux.round().min(f64::from(u32::MAX)) as u32);
            }
        }
        self.ticks_remaining -= 1;

        if self.ticks_remaining == 0 {
            WindowProgress::Complete(rounded_mean(self.samples.iter().copied()))
        } else {
            WindowProgress::Pending {
                ticks_remaining: self.ticks_remaining,
            }
        }
    }
}

/// Periodic tick source backed by a tokio task
///
/// Emits the 1-based tick number on its channel, stops by itself after
/// `ticks` ticks, and is aborted on [`Ticker::cancel`] or drop.
#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(period: Duration, ticks: u32) -> (Self, mpsc::Receiver<u32>) {
        let (tx, rx) = mpsc::channel(ticks.max(1) as usize);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            // The first tick of a tokio interval fires immediately
            interval.tick().await;
            for tick in 1..=ticks {
                interval.tick().await;
                if tx.send(tick).await.is_err() {
                    debug!(tick, "Tick receiver dropped");
                    break;
                }
            }
        });

        (
            Self {
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a full window against a sensor feed at the given period
pub async fn sample_window(feed: &dyn SensorFeed, ticks: u32, period: Duration) -> Option<u32> {
    let mut window = SamplingWindow::new(ticks);
    let (_ticker, mut rx) = Ticker::spawn(period, window.ticks_total());

    while rx.recv().await.is_some() {
        if let WindowProgress::Complete(lux) = window.record(feed.latest()) {
            return lux;
        }
    }
    rounded_mean(window.samples().iter().copied())
}
