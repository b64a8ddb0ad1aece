//! The board's main loop.
//!
//! Every tick the driver polls the aggregator, reads the MOTD mailbox and
//! hands the result to a render callback. Sources decide for themselves
//! whether they are due, so a short tick does not mean frequent fetches.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use infoboard_core::Event;

use crate::aggregator::EventAggregator;
use crate::motd::{MotdMailbox, MotdSnapshot};

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Time between two polls and redraws.
    pub tick: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(1000),
        }
    }
}

impl DriverConfig {
    /// Builder: set tick interval.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

/// What the renderer sees on one tick.
#[derive(Debug)]
pub struct Frame<'a> {
    pub events: &'a [Event],
    /// True if a source delivered new data this tick.
    pub updated: bool,
    pub motd: MotdSnapshot,
}

/// Couples the aggregator with the mailbox and a tick timer.
pub struct Driver {
    config: DriverConfig,
    aggregator: EventAggregator,
    mailbox: MotdMailbox,
}

impl Driver {
    pub fn new(config: DriverConfig, aggregator: EventAggregator, mailbox: MotdMailbox) -> Self {
        Self {
            config,
            aggregator,
            mailbox,
        }
    }

    pub fn aggregator(&self) -> &EventAggregator {
        &self.aggregator
    }

    pub fn mailbox(&self) -> &MotdMailbox {
        &self.mailbox
    }

    /// Runs one poll and builds the frame for it.
    pub async fn tick(&mut self) -> Frame<'_> {
        let updated = self.aggregator.poll().await;
        let motd = self.mailbox.snapshot().await;
        Frame {
            events: self.aggregator.events(),
            updated,
            motd,
        }
    }

    /// Ticks until `shutdown` is cancelled. Returns the number of frames rendered.
    ///
    /// A poll in progress is finished before the token is looked at again.
    pub async fn run<F>(&mut self, shutdown: CancellationToken, mut render: F) -> u64
    where
        F: FnMut(&Frame<'_>),
    {
        info!(
            tick_ms = self.config.tick.as_millis() as u64,
            sources = self.aggregator.source_count(),
            "Driver started"
        );

        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let frame = self.tick().await;
                    if frame.updated {
                        debug!(count = frame.events.len(), "Events updated");
                    }
                    render(&frame);
                    frames += 1;
                }
            }
        }

        info!(frames, "Driver stopped");
        frames
    }
}
