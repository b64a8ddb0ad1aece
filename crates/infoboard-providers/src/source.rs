//! EventSource trait definition.
//!
//! An [`EventSource`] is one remote calendar polled by the aggregator. Each
//! source decides for itself when it is due again through a [`Cooldown`]:
//! a long normal interval after a good update and a shorter retry interval
//! once the aggregator has reported a failure.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

use infoboard_core::Event;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Keeps [`EventSource`] object-safe so the aggregator can hold a list of
/// heterogeneous backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A remote calendar that yields batches of events.
///
/// The aggregator drives the protocol:
///
/// 1. `ready()` decides whether the source is polled this cycle.
/// 2. `update()` performs exactly one fetch and decode.
/// 3. On `Err`, the aggregator calls `lower_cooldown()` so the next attempt
///    happens after the error cooldown rather than the normal one.
pub trait EventSource: Send {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Returns true if enough time has passed since the last attempt.
    fn ready(&self) -> bool;

    /// Fetches and decodes one batch.
    ///
    /// Always counts as an attempt for [`ready`](Self::ready). A success
    /// returns the source to the normal cooldown; a failure leaves the
    /// cooldown state as it was.
    fn update(&mut self) -> BoxFuture<'_, ProviderResult<Vec<Event>>>;

    /// Switches to the error cooldown until the next successful update.
    fn lower_cooldown(&mut self);

    /// Current cooldown state, for status reporting.
    fn state(&self) -> CooldownState;
}

/// Which interval currently gates a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    Normal,
    Backoff,
}

/// Timer pair shared by every backend.
#[derive(Debug, Clone)]
pub struct Cooldown {
    normal: Duration,
    error: Duration,
    last_attempt: Option<Instant>,
    had_error: bool,
}

impl Cooldown {
    /// One hour between good updates.
    pub const DEFAULT_NORMAL: Duration = Duration::from_secs(60 * 60);

    /// Ten minutes between retries after a failure.
    pub const DEFAULT_ERROR: Duration = Duration::from_secs(10 * 60);

    pub fn new(normal: Duration, error: Duration) -> Self {
        Self {
            normal,
            error,
            last_attempt: None,
            had_error: false,
        }
    }

    /// A source that has never been polled is always ready.
    pub fn ready(&self) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => last.elapsed() >= self.current(),
        }
    }

    /// The interval that applies right now.
    pub fn current(&self) -> Duration {
        if self.had_error {
            self.error
        } else {
            self.normal
        }
    }

    pub fn record_attempt(&mut self) {
        self.last_attempt = Some(Instant::now());
    }

    pub fn record_success(&mut self) {
        self.had_error = false;
    }

    pub fn lower(&mut self) {
        self.had_error = true;
    }

    pub fn state(&self) -> CooldownState {
        if self.had_error {
            CooldownState::Backoff
        } else {
            CooldownState::Normal
        }
    }

    pub fn normal(&self) -> Duration {
        self.normal
    }

    pub fn error(&self) -> Duration {
        self.error
    }

    /// Time elapsed since the last attempt, if there was one.
    pub fn since_last_attempt(&self) -> Option<Duration> {
        self.last_attempt.map(|last| last.elapsed())
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NORMAL, Self::DEFAULT_ERROR)
    }
}
