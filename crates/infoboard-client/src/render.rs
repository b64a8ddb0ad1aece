//! Plain-terminal rendering of driver frames.
//!
//! The board redraws the whole screen every tick: a status line with the
//! clock and the current system message, the MOTD if there is one, and one
//! block per event. Highlighted event names blink.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{Datelike, NaiveDateTime};
use tokio::time::Instant;

use infoboard_core::{Event, Interval};
use infoboard_server::Frame;

const CLEAR: &str = "\x1b[2J\x1b[H";
const BOLD: &str = "\x1b[1m";
const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

/// How long "Events updated!" stays visible.
pub const UPDATE_MESSAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Blink half-period for highlighted names.
pub const BLINK_INTERVAL: Duration = Duration::from_secs(1);

/// A system message with an expiry.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<(String, Instant, Duration)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: impl Into<String>, timeout: Duration) {
        self.message = Some((message.into(), Instant::now(), timeout));
    }

    /// The message, or `None` once it has timed out.
    pub fn current(&mut self) -> Option<&str> {
        if let Some((_, set_at, timeout)) = &self.message
            && set_at.elapsed() >= *timeout
        {
            self.message = None;
        }
        self.message.as_ref().map(|(text, _, _)| text.as_str())
    }
}

/// Toggles between two states at a fixed interval.
#[derive(Debug)]
pub struct Blink {
    interval: Duration,
    last_toggle: Instant,
    on: bool,
}

impl Blink {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_toggle: Instant::now(),
            on: true,
        }
    }

    pub fn phase(&mut self) -> bool {
        if self.last_toggle.elapsed() >= self.interval {
            self.on = !self.on;
            self.last_toggle = Instant::now();
        }
        self.on
    }
}

/// Writes frames to a terminal.
pub struct TextRenderer<W> {
    out: W,
    status: StatusLine,
    blink: Blink,
    clear: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status: StatusLine::new(),
            blink: Blink::new(BLINK_INTERVAL),
            clear: true,
        }
    }

    /// Disables the clear-screen sequence.
    pub fn without_clear(mut self) -> Self {
        self.clear = false;
        self
    }

    pub fn status(&mut self) -> &mut StatusLine {
        &mut self.status
    }

    /// Draws one frame. `now` is the local wall-clock time.
    pub fn render(&mut self, frame: &Frame<'_>, now: NaiveDateTime) -> io::Result<()> {
        if frame.updated {
            self.status.set("Events updated!", UPDATE_MESSAGE_TIMEOUT);
        }
        let blink_on = self.blink.phase();

        let mut text = String::new();
        if self.clear {
            text.push_str(CLEAR);
        }

        text.push_str(&now.format("%H:%M:%S").to_string());
        if let Some(message) = self.status.current() {
            text.push_str("  ");
            text.push_str(message);
        }
        text.push_str("\n\n");

        if let Some(motd) = &frame.motd.text {
            text.push_str(&format!("{BOLD}{motd}{RESET}\n\n"));
        }

        if frame.events.is_empty() {
            text.push_str("No events   :(\n");
        }
        for event in frame.events {
            text.push_str(&event_block(event, now, blink_on));
            text.push('\n');
        }

        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn event_block(event: &Event, now: NaiveDateTime, blink_on: bool) -> String {
    let style = if event.is_highlighted() && blink_on {
        format!("{REVERSE}{BOLD}")
    } else {
        BOLD.to_string()
    };

    let mut block = format!("{style}{}{RESET}\n", event.name());
    if let Some(location) = event.location() {
        block.push_str(location);
        block.push('\n');
    }
    block.push_str(&format!(
        "{}  {}\n",
        format_when(event.interval()),
        format_until(event.start(), now)
    ));
    block
}

fn format_day(at: NaiveDateTime) -> String {
    format!("{} {}. of {} {}", at.format("%a"), at.day(), at.format("%b"), at.year())
}

/// `On Tue 4. of Mar 2025 from 10:15 to 12:00`, or a `From ... to ...`
/// range when the event spans days.
pub fn format_when(interval: &Interval) -> String {
    let (start, end) = (interval.start(), interval.end());
    if start.date() == end.date() {
        format!(
            "On {} from {} to {}",
            format_day(start),
            start.format("%H:%M"),
            end.format("%H:%M")
        )
    } else {
        format!(
            "From {} {} to {} {}",
            format_day(start),
            start.format("%H:%M"),
            format_day(end),
            end.format("%H:%M")
        )
    }
}

/// Relative start time: `In 2 d 3 h`, `In 1 h 5 m`, `In 12 m`, `In a jiffy`
/// or `In progress`.
pub fn format_until(start: NaiveDateTime, now: NaiveDateTime) -> String {
    let until = start - now;
    if until < chrono::Duration::zero() {
        return "In progress".to_string();
    }

    let hours = until.num_hours();
    let minutes = until.num_minutes() % 60;
    if hours > 24 {
        format!("In {} d {} h", hours / 24, hours % 24)
    } else if hours > 0 {
        format!("In {hours} h {minutes} m")
    } else if minutes > 0 {
        format!("In {minutes} m")
    } else {
        "In a jiffy".to_string()
    }
}
