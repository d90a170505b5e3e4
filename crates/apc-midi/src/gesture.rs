//! Select button gesture detection
//!
//! Turns raw press/release timing into the two gestures the strip reacts to:
//! a short press-and-release, and a second press shortly after the first.
//! Timestamps are passed in so callers decide the clock.

use std::time::{Duration, Instant};

/// Compound gestures on a select button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectGesture {
    /// Released before the long-press threshold
    ReleasedImmediately,
    /// Pressed again within the double-click window
    DoubleClicked,
}

#[derive(Debug, Clone)]
pub struct ClickDetector {
    double_click_window: Duration,
    long_press: Duration,
    pressed_at: Option<Instant>,
    /// Press that may start a double click
    last_click: Option<Instant>,
}

impl ClickDetector {
    pub fn new(double_click_window: Duration, long_press: Duration) -> Self {
        Self {
            double_click_window,
            long_press,
            pressed_at: None,
            last_click: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Register a press; reports a double click when it closes one
    ///
    /// The press that completes a double click does not start another.
    pub fn press(&mut self, now: Instant) -> Option<SelectGesture> {
        self.pressed_at = Some(now);
        match self.last_click.take() {
            Some(first) if now.saturating_duration_since(first) <= self.double_click_window => {
                Some(SelectGesture::DoubleClicked)
            }
            _ => {
                self.last_click = Some(now);
                None
            }
        }
    }

    /// Register a release; reports a short press
    pub fn release(&mut self, now: Instant) -> Option<SelectGesture> {
        let pressed_at = self.pressed_at.take()?;
        if now.saturating_duration_since(pressed_at) < self.long_press {
            Some(SelectGesture::ReleasedImmediately)
        } else {
            // A held press never counts towards a double click
            self.last_click = None;
            None
        }
    }
}
