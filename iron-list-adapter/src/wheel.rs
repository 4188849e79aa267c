use crate::quirks::PlatformQuirks;

/// Unit of a wheel event's delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WheelDeltaMode {
    Pixel,
    Line,
    Page,
}

/// A main-axis wheel event as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WheelEvent {
    pub delta: f32,
    pub delta_mode: WheelDeltaMode,
}

impl WheelEvent {
    pub fn pixel(delta: f32) -> Self {
        Self {
            delta,
            delta_mode: WheelDeltaMode::Pixel,
        }
    }

    pub fn line(delta: f32) -> Self {
        Self {
            delta,
            delta_mode: WheelDeltaMode::Line,
        }
    }

    pub fn page(delta: f32) -> Self {
        Self {
            delta,
            delta_mode: WheelDeltaMode::Page,
        }
    }

    pub(crate) fn to_pixels(self, viewport_size: u32, quirks: &impl PlatformQuirks) -> i64 {
        let unit = match self.delta_mode {
            WheelDeltaMode::Pixel => 1.0,
            WheelDeltaMode::Line => quirks.line_height_px() as f32,
            WheelDeltaMode::Page => quirks.page_height_px(viewport_size) as f32,
        };
        round_to_i64(self.delta * unit)
    }
}

fn round_to_i64(value: f32) -> i64 {
    if value >= 0.0 {
        (value + 0.5) as i64
    } else {
        (value - 0.5) as i64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WheelOutcome {
    /// Part of an inertial tail being swallowed.
    Ignored,
    /// Queued behind a pending frame; applied when the frame runs.
    Deferred,
    /// Apply this many pixels (includes any previously queued deltas).
    Scroll(i64),
}

/// Cross-frame wheel bookkeeping: accumulates deltas while a frame is
/// pending, and swallows residual momentum after a scroll was yielded to an
/// ancestor.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WheelState {
    accumulated: i64,
    last_delta: i64,
    ignore_until: Option<u64>,
}

impl WheelState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_wheel(&mut self, pixels: i64, frame_pending: bool, now_ms: u64) -> WheelOutcome {
        if let Some(until) = self.ignore_until {
            if now_ms < until {
                // Momentum tail: same direction, magnitude not growing. A
                // fresh gesture breaks the ignore window immediately.
                let momentum_tail =
                    pixels.signum() == self.last_delta.signum() && pixels.abs() <= self.last_delta.abs();
                if momentum_tail {
                    self.last_delta = pixels;
                    return WheelOutcome::Ignored;
                }
            }
            self.ignore_until = None;
        }
        self.last_delta = pixels;

        if frame_pending {
            self.accumulated += pixels;
            return WheelOutcome::Deferred;
        }
        let total = self.accumulated + pixels;
        self.accumulated = 0;
        WheelOutcome::Scroll(total)
    }

    pub(crate) fn begin_ignore(&mut self, until_ms: u64) {
        self.ignore_until = Some(until_ms);
    }

    pub(crate) fn take_accumulated(&mut self) -> i64 {
        core::mem::take(&mut self.accumulated)
    }
}
