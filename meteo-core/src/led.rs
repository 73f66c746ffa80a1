//! Status LED driven by the current significance level
//!
//! The LED reflects the *current* level on every tick; nothing is latched:
//!
//! | level | LED |
//! |---|---|
//! | severe | red, blinking with a fixed half-period |
//! | moderate | steady dim blue |
//! | none | steady dim green |
//!
//! Steady colors are re-sent every tick, which relies on the annunciator
//! being idempotent. Blinking only writes when the half-period has elapsed.

use fugit::MillisDurationU32;

use crate::detector::Significance;
use crate::errors::StationResult;
use crate::time::{IntervalTimer, Ticks};
use crate::traits::{Annunciator, Rgb};

/// Idle: dim green
pub const IDLE_COLOR: Rgb = Rgb {
    r: 0.0,
    g: 0.2,
    b: 0.0,
};

/// Moderate change: dim blue
pub const MODERATE_COLOR: Rgb = Rgb {
    r: 0.0,
    g: 0.0,
    b: 0.2,
};

/// Severe change, lit phase of the blink
pub const SEVERE_COLOR: Rgb = Rgb {
    r: 1.0,
    g: 0.0,
    b: 0.0,
};

/// Level-driven LED state machine
#[derive(Debug, Clone)]
pub struct LedController {
    blink: IntervalTimer,
    lit: bool,
}

impl LedController {
    pub fn new(blink_interval: MillisDurationU32, now: Ticks) -> Self {
        Self {
            blink: IntervalTimer::due_at(blink_interval, now),
            lit: false,
        }
    }

    /// Whether the blinking LED is currently in its lit phase
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Color to write this tick, if any
    pub fn update(&mut self, now: Ticks, significance: Significance) -> Option<Rgb> {
        match significance {
            Significance::Severe => {
                if !self.blink.is_due(now) {
                    return None;
                }
                self.lit = !self.lit;
                self.blink.mark(now);
                Some(if self.lit { SEVERE_COLOR } else { Rgb::OFF })
            }
            Significance::Moderate => {
                self.lit = false;
                Some(MODERATE_COLOR)
            }
            Significance::None => {
                self.lit = false;
                Some(IDLE_COLOR)
            }
        }
    }

    /// Update and push the color to the LED
    pub fn apply(
        &mut self,
        now: Ticks,
        significance: Significance,
        annunciator: &mut dyn Annunciator,
    ) -> StationResult<()> {
        match self.update(now, significance) {
            Some(color) => annunciator.set_color(color),
            None => Ok(()),
        }
    }
}
