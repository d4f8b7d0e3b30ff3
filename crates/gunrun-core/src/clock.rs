//! Wrapping interval clocks.
//!
//! [`Timer`] accumulates elapsed time and pulses for exactly one `advance`
//! call whenever the accumulated time crosses its interval length, then
//! wraps the remainder forward. [`Animation`] layers a derived frame index
//! on top of the same wrapping semantics, with the index cached until the
//! next advance.
//!
//! Both clocks only move when the caller hands them a delta, so a paused
//! simulation freezes every timer and animation in the world for free.

use std::cell::Cell;

use crate::ClockError;

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// A wrapping interval timer.
///
/// `elapsed` always stays in `[0, length)`. The timeout flag is a pulse: it
/// reads `true` after the `advance` call that crossed the interval and is
/// cleared again by the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    length: f32,
    elapsed: f32,
    timed_out: bool,
}

impl Timer {
    /// Create a timer with the given interval length in seconds.
    ///
    /// Rejects non-positive (and NaN) lengths.
    pub fn new(length: f32) -> Result<Self, ClockError> {
        if !(length > 0.0) {
            return Err(ClockError::NonPositiveLength { length });
        }
        Ok(Self {
            length,
            elapsed: 0.0,
            timed_out: false,
        })
    }

    /// Advance the timer by `dt` seconds and return whether it timed out.
    ///
    /// A `dt` larger than the remaining interval still produces a single
    /// pulse; the overshoot wraps into the next interval.
    pub fn advance(&mut self, dt: f32) -> Result<bool, ClockError> {
        if dt < 0.0 {
            return Err(ClockError::NegativeDelta { dt });
        }
        self.elapsed += dt;
        if self.elapsed >= self.length {
            self.elapsed %= self.length;
            self.timed_out = true;
        } else {
            self.timed_out = false;
        }
        Ok(self.timed_out)
    }

    /// Whether the most recent [`advance`](Self::advance) crossed the interval.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Rewind to the start of the interval and clear the timeout pulse.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.timed_out = false;
    }

    /// Seconds accumulated within the current interval.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The interval length in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// A looping animation clock.
///
/// Advances exactly like a [`Timer`] over one full cycle of `length`
/// seconds, and derives the current frame index from its position within
/// the cycle:
///
/// ```text
/// frame = floor(elapsed / length * frame_count) % frame_count
/// ```
///
/// The index is cached and recomputed lazily, so repeated
/// [`current_frame`](Self::current_frame) calls between advances are free.
/// The timeout pulse fires on the advance that completes a cycle, which is
/// how one-shot effects (death, bullet impact) detect that their animation
/// has played through.
#[derive(Debug, Clone)]
pub struct Animation {
    frame_count: usize,
    length: f32,
    elapsed: f32,
    timed_out: bool,
    cached_frame: Cell<Option<usize>>,
}

impl Animation {
    /// Create an animation cycling `frame_count` frames over `length` seconds.
    ///
    /// Rejects zero frame counts and non-positive (or NaN) lengths.
    pub fn new(frame_count: usize, length: f32) -> Result<Self, ClockError> {
        if frame_count == 0 {
            return Err(ClockError::ZeroFrameCount);
        }
        if !(length > 0.0) {
            return Err(ClockError::NonPositiveLength { length });
        }
        Ok(Self {
            frame_count,
            length,
            elapsed: 0.0,
            timed_out: false,
            cached_frame: Cell::new(None),
        })
    }

    /// Advance the animation by `dt` seconds and return whether a cycle
    /// completed on this call.
    pub fn advance(&mut self, dt: f32) -> Result<bool, ClockError> {
        if dt < 0.0 {
            return Err(ClockError::NegativeDelta { dt });
        }
        self.elapsed += dt;
        if self.elapsed >= self.length {
            self.elapsed %= self.length;
            self.timed_out = true;
        } else {
            self.timed_out = false;
        }
        self.cached_frame.set(None);
        Ok(self.timed_out)
    }

    /// The frame index for the current position within the cycle.
    ///
    /// Always in `[0, frame_count)`.
    pub fn current_frame(&self) -> usize {
        if let Some(frame) = self.cached_frame.get() {
            return frame;
        }
        let progress = self.elapsed / self.length;
        let frame = (progress * self.frame_count as f32) as usize % self.frame_count;
        self.cached_frame.set(Some(frame));
        frame
    }

    /// Whether the most recent [`advance`](Self::advance) completed a cycle.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Rewind to frame 0 and clear the timeout pulse.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.timed_out = false;
        self.cached_frame.set(None);
    }

    /// Number of frames in the cycle.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Cycle length in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Seconds accumulated within the current cycle.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. Construction ----------------------------------------------------

    #[test]
    fn timer_rejects_non_positive_length() {
        assert_eq!(
            Timer::new(0.0),
            Err(ClockError::NonPositiveLength { length: 0.0 })
        );
        assert_eq!(
            Timer::new(-1.0),
            Err(ClockError::NonPositiveLength { length: -1.0 })
        );
        assert!(Timer::new(f32::NAN).is_err());
    }

    #[test]
    fn animation_rejects_bad_params() {
        assert!(matches!(
            Animation::new(0, 1.0),
            Err(ClockError::ZeroFrameCount)
        ));
        assert!(matches!(
            Animation::new(4, 0.0),
            Err(ClockError::NonPositiveLength { .. })
        ));
        assert!(matches!(
            Animation::new(4, -0.5),
            Err(ClockError::NonPositiveLength { .. })
        ));
    }

    #[test]
    fn fresh_timer_has_not_timed_out() {
        let timer = Timer::new(0.5).unwrap();
        assert!(!timer.timed_out());
        assert_eq!(timer.elapsed(), 0.0);
        assert_eq!(timer.length(), 0.5);
    }

    // -- 2. Pulse semantics -------------------------------------------------

    #[test]
    fn timeout_pulses_for_exactly_one_advance() {
        let mut timer = Timer::new(0.1).unwrap();

        assert!(!timer.advance(0.06).unwrap());
        assert!(timer.advance(0.06).unwrap()); // 0.12 crosses 0.1
        assert!(timer.timed_out());

        // The very next advance clears the pulse.
        assert!(!timer.advance(0.01).unwrap());
        assert!(!timer.timed_out());
    }

    #[test]
    fn overshoot_wraps_forward() {
        let mut timer = Timer::new(0.1).unwrap();
        timer.advance(0.25).unwrap();
        assert!(timer.timed_out());
        // 0.25 mod 0.1 = 0.05 carried into the next interval.
        assert!((timer.elapsed() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn elapsed_stays_in_interval() {
        let mut timer = Timer::new(0.3).unwrap();
        for _ in 0..1000 {
            timer.advance(0.07).unwrap();
            assert!(timer.elapsed() >= 0.0);
            assert!(timer.elapsed() < timer.length());
        }
    }

    #[test]
    fn exact_boundary_counts_as_timeout() {
        let mut timer = Timer::new(0.5).unwrap();
        assert!(timer.advance(0.5).unwrap());
        assert_eq!(timer.elapsed(), 0.0);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut timer = Timer::new(1.0).unwrap();
        timer.advance(0.4).unwrap();
        assert!(!timer.advance(0.0).unwrap());
        assert!((timer.elapsed() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn negative_dt_is_rejected_without_mutation() {
        let mut timer = Timer::new(1.0).unwrap();
        timer.advance(0.3).unwrap();
        assert_eq!(
            timer.advance(-0.1),
            Err(ClockError::NegativeDelta { dt: -0.1 })
        );
        assert!((timer.elapsed() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn reset_rewinds_and_clears_pulse() {
        let mut timer = Timer::new(0.2).unwrap();
        timer.advance(0.25).unwrap();
        assert!(timer.timed_out());
        timer.reset();
        assert!(!timer.timed_out());
        assert_eq!(timer.elapsed(), 0.0);
    }

    // -- 3. Animation frame index -------------------------------------------

    #[test]
    fn frame_index_walks_the_cycle() {
        // 4 frames over 1 second: quarter-second per frame.
        let mut anim = Animation::new(4, 1.0).unwrap();
        assert_eq!(anim.current_frame(), 0);

        anim.advance(0.25).unwrap();
        assert_eq!(anim.current_frame(), 1);

        anim.advance(0.25).unwrap();
        assert_eq!(anim.current_frame(), 2);

        anim.advance(0.25).unwrap();
        assert_eq!(anim.current_frame(), 3);

        // Completing the cycle wraps back to frame 0 and pulses.
        assert!(anim.advance(0.25).unwrap());
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn frame_index_always_in_range() {
        let mut anim = Animation::new(18, 2.0).unwrap();
        for _ in 0..500 {
            anim.advance(0.033).unwrap();
            assert!(anim.current_frame() < anim.frame_count());
        }
    }

    #[test]
    fn frame_cache_survives_repeated_reads() {
        let mut anim = Animation::new(8, 1.6).unwrap();
        anim.advance(0.5).unwrap();
        let first = anim.current_frame();
        // No advance in between: identical on every read.
        assert_eq!(anim.current_frame(), first);
        assert_eq!(anim.current_frame(), first);
    }

    #[test]
    fn frame_cache_invalidated_by_advance() {
        let mut anim = Animation::new(2, 1.0).unwrap();
        assert_eq!(anim.current_frame(), 0);
        anim.advance(0.6).unwrap();
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn animation_cycle_completion_pulses_once() {
        let mut anim = Animation::new(4, 0.15).unwrap();
        let mut pulses = 0;
        for _ in 0..9 {
            // 9 * 0.05 = 0.45: exactly three cycles.
            if anim.advance(0.05).unwrap() {
                pulses += 1;
            }
        }
        assert_eq!(pulses, 3);
    }

    #[test]
    fn animation_reset_returns_to_frame_zero() {
        let mut anim = Animation::new(6, 1.2).unwrap();
        anim.advance(0.9).unwrap();
        assert_ne!(anim.current_frame(), 0);
        anim.reset();
        assert_eq!(anim.current_frame(), 0);
        assert!(!anim.timed_out());
    }

    #[test]
    fn animation_rejects_negative_dt() {
        let mut anim = Animation::new(4, 1.0).unwrap();
        assert!(matches!(
            anim.advance(-0.01),
            Err(ClockError::NegativeDelta { .. })
        ));
    }
}
