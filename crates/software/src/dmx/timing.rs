/// DMX512 requires the break to last at least this long, in microseconds.
pub const MIN_BREAK_MICROS: u32 = 88;

/// DMX512 requires the mark-after-break to last at least this long, in microseconds.
pub const MIN_MARK_AFTER_BREAK_MICROS: u32 = 8;

/// Durations of the slow preamble which precedes the start code of every frame.
///
/// Both durations are clamped to their DMX512 minimums on construction, so a `FrameTiming` never describes a frame that
/// receivers would be entitled to reject.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTiming {
    break_micros: u32,
    mark_after_break_micros: u32,
}

impl FrameTiming {
    /// Constructs a [`FrameTiming`], raising either duration to its minimum if it falls short.
    pub const fn new(break_micros: u32, mark_after_break_micros: u32) -> Self {
        Self {
            break_micros: if break_micros < MIN_BREAK_MICROS {
                MIN_BREAK_MICROS
            } else {
                break_micros
            },
            mark_after_break_micros: if mark_after_break_micros < MIN_MARK_AFTER_BREAK_MICROS {
                MIN_MARK_AFTER_BREAK_MICROS
            } else {
                mark_after_break_micros
            },
        }
    }

    /// How long the line is held low to signal the start of a frame.
    pub fn break_micros(&self) -> u32 {
        self.break_micros
    }

    /// How long the line is held high between the break and the start code.
    pub fn mark_after_break_micros(&self) -> u32 {
        self.mark_after_break_micros
    }
}

impl Default for FrameTiming {
    /// A few microseconds of headroom over the minimums, to absorb the latency of toggling the line.
    fn default() -> Self {
        Self::new(92, 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_meets_minimums() {
        let timing = FrameTiming::default();
        assert!(timing.break_micros() >= MIN_BREAK_MICROS);
        assert!(timing.mark_after_break_micros() >= MIN_MARK_AFTER_BREAK_MICROS);
    }

    #[test]
    fn short_durations_are_clamped() {
        assert_eq!(
            FrameTiming::new(88, 8),
            FrameTiming::new(10, 0),
            "Expected left but got right"
        );
    }

    #[test]
    fn long_durations_are_kept() {
        let timing = FrameTiming::new(176, 16);
        assert_eq!(176, timing.break_micros(), "Expected left but got right");
        assert_eq!(16, timing.mark_after_break_micros(), "Expected left but got right");
    }
}
