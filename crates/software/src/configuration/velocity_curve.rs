use num_derive::{FromPrimitive, ToPrimitive};
use wmidi::Velocity;

/// Determines how the 7-bit velocity of a Note On message becomes the 8-bit intensity of a DMX channel.
///
/// Every curve maps velocity 0 to intensity 0 and never decreases as velocity rises. None of them overflow.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VelocityCurve {
    /// Spreads velocity across the whole intensity range by replicating its top bit into the bottom one, so that a
    /// velocity of 127 lights the channel fully (255) and 64 lands just past half (129).
    #[default]
    Full,
    /// Doubles velocity, topping out at 254. Fixtures which treat 255 specially (some use it for "strobe" or "open")
    /// never see it.
    Doubled,
    /// Any non-zero velocity switches the channel fully on. Suits relay packs and other fixtures without dimming.
    Switched,
}
impl super::CycleConfig for VelocityCurve {}

impl VelocityCurve {
    /// Returns the channel intensity for `velocity`.
    pub fn intensity(&self, velocity: Velocity) -> u8 {
        let velocity = u8::from(velocity);
        match self {
            Self::Full => (velocity << 1) | (velocity >> 6),
            Self::Doubled => velocity << 1,
            Self::Switched => {
                if velocity == 0 {
                    0
                } else {
                    u8::MAX
                }
            }
        }
    }
}
