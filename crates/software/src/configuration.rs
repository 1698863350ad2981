//! User-selectable settings (implemented as enums) and a trait for stepping through them from a pushbutton.

mod velocity_curve;
pub use velocity_curve::*;

use num_traits::{FromPrimitive, ToPrimitive};

/// Advances an enum to its next variant, wrapping around to the first once all have been visited.
///
/// A single pushbutton is the whole user interface of the bridge, so each press moves a setting one step along.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let next = self.to_u8().and_then(|index| index.checked_add(1));
        next.and_then(<Self as FromPrimitive>::from_u8)
            .or_else(|| <Self as FromPrimitive>::from_u8(0))
            .unwrap_or(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_visits_every_velocity_curve() {
        let curve = VelocityCurve::Full.cycle();
        assert_eq!(
            VelocityCurve::Doubled,
            curve,
            "Should advance to next variant; expected left but got right"
        );

        let curve = curve.cycle();
        assert_eq!(
            VelocityCurve::Switched,
            curve,
            "Should advance to next variant; expected left but got right"
        );

        let curve = curve.cycle();
        assert_eq!(
            VelocityCurve::Full,
            curve,
            "Should wrap around to first variant; expected left but got right"
        );
    }
}
