//! Transition planning — precomputed color fades.
//!
//! A transition plan is an ordered sequence of colors forming a smooth fade
//! from the device's current color to a target. Planning is pure: no I/O and
//! no sleeping. Pacing between steps is the device driver's job
//! ([`crate::device::LightDevice::apply_transition`]).

use crate::color::Rgb;

/// Plan a fade of `steps` colors from `from` to `to`.
///
/// The first element is exactly `from`, the last exactly `to`, with the
/// intermediate colors linearly interpolated per channel (truncated toward
/// zero). `steps == 1` degenerates to `[to]`; a `steps` of zero is floored
/// to one.
pub fn plan(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    let steps = steps.max(1);
    if steps == 1 {
        return vec![to];
    }
    let mut colors = Vec::with_capacity(steps);
    colors.push(from);
    for t in 1..steps - 1 {
        colors.push(from.lerp(to, t as f64 / (steps - 1) as f64));
    }
    colors.push(to);
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── endpoints and length ──

    #[test]
    fn plan_has_exact_step_count() {
        for steps in [2, 3, 10, 40, 100] {
            let p = plan(Rgb::OFF, Rgb::WHITE, steps);
            assert_eq!(p.len(), steps, "steps = {steps}");
        }
    }

    #[test]
    fn plan_starts_at_from_and_ends_at_to() {
        let a = Rgb::new(17, 203, 99);
        let b = Rgb::new(240, 5, 180);
        for steps in [2, 3, 7, 40] {
            let p = plan(a, b, steps);
            assert_eq!(p[0], a, "steps = {steps}");
            assert_eq!(*p.last().unwrap(), b, "steps = {steps}");
        }
    }

    #[test]
    fn single_step_degenerates_to_target() {
        let p = plan(Rgb::new(1, 2, 3), Rgb::new(9, 8, 7), 1);
        assert_eq!(p, vec![Rgb::new(9, 8, 7)]);
    }

    #[test]
    fn zero_steps_floored_to_one() {
        let p = plan(Rgb::OFF, Rgb::WHITE, 0);
        assert_eq!(p, vec![Rgb::WHITE]);
    }

    // ── interpolation values ──

    #[test]
    fn intermediate_values_match_linear_formula() {
        let a = Rgb::new(0, 100, 255);
        let b = Rgb::new(100, 0, 55);
        let steps = 5;
        let p = plan(a, b, steps);
        for (t, c) in p.iter().enumerate() {
            let frac = t as f64 / (steps - 1) as f64;
            let expect = |from: u8, to: u8| {
                (from as f64 + frac * (to as f64 - from as f64)) as u8
            };
            assert_eq!(c.r, expect(a.r, b.r), "r at step {t}");
            assert_eq!(c.g, expect(a.g, b.g), "g at step {t}");
            assert_eq!(c.b, expect(a.b, b.b), "b at step {t}");
        }
    }

    #[test]
    fn descending_channels_interpolate() {
        let p = plan(Rgb::new(255, 255, 255), Rgb::OFF, 3);
        assert_eq!(p[1], Rgb::new(127, 127, 127));
    }

    // ── idempotence ──

    #[test]
    fn equal_endpoints_yield_copies() {
        let c = Rgb::new(33, 66, 99);
        let p = plan(c, c, 10);
        assert_eq!(p.len(), 10);
        assert!(p.iter().all(|&x| x == c));
    }

    #[test]
    fn two_steps_is_from_then_to() {
        let a = Rgb::new(1, 1, 1);
        let b = Rgb::new(254, 254, 254);
        assert_eq!(plan(a, b, 2), vec![a, b]);
    }
}
