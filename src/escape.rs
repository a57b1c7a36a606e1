//! The escape-time recurrence, z <- z^2 + c, starting from zero.

use num::Complex;

/// Squared escape radius; once |z|^2 reaches this the orbit is gone.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Iterates `c` until it leaves the radius-2 disc or the cap is hit.
///
/// Returns the number of steps taken, in `0..=limit`.  A result equal
/// to `limit` means the point never escaped and is treated as part of
/// the set; a limit of zero returns zero straight away.
#[inline]
pub fn escape_time(c: Complex<f64>, limit: u32) -> u32 {
    let (mut re, mut im) = (0.0_f64, 0.0_f64);
    let mut iteration = 0;
    while re * re + im * im < ESCAPE_RADIUS_SQR && iteration < limit {
        let next_re = re * re - im * im + c.re;
        im = 2.0 * re * im + c.im;
        re = next_re;
        iteration += 1;
    }
    iteration
}

/// True when an escape count marks an interior point.
#[inline]
pub fn is_interior(iteration: u32, limit: u32) -> bool {
    iteration == limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for &n in &[1, 2, 50, 1000, 100_000] {
            assert_eq!(escape_time(Complex::new(0.0, 0.0), n), n);
        }
    }

    #[test]
    fn two_escapes_after_one_step() {
        // z1 = 2, which is already on the boundary.
        for &n in &[1, 2, 50, 1000] {
            assert_eq!(escape_time(Complex::new(2.0, 0.0), n), 1);
        }
    }

    #[test]
    fn zero_cap_returns_zero() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 0), 0);
        assert_eq!(escape_time(Complex::new(5.0, 5.0), 0), 0);
    }

    #[test]
    fn result_never_exceeds_cap() {
        let points = [
            Complex::new(-0.75, 0.1),
            Complex::new(0.25, 0.0),
            Complex::new(-1.5, 0.0),
            Complex::new(0.3, 0.5),
            Complex::new(-1.0, 0.0),
            Complex::new(10.0, -10.0),
        ];
        for c in points.iter() {
            for &n in &[1, 7, 64, 500] {
                assert!(escape_time(*c, n) <= n);
            }
        }
    }

    #[test]
    fn known_interior_points() {
        assert_eq!(escape_time(Complex::new(-0.5, 0.0), 1000), 1000);
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 1000), 1000);
        // The needle tip lands exactly on the radius and counts as escaped.
        assert_eq!(escape_time(Complex::new(-2.0, 0.0), 1000), 1);
    }

    #[test]
    fn far_points_escape_quickly() {
        assert_eq!(escape_time(Complex::new(-2.0, -2.0), 50), 1);
        assert_eq!(escape_time(Complex::new(1.0, 1.0), 50), 2);
    }
}
