//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign,
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    let mut sum = T::zero();

    for (a, b) in point_0.iter().zip(point_1.iter()) {
        sum += (*a - *b).powi(2);
    }

    Some(sum.sqrt())
}

/// Clamp a value into `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    value.max(*min).min(*max)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range `(-pi, pi]`.
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float,
{
    let pi = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau = pi + pi;

    let wrapped = rem_euclid(value + pi, tau) - pi;

    // rem_euclid maps pi onto -pi
    if wrapped <= -pi {
        wrapped + tau
    } else {
        wrapped
    }
}

/// Signed shortest angular distance from `a` to `b`, in `(-pi, pi]`.
pub fn ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    wrap_pi(b - a)
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[0f64, 0.0, 0.0], &[3.0, 4.0, 0.0]), Some(5.0));
        assert_eq!(norm(&[0f64, 0.0], &[3.0, 4.0, 0.0]), None);
    }

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi(0f64), 0.0);
        assert_eq!(wrap_pi(PI), PI);
        assert_eq!(wrap_pi(-PI), PI);
        assert!((wrap_pi(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((wrap_pi(-TAU - 1.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ang_dist() {
        assert_eq!(ang_dist(1f64, 2f64), 1f64);
        assert_eq!(ang_dist(2f64, 1f64), -1f64);
        assert!(ang_dist(0f64, TAU).abs() < 1e-12);
        assert!((ang_dist(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-2f64, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.5f64, &-1.0, &1.0), 0.5);
    }
}
