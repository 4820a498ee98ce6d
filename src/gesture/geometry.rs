//! Planar geometry over landmarks
//!
//! All functions are total: coincident or collinear points never fail.

use super::landmarks::Landmark;

/// Angle at vertex `b` between rays `b -> a` and `b -> c`, in degrees `[0, 180]`
pub fn angle(a: Landmark, b: Landmark, c: Landmark) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Euclidean distance between two points
pub fn distance(a: Landmark, b: Landmark) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}
