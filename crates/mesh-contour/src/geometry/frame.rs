//! Per-vertex rotated tangent frames.

use nalgebra::{Point3, Rotation3, Vector3};

/// Rotation that carries a vertex normal onto the +z axis.
///
/// Built from the normal's azimuth `phi = atan2(ny, nx)` and polar angle
/// `theta = atan2(hypot(nx, ny), nz)` as `Ry(-theta) * Rz(-phi)`. The local
/// x and y axes (`e1`, `e2`) span the tangent plane and are the basis in
/// which curvature gradients and contour directions are expressed, so the
/// construction order matters for their orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    rotation: Rotation3<f64>,
}

impl TangentFrame {
    /// Frame for a vertex with the given normal. A zero normal yields the
    /// identity frame.
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        let phi = normal.y.atan2(normal.x);
        let theta = normal.x.hypot(normal.y).atan2(normal.z);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), -phi);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), -theta);
        Self { rotation: ry * rz }
    }

    /// Coordinates of `point` relative to `origin` in this frame.
    #[inline]
    pub fn local(&self, origin: &Point3<f64>, point: &Point3<f64>) -> Vector3<f64> {
        self.rotation * (point - origin)
    }

    /// Rotate a world-space vector into this frame.
    #[inline]
    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }
}
