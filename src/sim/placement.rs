//! Anchor placement geometry
//!
//! Targets are positioned by rotating a random amount about X, then about Y,
//! and finally stepping a fixed distance along the rotated forward (-Z) axis.
//! Angles are uniform, so spawn points are uniform in azimuth/elevation
//! rather than uniform over the sphere surface.

use glam::{Mat3, Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 4x4 homogeneous transform handed to the host's anchor registration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTransform(Mat4);

impl SpawnTransform {
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self(matrix)
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.0
    }

    /// Rotation part (upper-left 3x3)
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_mat4(self.0)
    }

    /// Translation column
    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }

    /// Column-major floats, the layout AR frameworks expect
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.0.to_cols_array()
    }
}

/// Rotation `Rx(2π·u1) · Ry(2π·u2)`
///
/// The composition order fixes the distribution of spawn directions.
pub fn rotation_from_samples(u1: f32, u2: f32) -> Mat4 {
    let x_rotation = Mat4::from_rotation_x(std::f32::consts::TAU * u1);
    let y_rotation = Mat4::from_rotation_y(std::f32::consts::TAU * u2);
    x_rotation * y_rotation
}

/// Identity with the Z column offset to `-distance` (into the screen)
#[inline]
fn forward_translation(distance: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -distance))
}

/// Automatic spawn transform from two uniform samples in [0, 1)
pub fn auto_spawn_from_samples(u1: f32, u2: f32, distance: f32) -> SpawnTransform {
    SpawnTransform(rotation_from_samples(u1, u2) * forward_translation(distance))
}

/// Automatic spawn: random direction around the origin at a fixed distance
///
/// Draws the X sample first, then the Y sample.
pub fn auto_spawn<R: Rng>(rng: &mut R, distance: f32) -> SpawnTransform {
    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    auto_spawn_from_samples(u1, u2, distance)
}

/// Automatic spawn expressed relative to the player's reference frame
pub fn auto_spawn_in_frame<R: Rng>(
    frame: Mat4,
    rng: &mut R,
    distance: f32,
) -> SpawnTransform {
    SpawnTransform(frame * auto_spawn(rng, distance).0)
}

/// Tap placement: straight ahead of the camera, no randomization
pub fn tap_spawn(camera: Mat4, distance: f32) -> SpawnTransform {
    SpawnTransform(camera * forward_translation(distance))
}
