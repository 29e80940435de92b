//! Node transformation data.
//!
//! Every node in the viewer scene carries an `Instance`: position, rotation
//! (as quaternion) and nonuniform scale. World transforms are obtained by
//! composing parent and child instances with `Mul`.

use std::ops::Mul;

use cgmath::{One, Vector3};

/// Position, rotation and scale of a scene node.
#[derive(Clone, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Transforms a point into this instance's space.
    pub fn transform_point(&self, p: Vector3<f32>) -> Vector3<f32> {
        let scaled = Vector3::new(self.scale.x * p.x, self.scale.y * p.y, self.scale.z * p.z);
        self.position + self.rotation * scaled
    }

    /// Transforms a direction, ignoring translation and scale. Good enough
    /// for normals as long as scale stays uniform, which holds for every
    /// transform this crate creates.
    pub fn transform_direction(&self, d: Vector3<f32>) -> Vector3<f32> {
        self.rotation * d
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};

    #[test]
    fn composition_applies_parent_then_child() {
        let mut parent = Instance::new();
        parent.position = Vector3::new(1.0, 0.0, 0.0);
        parent.rotation = Quaternion::from_angle_z(Deg(90.0));
        let mut child = Instance::new();
        child.position = Vector3::new(1.0, 0.0, 0.0);

        let world = &parent * &child;
        // Child offset is rotated into the parent frame.
        assert!((world.position - Vector3::new(1.0, 1.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn transform_direction_ignores_translation() {
        let mut t = Instance::new();
        t.position = Vector3::new(5.0, 5.0, 5.0);
        let d = t.transform_direction(Vector3::new(0.0, 1.0, 0.0));
        assert!((d - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-6);
    }
}
