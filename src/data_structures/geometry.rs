use cgmath::{InnerSpace, Vector3};

use crate::error::ViewerError;

/// Bounding radius reported while no model is loaded, so camera-framing
/// callers get a sane distance without special-casing the empty viewer.
pub const DEFAULT_BOUNDS_RADIUS: f32 = 100.0;

/// A bag of named per-vertex attribute arrays plus an optional triangle list.
///
/// Any attribute that is present has exactly `vertex_count()` entries;
/// decoders call [`GeometryBuffers::validate`] before handing a buffer set
/// over to the lifecycle manager. Tangents carry four components, xyz plus
/// the handedness sign.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuffers {
    pub positions: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub tangents: Option<Vec<[f32; 4]>>,
}

impl GeometryBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.as_ref().map_or(0, |i| i.len() / 3)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks the cardinality invariants of every present attribute.
    pub fn validate(&self) -> Result<(), ViewerError> {
        let n = self.vertex_count();
        if let Some(indices) = &self.indices {
            if indices.len() % 3 != 0 {
                return Err(ViewerError::decode(format!(
                    "index buffer length {} is not a multiple of 3",
                    indices.len()
                )));
            }
            if let Some(&max) = indices.iter().max() {
                if max as usize >= n {
                    return Err(ViewerError::decode(format!(
                        "index {} out of range for {} vertices",
                        max, n
                    )));
                }
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != n {
                return Err(ViewerError::decode(format!(
                    "normal count {} does not match vertex count {}",
                    normals.len(),
                    n
                )));
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != n {
                return Err(ViewerError::decode(format!(
                    "uv count {} does not match vertex count {}",
                    uvs.len(),
                    n
                )));
            }
        }
        if let Some(tangents) = &self.tangents {
            if tangents.len() != n {
                return Err(ViewerError::decode(format!(
                    "tangent count {} does not match vertex count {}",
                    tangents.len(),
                    n
                )));
            }
        }
        Ok(())
    }

    pub fn bounding_box(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = self.positions.first()?;
        let mut min = Vector3::from(*first);
        let mut max = min;
        for p in self.positions.iter().skip(1) {
            let v = Vector3::from(*p);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some((min, max))
    }

    /// Center of the bounding box plus the distance to the farthest vertex.
    pub fn bounding_sphere(&self) -> Option<(Vector3<f32>, f32)> {
        let (min, max) = self.bounding_box()?;
        let center = (min + max) * 0.5;
        let radius = self
            .positions
            .iter()
            .map(|p| (Vector3::from(*p) - center).magnitude())
            .fold(0.0f32, f32::max);
        Some((center, radius))
    }

    /// Releases every owned buffer. Called during model teardown so tests can
    /// observe that dropped geometry is actually emptied.
    pub fn dispose(&mut self) {
        self.positions = Vec::new();
        self.indices = None;
        self.normals = None;
        self.uvs = None;
        self.tangents = None;
    }
}

/// Bounding information for camera framing. `bbox` is `None` while no model
/// is loaded so callers can distinguish "no model" from a degenerate one.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub radius: f32,
    pub bbox: Option<(Vector3<f32>, Vector3<f32>)>,
    pub center: Vector3<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BOUNDS_RADIUS,
            bbox: None,
            center: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GeometryBuffers {
        GeometryBuffers {
            positions: vec![
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 2.0, 0.0],
                [0.0, 2.0, 0.0],
            ],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
            ..Default::default()
        }
    }

    #[test]
    fn bounding_sphere_centers_on_bbox() {
        let (center, radius) = quad().bounding_sphere().unwrap();
        assert_eq!(center, Vector3::new(1.0, 1.0, 0.0));
        assert!((radius - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn validate_rejects_out_of_range_indices() {
        let mut g = quad();
        g.indices = Some(vec![0, 1, 9]);
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_rejects_attribute_cardinality_mismatch() {
        let mut g = quad();
        g.normals = Some(vec![[0.0, 0.0, 1.0]; 3]);
        assert!(g.validate().is_err());
        g.normals = Some(vec![[0.0, 0.0, 1.0]; 4]);
        assert!(g.validate().is_ok());
    }
}
