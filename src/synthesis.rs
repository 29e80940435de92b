//! Geometry attribute synthesis.
//!
//! Decoded geometry frequently arrives with positions and indices only.
//! [`ensure_attributes`] fills in whatever is missing so every surface is
//! render-ready: per-vertex normals accumulated over the triangle list, a
//! spherical fallback UV parameterization, and Lengyel-style tangents. Pure
//! buffer-level code: no materials, no scene objects, idempotent.

use cgmath::{InnerSpace, Vector2, Vector3};
use log::debug;

use crate::data_structures::geometry::GeometryBuffers;

const DEGENERATE_EPS: f32 = 1e-12;

/// What was present or successfully computed for one buffer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeReport {
    pub has_normals: bool,
    pub has_uvs: bool,
    pub has_tangents: bool,
}

/// Guarantees normals, UVs and tangents where the geometry permits.
///
/// Positions and indices are never mutated. Tangent synthesis needs triangle
/// topology plus a non-degenerate 2D parameterization; when that fails the
/// failure is absorbed (`has_tangents = false`), never propagated, because a
/// tangent-less surface is degraded but still renderable.
pub fn ensure_attributes(geometry: &mut GeometryBuffers) -> AttributeReport {
    let mut report = AttributeReport {
        has_normals: geometry.normals.is_some(),
        has_uvs: geometry.uvs.is_some(),
        has_tangents: geometry.tangents.is_some(),
    };

    if !report.has_normals {
        match compute_vertex_normals(geometry) {
            Some(normals) => {
                geometry.normals = Some(normals);
                report.has_normals = true;
            }
            None => debug!("normal synthesis skipped: degenerate or non-indexed geometry"),
        }
    }

    if !report.has_uvs {
        match compute_spherical_uvs(geometry) {
            Some(uvs) => {
                geometry.uvs = Some(uvs);
                report.has_uvs = true;
            }
            None => debug!("uv synthesis skipped: geometry collapses to a point"),
        }
    }

    if !report.has_tangents && report.has_normals && report.has_uvs {
        match compute_tangents(geometry) {
            Some(tangents) => {
                geometry.tangents = Some(tangents);
                report.has_tangents = true;
            }
            None => debug!("tangent synthesis failed, continuing without tangents"),
        }
    }

    report
}

/// Area-weighted vertex normals accumulated from face winding. `None` when
/// there is no index buffer or every triangle is degenerate.
fn compute_vertex_normals(geometry: &GeometryBuffers) -> Option<Vec<[f32; 3]>> {
    let indices = geometry.indices.as_ref()?;
    let positions = &geometry.positions;
    if positions.is_empty() || indices.len() < 3 {
        return None;
    }

    let mut accum = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let p0 = Vector3::from(positions[tri[0] as usize]);
        let p1 = Vector3::from(positions[tri[1] as usize]);
        let p2 = Vector3::from(positions[tri[2] as usize]);
        // Unnormalized cross product weights by twice the triangle area.
        let face = (p1 - p0).cross(p2 - p0);
        for &i in tri {
            accum[i as usize] += face;
        }
    }

    let mut any_valid = false;
    let normals = accum
        .into_iter()
        .map(|n| {
            if n.magnitude2() > DEGENERATE_EPS {
                any_valid = true;
                let n = n.normalize();
                [n.x, n.y, n.z]
            } else {
                // Vertices untouched by any non-degenerate triangle.
                [0.0, 0.0, 1.0]
            }
        })
        .collect();

    any_valid.then_some(normals)
}

/// Spherical fallback parameterization about the bounding-sphere center.
///
/// Longitude/latitude of the centered, normalized direction, remapped to
/// `[0,1]x[0,1]`. Stable for closed, roughly star-convex surfaces such as
/// cortical or organ meshes; callers accept the seam and pole artifacts.
fn compute_spherical_uvs(geometry: &GeometryBuffers) -> Option<Vec<[f32; 2]>> {
    let (center, radius) = geometry.bounding_sphere()?;
    if radius < f32::EPSILON {
        return None;
    }

    let uvs = geometry
        .positions
        .iter()
        .map(|p| {
            let d = Vector3::from(*p) - center;
            if d.magnitude2() <= DEGENERATE_EPS {
                return [0.5, 0.5];
            }
            let d = d.normalize();
            let u = 0.5 + d.z.atan2(d.x) / (2.0 * std::f32::consts::PI);
            let v = 0.5 - d.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
            [u, v]
        })
        .collect();
    Some(uvs)
}

/// Per-triangle tangent accumulation with Gram-Schmidt orthogonalization and
/// a handedness sign in w. Requires indices, normals and UVs; `None` when
/// topology is missing or every triangle's UV area is degenerate.
fn compute_tangents(geometry: &GeometryBuffers) -> Option<Vec<[f32; 4]>> {
    let indices = geometry.indices.as_ref()?;
    let normals = geometry.normals.as_ref()?;
    let uvs = geometry.uvs.as_ref()?;
    let positions = &geometry.positions;
    let n_verts = positions.len();
    if normals.len() != n_verts || uvs.len() != n_verts || indices.len() < 3 {
        return None;
    }

    let mut tan = vec![Vector3::new(0.0f32, 0.0, 0.0); n_verts];
    let mut bitan = vec![Vector3::new(0.0f32, 0.0, 0.0); n_verts];
    let mut any_valid = false;

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;

        let pos0 = Vector3::from(positions[i0]);
        let pos1 = Vector3::from(positions[i1]);
        let pos2 = Vector3::from(positions[i2]);

        let uv0 = Vector2::from(uvs[i0]);
        let uv1 = Vector2::from(uvs[i1]);
        let uv2 = Vector2::from(uvs[i2]);

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let denom = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if denom.abs() < DEGENERATE_EPS {
            // Degenerate UV mapping for this triangle.
            continue;
        }
        any_valid = true;
        let r = 1.0 / denom;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for &i in tri {
            tan[i as usize] += tangent;
            bitan[i as usize] += bitangent;
        }
    }

    if !any_valid {
        return None;
    }

    let out = (0..n_verts)
        .map(|i| {
            let n = Vector3::from(normals[i]);
            let t = tan[i];
            // Gram-Schmidt orthogonalize against the normal.
            let t = t - n * n.dot(t);
            if t.magnitude2() <= DEGENERATE_EPS {
                return [1.0, 0.0, 0.0, 1.0];
            }
            let t = t.normalize();
            let handedness = if n.cross(t).dot(bitan[i]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            [t.x, t.y, t.z, handedness]
        })
        .collect();

    Some(out)
}
