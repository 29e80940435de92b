//! Reduced-density derived geometry for glyph overlays.
//!
//! Helper glyphs (normal/tangent needles) would be unreadable and slow at
//! full vertex density, so the visualization engine walks vertices at a
//! stride and renders glyphs off a derived copy. The transform-carrying
//! proxy lets glyph builders work in accurate world space without ever
//! mutating the real surface.

use crate::data_structures::geometry::GeometryBuffers;
use crate::data_structures::instance::Instance;

/// Copies every `stride`-th vertex's position and normal (and tangent when
/// requested). Returns `None` when positions or normals are absent, or when
/// tangents were requested but missing; callers are expected to have run
/// attribute synthesis first and checked its report. A stride of 0 is
/// treated as 1 (no reduction). The output carries no index buffer.
pub fn downsample(
    source: &GeometryBuffers,
    stride: usize,
    include_tangents: bool,
) -> Option<GeometryBuffers> {
    let normals = source.normals.as_ref()?;
    if source.positions.is_empty() || normals.len() != source.positions.len() {
        return None;
    }
    let tangents = if include_tangents {
        let t = source.tangents.as_ref()?;
        if t.len() != source.positions.len() {
            return None;
        }
        Some(t)
    } else {
        None
    };

    let stride = stride.max(1);
    let mut out = GeometryBuffers::default();
    for i in (0..source.positions.len()).step_by(stride) {
        out.positions.push(source.positions[i]);
        out.normals
            .get_or_insert_with(Vec::new)
            .push(normals[i]);
        if let Some(t) = tangents {
            out.tangents.get_or_insert_with(Vec::new).push(t[i]);
        }
    }
    Some(out)
}

/// A renderable stand-in pairing derived geometry with the world transform
/// of the surface it was derived from.
#[derive(Debug)]
pub struct TransformProxy {
    pub geometry: GeometryBuffers,
    pub world: Instance,
}

/// Builds a proxy that follows `source_world`. Used only for helper
/// rendering; the real surface is never touched.
pub fn copy_transform(geometry: GeometryBuffers, source_world: &Instance) -> TransformProxy {
    TransformProxy {
        geometry,
        world: source_world.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(n: usize) -> GeometryBuffers {
        GeometryBuffers {
            positions: (0..n).map(|i| [i as f32, 0.0, 0.0]).collect(),
            normals: Some(vec![[0.0, 1.0, 0.0]; n]),
            tangents: Some(vec![[1.0, 0.0, 0.0, 1.0]; n]),
            ..Default::default()
        }
    }

    #[test]
    fn stride_walks_every_nth_vertex() {
        let out = downsample(&source(10), 3, false).unwrap();
        assert_eq!(out.positions.len(), 4); // 0, 3, 6, 9
        assert_eq!(out.positions[1], [3.0, 0.0, 0.0]);
        assert_eq!(out.normals.as_ref().unwrap().len(), 4);
        assert!(out.tangents.is_none());
        assert!(out.indices.is_none());
    }

    #[test]
    fn stride_zero_means_no_reduction() {
        let out = downsample(&source(5), 0, true).unwrap();
        assert_eq!(out.positions.len(), 5);
        assert_eq!(out.tangents.as_ref().unwrap().len(), 5);
    }

    #[test]
    fn missing_preconditions_fail() {
        let mut g = source(5);
        g.normals = None;
        assert!(downsample(&g, 1, false).is_none());

        let mut g = source(5);
        g.tangents = None;
        assert!(downsample(&g, 1, true).is_none());
        // Still fine without the tangent request.
        assert!(downsample(&g, 1, false).is_some());
    }
}
