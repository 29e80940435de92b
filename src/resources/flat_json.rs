//! Legacy flat JSON geometry decoder.
//!
//! The legacy format is a single JSON object with flat numeric arrays:
//! `{ "vertices": [x,y,z,...], "faces": [i,j,k,...], "normals": [...],
//! "uvs": [...] }`. Only `vertices` is required. The data is Z-up, which is
//! why the lifecycle manager mounts it under the raw root.

use serde::Deserialize;

use crate::data_structures::geometry::GeometryBuffers;
use crate::error::ViewerError;
use crate::resources::DecodedSurface;

#[derive(Deserialize)]
struct FlatDocument {
    #[serde(alias = "positions")]
    vertices: Vec<f32>,
    #[serde(default, alias = "indices")]
    faces: Option<Vec<u32>>,
    #[serde(default)]
    normals: Option<Vec<f32>>,
    #[serde(default, alias = "texcoords")]
    uvs: Option<Vec<f32>>,
    #[serde(default)]
    name: Option<String>,
}

pub fn decode(name: &str, bytes: &[u8]) -> Result<Vec<DecodedSurface>, ViewerError> {
    let doc: FlatDocument = serde_json::from_slice(bytes)?;

    if doc.vertices.is_empty() {
        return Err(ViewerError::decode("flat geometry has no vertices"));
    }
    if doc.vertices.len() % 3 != 0 {
        return Err(ViewerError::decode(format!(
            "vertex array length {} is not a multiple of 3",
            doc.vertices.len()
        )));
    }

    let mut geometry = GeometryBuffers {
        positions: doc
            .vertices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect(),
        indices: doc.faces,
        ..Default::default()
    };

    if let Some(normals) = doc.normals {
        if normals.len() % 3 != 0 {
            return Err(ViewerError::decode(format!(
                "normal array length {} is not a multiple of 3",
                normals.len()
            )));
        }
        geometry.normals = Some(normals.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect());
    }
    if let Some(uvs) = doc.uvs {
        if uvs.len() % 2 != 0 {
            return Err(ViewerError::decode(format!(
                "uv array length {} is not a multiple of 2",
                uvs.len()
            )));
        }
        geometry.uvs = Some(uvs.chunks_exact(2).map(|c| [c[0], c[1]]).collect());
    }
    geometry.validate()?;

    let surface_name = doc.name.unwrap_or_else(|| name.to_string());
    Ok(vec![DecodedSurface {
        name: surface_name,
        geometry,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_document() {
        let json = br#"{"vertices": [0,0,0, 1,0,0, 0,1,0], "faces": [0,1,2]}"#;
        let surfaces = decode("legacy", json).unwrap();
        assert_eq!(surfaces.len(), 1);
        let g = &surfaces[0].geometry;
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.triangle_count(), 1);
        assert!(g.normals.is_none());
    }

    #[test]
    fn rejects_bad_vertex_multiple() {
        let json = br#"{"vertices": [0,0,0, 1,0]}"#;
        let err = decode("legacy", json).unwrap_err();
        assert!(matches!(err, ViewerError::DecodeFailure { .. }));
    }

    #[test]
    fn rejects_mismatched_normal_count() {
        let json = br#"{"vertices": [0,0,0, 1,0,0, 0,1,0], "normals": [0,0,1]}"#;
        assert!(decode("legacy", json).is_err());
    }

    #[test]
    fn rejects_out_of_range_face_index() {
        let json = br#"{"vertices": [0,0,0, 1,0,0, 0,1,0], "faces": [0,1,7]}"#;
        assert!(decode("legacy", json).is_err());
    }

    #[test]
    fn rejects_non_json_bytes() {
        assert!(decode("legacy", b"not json at all").is_err());
    }
}
