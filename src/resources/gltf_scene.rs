//! Binary scene format decoder (`.glb` / embedded `.gltf`).
//!
//! Thin wrapper over the `gltf` crate: every mesh primitive in the document
//! becomes one surface. Only geometry attributes are read; materials and
//! textures in the file are ignored because the viewer assigns its own
//! base/wire material pair.

use log::warn;

use crate::data_structures::geometry::GeometryBuffers;
use crate::error::ViewerError;
use crate::resources::DecodedSurface;

pub fn decode(name: &str, bytes: &[u8]) -> Result<Vec<DecodedSurface>, ViewerError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let mut surfaces = Vec::new();
    for mesh in document.meshes() {
        for (prim_index, primitive) in mesh.primitives().enumerate() {
            let reader = primitive.reader(|buffer| {
                buffers.get(buffer.index()).map(|data| data.0.as_slice())
            });

            let Some(positions) = reader.read_positions() else {
                warn!(
                    "primitive {} of mesh {:?} has no positions, skipping",
                    prim_index,
                    mesh.name()
                );
                continue;
            };
            let mut geometry = GeometryBuffers {
                positions: positions.collect(),
                ..Default::default()
            };

            if let Some(indices) = reader.read_indices() {
                geometry.indices = Some(indices.into_u32().collect());
            }
            if let Some(normals) = reader.read_normals() {
                geometry.normals = Some(normals.collect());
            }
            if let Some(uvs) = reader.read_tex_coords(0) {
                geometry.uvs = Some(uvs.into_f32().collect());
            }
            if let Some(tangents) = reader.read_tangents() {
                geometry.tangents = Some(tangents.collect());
            }
            geometry.validate()?;

            let surface_name = match mesh.name() {
                Some(mesh_name) => format!("{}/{}", name, mesh_name),
                None => format!("{}/surface_{}", name, surfaces.len()),
            };
            surfaces.push(DecodedSurface {
                name: surface_name,
                geometry,
            });
        }
    }

    Ok(surfaces)
}
