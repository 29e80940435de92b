//! Model file decoding.
//!
//! This module owns no file format itself; it routes by URL extension to the
//! two decoder collaborators and normalizes their output into plain
//! [`GeometryBuffers`]. Format detection happens before any I/O so a typo'd
//! extension never triggers a read.

use std::path::Path;

use crate::data_structures::geometry::GeometryBuffers;
use crate::data_structures::model::ModelFormat;
use crate::error::ViewerError;

pub mod flat_json;
pub mod gltf_scene;

/// One decoded mesh surface, not yet owned by the lifecycle manager.
#[derive(Debug)]
pub struct DecodedSurface {
    pub name: String,
    pub geometry: GeometryBuffers,
}

/// Everything a decoder hands back for one file.
#[derive(Debug)]
pub struct DecodedModel {
    pub name: String,
    pub format: ModelFormat,
    pub surfaces: Vec<DecodedSurface>,
}

/// Maps the URL extension to a decoder. Unknown extensions are rejected
/// here, with no network or parse attempted.
pub fn detect_format(url: &str) -> Result<ModelFormat, ViewerError> {
    let extension = Path::new(url)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("glb") | Some("gltf") => Ok(ModelFormat::BinaryScene),
        Some("json") => Ok(ModelFormat::FlatJson),
        _ => Err(ViewerError::UnsupportedFormat {
            url: url.to_string(),
        }),
    }
}

/// Reads the raw bytes behind a URL. Native hosts go through the
/// filesystem; hosts with their own transport skip this and call
/// [`decode`] with the bytes they already have.
pub fn load_binary(url: &str) -> Result<Vec<u8>, ViewerError> {
    Ok(std::fs::read(url)?)
}

/// Dispatches to the decoder selected by `url`'s extension.
pub fn decode(url: &str, bytes: &[u8]) -> Result<DecodedModel, ViewerError> {
    let format = detect_format(url)?;
    let name = Path::new(url)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();
    let surfaces = match format {
        ModelFormat::BinaryScene => gltf_scene::decode(&name, bytes)?,
        ModelFormat::FlatJson => flat_json::decode(&name, bytes)?,
    };
    if surfaces.is_empty() {
        return Err(ViewerError::decode("file contains no mesh surfaces"));
    }
    Ok(DecodedModel {
        name,
        format,
        surfaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_routing() {
        assert_eq!(
            detect_format("brain.glb").unwrap(),
            ModelFormat::BinaryScene
        );
        assert_eq!(
            detect_format("scene/model.GLTF").unwrap(),
            ModelFormat::BinaryScene
        );
        assert_eq!(detect_format("legacy.json").unwrap(), ModelFormat::FlatJson);
    }

    #[test]
    fn unknown_extension_is_rejected_before_io() {
        let err = detect_format("mesh.obj").unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat { .. }));
        assert!(detect_format("no_extension").is_err());
    }
}
