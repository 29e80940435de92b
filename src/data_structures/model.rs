//! Surfaces and the model root that owns them.
//!
//! A `Surface` is one geometry buffer set plus its two owned materials; the
//! `ModelRoot` groups every surface of a loaded file and remembers which
//! coordinate frame it mounts under. At most one model root exists at a
//! time, exclusively owned by the lifecycle manager.

use crate::data_structures::geometry::{Bounds, GeometryBuffers};
use crate::data_structures::instance::Instance;
use crate::data_structures::material::{ActiveKind, BaseMaterial, WireMaterial};
use crate::data_structures::scene_graph::{Frame, NodeId};
use crate::synthesis::AttributeReport;

/// Source file kind, which decides the decoder and the mount frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.glb` / `.gltf`: already oriented by the exporter pipeline.
    BinaryScene,
    /// `.json` flat geometry: Z-up, needs the raw root's axis correction.
    FlatJson,
}

impl ModelFormat {
    /// The single most important routing rule in the crate: mounting a flat
    /// file under the native root silently renders it on its side.
    pub fn frame(self) -> Frame {
        match self {
            ModelFormat::BinaryScene => Frame::Native,
            ModelFormat::FlatJson => Frame::LegacyRaw,
        }
    }
}

/// One renderable mesh surface: geometry plus its base/wire material pair.
///
/// Both materials exist for the whole life of the surface; `active` selects
/// which one is rendered and only the visualization engine transitions it.
#[derive(Debug)]
pub struct Surface {
    pub name: String,
    pub node_id: NodeId,
    pub geometry: GeometryBuffers,
    pub base: BaseMaterial,
    pub wire: WireMaterial,
    pub active: ActiveKind,
    pub transform: Instance,
    pub report: AttributeReport,
}

impl Surface {
    pub fn new(name: String, geometry: GeometryBuffers, report: AttributeReport) -> Self {
        Self {
            name,
            node_id: NodeId::next(),
            geometry,
            base: BaseMaterial::default(),
            wire: WireMaterial::default(),
            active: ActiveKind::Base,
            transform: Instance::new(),
            report,
        }
    }

    pub fn set_active(&mut self, kind: ActiveKind) {
        self.active = kind;
    }

    /// Visibility flag of whichever material is currently active.
    pub fn active_visible(&self) -> bool {
        match self.active {
            ActiveKind::Base => self.base.visible,
            ActiveKind::Wire => self.wire.visible,
        }
    }

    pub fn dispose(&mut self) {
        self.geometry.dispose();
    }
}

/// The grouping node owning every surface of the loaded model.
#[derive(Debug)]
pub struct ModelRoot {
    pub name: String,
    pub node_id: NodeId,
    pub format: ModelFormat,
    pub frame: Frame,
    pub transform: Instance,
    pub surfaces: Vec<Surface>,
}

impl ModelRoot {
    pub fn new(name: String, format: ModelFormat, surfaces: Vec<Surface>) -> Self {
        Self {
            name,
            node_id: NodeId::next(),
            format,
            frame: format.frame(),
            transform: Instance::new(),
            surfaces,
        }
    }

    /// Merged bounds over all surfaces. Degenerate (empty) models report a
    /// zero radius with no box; callers tell them apart from the no-model
    /// case by the radius, which defaults to 100 only when nothing is loaded.
    pub fn bounds(&self) -> Bounds {
        let mut merged: Option<(cgmath::Vector3<f32>, cgmath::Vector3<f32>)> = None;
        for surface in &self.surfaces {
            if let Some((min, max)) = surface.geometry.bounding_box() {
                merged = Some(match merged {
                    None => (min, max),
                    Some((a, b)) => (
                        cgmath::Vector3::new(a.x.min(min.x), a.y.min(min.y), a.z.min(min.z)),
                        cgmath::Vector3::new(b.x.max(max.x), b.y.max(max.y), b.z.max(max.z)),
                    ),
                });
            }
        }
        match merged {
            Some((min, max)) => {
                let center = (min + max) * 0.5;
                let radius = self
                    .surfaces
                    .iter()
                    .filter_map(|s| s.geometry.bounding_sphere())
                    .map(|(c, r)| {
                        use cgmath::InnerSpace;
                        (c - center).magnitude() + r
                    })
                    .fold(0.0f32, f32::max);
                Bounds {
                    radius,
                    bbox: Some((min, max)),
                    center,
                }
            }
            None => Bounds {
                radius: 0.0,
                bbox: None,
                center: cgmath::Vector3::new(0.0, 0.0, 0.0),
            },
        }
    }

    /// World transform of one surface, including the root's own transform.
    pub fn surface_world(&self, surface: &Surface) -> Instance {
        &self.transform * &surface.transform
    }

    pub fn dispose(&mut self) {
        for surface in &mut self.surfaces {
            surface.dispose();
        }
        self.surfaces.clear();
    }
}
