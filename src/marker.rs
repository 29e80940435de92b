//! A standalone selection marker: a stem plus head pinned to a vertex.
//!
//! The marker owns its two geometries and materials outright and never
//! touches the rest of the core. The stem points along the vertex's world
//! normal when the surface has normals, otherwise toward a caller-supplied
//! fallback point (typically the viewpoint), so the marker stays legible on
//! geometry without normals. The pulse animation never spawns timers; the
//! render loop drives it through [`SelectionMarker::tick`] with monotonic
//! wall-clock seconds.

use cgmath::{InnerSpace, Quaternion, Vector3};
use log::warn;

use crate::data_structures::geometry::GeometryBuffers;
use crate::data_structures::instance::Instance;
use crate::data_structures::model::Surface;
use crate::data_structures::scene_graph::{Frame, NodeId, SceneRoots};
use crate::error::ViewerError;

/// Duration of one positioning pulse.
pub const PULSE_SECONDS: f64 = 0.35;

const STEM_RADIUS: f32 = 0.015;
const STEM_LENGTH: f32 = 0.85;
const HEAD_RADIUS: f32 = 0.05;
const HEAD_LENGTH: f32 = 0.15;
const RADIAL_SEGMENTS: usize = 8;

/// Unlit marker material; opacity is animated by the pulse.
#[derive(Debug, Clone)]
pub struct MarkerMaterial {
    pub color: [f32; 3],
    pub opacity: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MarkerState {
    Hidden,
    Shown { pulse_started: f64 },
}

pub struct SelectionMarker {
    node_id: NodeId,
    stem_geometry: GeometryBuffers,
    head_geometry: GeometryBuffers,
    stem_material: MarkerMaterial,
    head_material: MarkerMaterial,
    transform: Instance,
    size: f32,
    state: MarkerState,
    disposed: bool,
}

impl SelectionMarker {
    pub fn new() -> Self {
        Self::with_size(1.0)
    }

    /// `size` scales the whole stem+head pair; pick it relative to the model
    /// bounds so the marker reads at any zoom.
    pub fn with_size(size: f32) -> Self {
        Self {
            node_id: NodeId::next(),
            stem_geometry: cylinder(STEM_RADIUS, STEM_LENGTH, RADIAL_SEGMENTS),
            head_geometry: cone(HEAD_RADIUS, HEAD_LENGTH, RADIAL_SEGMENTS),
            stem_material: MarkerMaterial {
                color: [1.0, 0.85, 0.1],
                opacity: 1.0,
                visible: false,
            },
            head_material: MarkerMaterial {
                color: [1.0, 0.55, 0.0],
                opacity: 1.0,
                visible: false,
            },
            transform: Instance::new(),
            size,
            state: MarkerState::Hidden,
            disposed: false,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn is_shown(&self) -> bool {
        matches!(self.state, MarkerState::Shown { .. })
    }

    pub fn transform(&self) -> &Instance {
        &self.transform
    }

    pub fn stem_material(&self) -> &MarkerMaterial {
        &self.stem_material
    }

    pub fn head_material(&self) -> &MarkerMaterial {
        &self.head_material
    }

    pub fn mount(&self, roots: &mut SceneRoots, frame: Frame) {
        roots.mount(frame, self.node_id);
    }

    /// Moves the marker to a vertex and (re)starts the pulse. Visibility and
    /// position always change together through this one entry point.
    ///
    /// `surface_world` is the surface's world transform; `fallback_toward`
    /// is a world-space point the stem aims at when the geometry carries no
    /// normals. `now` is the same clock later fed to `tick`.
    pub fn position_at_vertex(
        &mut self,
        surface: &Surface,
        surface_world: &Instance,
        vertex_index: usize,
        fallback_toward: Vector3<f32>,
        now: f64,
    ) -> Result<(), ViewerError> {
        let vertex_count = surface.geometry.vertex_count();
        if vertex_index >= vertex_count {
            return Err(ViewerError::InvalidVertexIndex {
                index: vertex_index,
                vertex_count,
            });
        }

        let local = Vector3::from(surface.geometry.positions[vertex_index]);
        let world_pos = surface_world.transform_point(local);

        let direction = match surface.geometry.normals.as_ref() {
            Some(normals) => {
                let n = Vector3::from(normals[vertex_index]);
                let d = surface_world.transform_direction(n);
                if d.magnitude2() > f32::EPSILON {
                    d.normalize()
                } else {
                    fallback_direction(world_pos, fallback_toward)
                }
            }
            None => fallback_direction(world_pos, fallback_toward),
        };

        self.transform.position = world_pos;
        self.transform.rotation = Quaternion::from_arc(Vector3::unit_y(), direction, None);
        self.transform.scale = Vector3::new(self.size, self.size, self.size);
        self.stem_material.visible = true;
        self.head_material.visible = true;
        self.state = MarkerState::Shown { pulse_started: now };
        Ok(())
    }

    pub fn hide(&mut self) {
        self.stem_material.visible = false;
        self.head_material.visible = false;
        self.state = MarkerState::Hidden;
    }

    /// Samples the pulse once. Call from the render loop with monotonic
    /// wall-clock seconds; a hidden marker ignores ticks.
    pub fn tick(&mut self, now: f64) {
        let MarkerState::Shown { pulse_started } = self.state else {
            return;
        };
        let u = ((now - pulse_started) / PULSE_SECONDS).clamp(0.0, 1.0) as f32;
        // Ease in and back out over the pulse window.
        let pulse = (u * std::f32::consts::PI).sin();
        let scale = self.size * (1.0 + 0.5 * pulse);
        self.transform.scale = Vector3::new(scale, scale, scale);
        self.stem_material.opacity = 1.0 - 0.4 * pulse;
        self.head_material.opacity = 1.0 - 0.4 * pulse;
    }

    /// Releases both geometries and materials and detaches from the scene.
    /// Skipping this leaks GPU resources in the embedding renderer; calling
    /// it twice is fine.
    pub fn dispose(&mut self, roots: &mut SceneRoots) {
        if self.disposed {
            warn!("selection marker disposed twice");
            return;
        }
        self.hide();
        roots.unmount_everywhere(self.node_id);
        self.stem_geometry.dispose();
        self.head_geometry.dispose();
        self.disposed = true;
    }
}

impl Default for SelectionMarker {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_direction(from: Vector3<f32>, toward: Vector3<f32>) -> Vector3<f32> {
    let d = toward - from;
    if d.magnitude2() > f32::EPSILON {
        d.normalize()
    } else {
        Vector3::unit_y()
    }
}

/// Open cylinder along +Y, base at the origin.
fn cylinder(radius: f32, length: f32, segments: usize) -> GeometryBuffers {
    let mut g = GeometryBuffers::default();
    let mut normals = Vec::new();
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        let (x, z) = (theta.cos(), theta.sin());
        g.positions.push([radius * x, 0.0, radius * z]);
        g.positions.push([radius * x, length, radius * z]);
        normals.push([x, 0.0, z]);
        normals.push([x, 0.0, z]);
    }
    let mut indices = Vec::new();
    for i in 0..segments as u32 {
        let a = i * 2;
        indices.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
    }
    g.indices = Some(indices);
    g.normals = Some(normals);
    g
}

/// Cone along +Y with its base ring at the top of the stem.
fn cone(radius: f32, length: f32, segments: usize) -> GeometryBuffers {
    let mut g = GeometryBuffers::default();
    let mut normals = Vec::new();
    let tip_y = STEM_LENGTH + length;
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        let (x, z) = (theta.cos(), theta.sin());
        g.positions.push([radius * x, STEM_LENGTH, radius * z]);
        let slope = Vector3::new(x * length, radius, z * length).normalize();
        normals.push([slope.x, slope.y, slope.z]);
    }
    // Tip vertex shared by every side triangle.
    g.positions.push([0.0, tip_y, 0.0]);
    normals.push([0.0, 1.0, 0.0]);
    let tip = segments as u32 + 1;
    let mut indices = Vec::new();
    for i in 0..segments as u32 {
        indices.extend_from_slice(&[i, tip, i + 1]);
    }
    g.indices = Some(indices);
    g.normals = Some(normals);
    g
}
