//! Reconciliation of the host's visualization state against the live scene.
//!
//! The host owns the canonical state object and re-sends the whole thing on
//! every change; this engine holds no copy of it. Each `apply_state` call
//! runs four passes: surface (visibility/opacity/shading), edge (base/wire
//! material swap), helper (normal/tangent glyph overlays, rebuilt from
//! downsampled derived geometry) and scene (lighting/axes/background
//! forwarding). Helper overlays are always disposed and rebuilt rather than
//! diffed, which makes repeated identical applies leak-free by construction.

use cgmath::{InnerSpace, Vector3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::data_structures::geometry::GeometryBuffers;
use crate::data_structures::material::{
    parse_hex_color, ActiveKind, ColorMode, Shading,
};
use crate::data_structures::model::Surface;
use crate::data_structures::scene_graph::{NodeId, SceneRoots};
use crate::downsample::{copy_transform, downsample, TransformProxy};
use crate::lifecycle::MeshLifecycleManager;

/// Upper bound on glyphs per surface; the downsampling stride is chosen to
/// stay under it.
pub const HELPER_MAX_GLYPHS: usize = 2048;

/// Glyph needle length as a fraction of the model bounding radius.
const GLYPH_LENGTH_FACTOR: f32 = 0.02;

const VERTEX_NORMAL_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
const FACE_NORMAL_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
const TANGENT_COLOR: [f32; 3] = [0.0, 1.0, 1.0];

// --- host-owned state schema -------------------------------------------------

/// The versioned plain-data state object the host re-sends on every change.
/// JSON-representable, no functions, treated as a read-only snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationState {
    pub surface: SurfaceState,
    pub edges: EdgeState,
    pub helpers: HelperState,
    pub overlays: OverlayState,
    pub scene: SceneState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceState {
    pub visible: bool,
    pub opacity: f32,
    pub shading: Shading,
    pub color_mode: ColorMode,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            shading: Shading::Smooth,
            color_mode: ColorMode::Uniform,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeState {
    pub wireframe: bool,
    pub color: String,
}

impl Default for EdgeState {
    fn default() -> Self {
        Self {
            wireframe: false,
            color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelperState {
    pub vertex_normals: bool,
    pub face_normals: bool,
    pub tangents: bool,
}

impl HelperState {
    pub fn any(&self) -> bool {
        self.vertex_normals || self.face_normals || self.tangents
    }
}

/// Scalar-field overlay selection. Carried in the schema for the host; the
/// colormap collaborator applies it, not this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayState {
    pub scalar_field: String,
    pub colormap: String,
    pub auto_range: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            scalar_field: "none".to_string(),
            colormap: "viridis".to_string(),
            auto_range: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneState {
    pub lighting: bool,
    pub axes: bool,
    pub background: String,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            lighting: true,
            axes: false,
            background: "#000000".to_string(),
        }
    }
}

// --- derived scene objects ---------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperKind {
    VertexNormals,
    FaceNormals,
    Tangents,
}

const HELPER_KINDS: [HelperKind; 3] = [
    HelperKind::VertexNormals,
    HelperKind::FaceNormals,
    HelperKind::Tangents,
];

/// One glyph mesh: line-segment pairs in surface-local space plus the
/// world transform of the surface they annotate.
#[derive(Debug)]
pub struct GlyphMesh {
    pub surface_node: NodeId,
    pub proxy: TransformProxy,
    pub color: [f32; 3],
}

/// Transient grouping node for one helper kind; exists only while the
/// toggle is on and the model is loaded.
#[derive(Debug)]
pub struct HelperOverlay {
    pub kind: HelperKind,
    pub node_id: NodeId,
    pub glyphs: Vec<GlyphMesh>,
}

/// Owned-but-external scene toggles the engine forwards to.
#[derive(Debug, Clone)]
pub struct SceneEnvironment {
    pub lighting_visible: bool,
    pub axes_visible: bool,
    pub background: [f32; 3],
}

impl Default for SceneEnvironment {
    fn default() -> Self {
        Self {
            lighting_visible: true,
            axes_visible: false,
            background: [0.0, 0.0, 0.0],
        }
    }
}

/// The edge-pass decision, shared with the helper pass so the "hide mesh
/// fill only while wireframe is off" rule lives in exactly one place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MaterialTarget {
    pub active: ActiveKind,
    pub visible: bool,
}

pub(crate) fn resolve_surface_material(
    state: &VisualizationState,
    helpers_on: bool,
) -> MaterialTarget {
    let active = if state.edges.wireframe {
        ActiveKind::Wire
    } else {
        ActiveKind::Base
    };
    let mut visible = state.surface.visible;
    // Helpers are inspected against the wireframe as a spatial reference, so
    // the mesh fill is hidden only while the wireframe is off.
    if helpers_on && !state.edges.wireframe {
        visible = false;
    }
    MaterialTarget { active, visible }
}

// --- the engine --------------------------------------------------------------

#[derive(Default)]
pub struct VisualizationEngine {
    overlays: Vec<HelperOverlay>,
    env: SceneEnvironment,
}

impl VisualizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> &SceneEnvironment {
        &self.env
    }

    pub fn helper_overlays(&self) -> &[HelperOverlay] {
        &self.overlays
    }

    /// Applies a state snapshot to the currently loaded mesh set. Idempotent:
    /// an identical snapshot produces no visible change and no duplicated
    /// helper nodes.
    pub fn apply_state(&mut self, state: &VisualizationState, manager: &mut MeshLifecycleManager) {
        let helpers_on = state.helpers.any();
        let target = resolve_surface_material(state, helpers_on);

        let wire_color = parse_hex_color(&state.edges.color);
        if state.edges.wireframe && wire_color.is_none() {
            warn!("unparsable edge color {:?}, keeping previous", state.edges.color);
        }

        // Surface + edge pass.
        if let Some(root) = manager.model_root_mut() {
            for surface in &mut root.surfaces {
                surface.base.opacity = state.surface.opacity;
                surface.base.transparent = state.surface.opacity < 1.0;
                surface.base.flat_shading = state.surface.shading == Shading::Flat;
                surface.base.color_mode = state.surface.color_mode;

                surface.set_active(target.active);
                match target.active {
                    ActiveKind::Base => {
                        surface.base.visible = target.visible;
                        surface.wire.visible = false;
                    }
                    ActiveKind::Wire => {
                        surface.wire.visible = target.visible;
                        surface.base.visible = false;
                        if let Some(color) = wire_color {
                            surface.wire.color = color;
                        }
                    }
                }
            }
        }

        // Helper pass: each kind independent, dispose-then-rebuild.
        for kind in HELPER_KINDS {
            self.teardown_overlay(kind, manager.scene_roots_mut());
            let enabled = match kind {
                HelperKind::VertexNormals => state.helpers.vertex_normals,
                HelperKind::FaceNormals => state.helpers.face_normals,
                HelperKind::Tangents => state.helpers.tangents,
            };
            if enabled {
                self.build_overlay(kind, manager);
            }
        }

        // Scene pass: pure forwarding, no state retained here.
        self.env.lighting_visible = state.scene.lighting;
        self.env.axes_visible = state.scene.axes;
        match parse_hex_color(&state.scene.background) {
            Some(color) => self.env.background = color,
            None => warn!(
                "unparsable background color {:?}, keeping previous",
                state.scene.background
            ),
        }
    }

    /// Invalidates every helper the previous model left behind. The
    /// lifecycle owner calls this right after load/clear, before the next
    /// `apply_state`.
    pub fn on_model_changed(&mut self, manager: &mut MeshLifecycleManager) {
        let roots = manager.scene_roots_mut();
        for kind in HELPER_KINDS {
            self.teardown_overlay(kind, roots);
        }
    }

    /// End-of-life teardown; equivalent to turning every helper off.
    pub fn dispose(&mut self, manager: &mut MeshLifecycleManager) {
        self.on_model_changed(manager);
    }

    fn teardown_overlay(&mut self, kind: HelperKind, roots: &mut SceneRoots) {
        if let Some(index) = self.overlays.iter().position(|o| o.kind == kind) {
            let mut overlay = self.overlays.swap_remove(index);
            roots.unmount_everywhere(overlay.node_id);
            for glyph in &mut overlay.glyphs {
                glyph.proxy.geometry.dispose();
            }
        }
    }

    fn build_overlay(&mut self, kind: HelperKind, manager: &mut MeshLifecycleManager) {
        let radius = manager.bounds().radius;
        let glyph_length = (radius * GLYPH_LENGTH_FACTOR).max(1e-3);

        let (model, roots) = manager.model_and_roots_mut();
        let Some(root) = model else {
            return;
        };

        let mut glyphs = Vec::new();
        for surface in &root.surfaces {
            let Some(geometry) = build_glyph_geometry(kind, surface, glyph_length) else {
                // Pre-conditions (normals/tangents/topology) not met; the
                // synthesis report already logged why.
                continue;
            };
            let world = root.surface_world(surface);
            glyphs.push(GlyphMesh {
                surface_node: surface.node_id,
                proxy: copy_transform(geometry, &world),
                color: match kind {
                    HelperKind::VertexNormals => VERTEX_NORMAL_COLOR,
                    HelperKind::FaceNormals => FACE_NORMAL_COLOR,
                    HelperKind::Tangents => TANGENT_COLOR,
                },
            });
        }
        if glyphs.is_empty() {
            return;
        }

        let overlay = HelperOverlay {
            kind,
            node_id: NodeId::next(),
            glyphs,
        };
        roots.mount(root.frame, overlay.node_id);
        self.overlays.push(overlay);
    }
}

/// Builds the line-segment soup for one helper kind over one surface, in
/// surface-local space. Two positions per glyph (start, tip).
fn build_glyph_geometry(
    kind: HelperKind,
    surface: &Surface,
    glyph_length: f32,
) -> Option<GeometryBuffers> {
    match kind {
        HelperKind::VertexNormals => {
            let stride = stride_for(surface.geometry.vertex_count());
            let derived = downsample(&surface.geometry, stride, false)?;
            let normals = derived.normals.as_ref()?;
            let mut positions = Vec::with_capacity(derived.positions.len() * 2);
            for (p, n) in derived.positions.iter().zip(normals) {
                push_segment(&mut positions, Vector3::from(*p), Vector3::from(*n), glyph_length);
            }
            Some(GeometryBuffers {
                positions,
                ..Default::default()
            })
        }
        HelperKind::Tangents => {
            let stride = stride_for(surface.geometry.vertex_count());
            let derived = downsample(&surface.geometry, stride, true)?;
            let tangents = derived.tangents.as_ref()?;
            let mut positions = Vec::with_capacity(derived.positions.len() * 2);
            for (p, t) in derived.positions.iter().zip(tangents) {
                let dir = Vector3::new(t[0], t[1], t[2]);
                push_segment(&mut positions, Vector3::from(*p), dir, glyph_length);
            }
            Some(GeometryBuffers {
                positions,
                ..Default::default()
            })
        }
        HelperKind::FaceNormals => {
            let indices = surface.geometry.indices.as_ref()?;
            let stride = stride_for(surface.geometry.triangle_count());
            let mut positions = Vec::new();
            for tri in indices.chunks_exact(3).step_by(stride) {
                let p0 = Vector3::from(surface.geometry.positions[tri[0] as usize]);
                let p1 = Vector3::from(surface.geometry.positions[tri[1] as usize]);
                let p2 = Vector3::from(surface.geometry.positions[tri[2] as usize]);
                let face = (p1 - p0).cross(p2 - p0);
                if face.magnitude2() <= f32::EPSILON {
                    continue;
                }
                let centroid = (p0 + p1 + p2) / 3.0;
                push_segment(&mut positions, centroid, face.normalize(), glyph_length);
            }
            if positions.is_empty() {
                return None;
            }
            Some(GeometryBuffers {
                positions,
                ..Default::default()
            })
        }
    }
}

fn stride_for(count: usize) -> usize {
    count.div_ceil(HELPER_MAX_GLYPHS).max(1)
}

fn push_segment(
    positions: &mut Vec<[f32; 3]>,
    start: Vector3<f32>,
    direction: Vector3<f32>,
    length: f32,
) {
    let tip = start + direction * length;
    positions.push([start.x, start.y, start.z]);
    positions.push([tip.x, tip.y, tip.z]);
}
