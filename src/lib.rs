//! mesh-stage
//!
//! The mesh lifecycle and visualization-state core of an embeddable 3D
//! surface-model viewer. This crate owns the loaded model and everything
//! derived from it: synthesized geometry attributes (normals, UVs, tangents),
//! the per-surface base/wire material pair, debug helper overlays and the
//! selection marker. Rendering, camera control, picking and UI are owned by
//! collaborators outside this crate.
//!
//! High-level modules
//! - `data_structures`: geometry buffers, materials, transforms and the
//!   two-frame scene graph the model mounts into
//! - `resources`: file-format detection and the glTF / flat-JSON decoders
//! - `synthesis`: render-ready attribute synthesis for decoded geometry
//! - `downsample`: reduced-density derived geometry for glyph overlays
//! - `lifecycle`: the manager that owns the currently loaded model
//! - `visualization`: reconciliation of the host's visualization state
//!   against the live scene
//! - `marker`: a standalone pulsing selection marker
//!

pub mod data_structures;
pub mod downsample;
pub mod error;
pub mod lifecycle;
pub mod marker;
pub mod resources;
pub mod synthesis;
pub mod visualization;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use data_structures::geometry::{Bounds, GeometryBuffers, DEFAULT_BOUNDS_RADIUS};
pub use data_structures::model::{ModelFormat, ModelRoot, Surface};
pub use data_structures::scene_graph::{Frame, SceneRoots};
pub use error::ViewerError;
pub use lifecycle::{LoadState, MeshLifecycleManager};
pub use marker::SelectionMarker;
pub use visualization::{VisualizationEngine, VisualizationState};
