//! Lifecycle manager behavior: format routing, atomic replacement, clear
//! idempotence and the load-generation guard.

use mesh_stage::lifecycle::{LoadState, MeshLifecycleManager};
use mesh_stage::resources;
use mesh_stage::{Frame, SceneRoots, ViewerError, DEFAULT_BOUNDS_RADIUS};

use crate::common::test_utils::{
    init_logger, loaded_manager, tetra_glb, tetra_json,
};

mod common;

#[test]
fn glb_mounts_under_the_native_root() {
    init_logger();
    let manager = loaded_manager("model.glb", &tetra_glb());

    assert_eq!(manager.state(), LoadState::Loaded);
    let root = manager.model_root().unwrap();
    assert_eq!(
        manager.scene_roots().parent_of(root.node_id),
        Some(Frame::Native)
    );
    assert_eq!(root.surfaces.len(), 1);
}

#[test]
fn flat_json_mounts_under_the_legacy_raw_root() {
    init_logger();
    let manager = loaded_manager("model.json", &tetra_json());

    let root = manager.model_root().unwrap();
    assert_eq!(
        manager.scene_roots().parent_of(root.node_id),
        Some(Frame::LegacyRaw)
    );
}

#[test]
fn loaded_surfaces_have_a_complete_attribute_set() {
    init_logger();
    let manager = loaded_manager("model.glb", &tetra_glb());

    let surface = &manager.model_root().unwrap().surfaces[0];
    assert!(surface.report.has_normals);
    assert!(surface.report.has_uvs);
    assert!(surface.report.has_tangents);
    assert!(surface.geometry.normals.is_some());
    assert!(surface.geometry.uvs.is_some());
    assert!(surface.geometry.tangents.is_some());
}

#[test]
fn loading_b_replaces_a_atomically() {
    init_logger();
    let mut manager = loaded_manager("model.json", &tetra_json());
    let old_id = manager.model_root().unwrap().node_id;

    manager
        .load_model_from_bytes("replacement.glb", &tetra_glb())
        .unwrap();

    let root = manager.model_root().unwrap();
    assert_eq!(manager.scene_roots().node_count(), 1);
    assert_eq!(
        manager.scene_roots().parent_of(root.node_id),
        Some(Frame::Native)
    );
    assert_eq!(manager.scene_roots().parent_of(old_id), None);
}

#[test]
fn clear_is_idempotent() {
    init_logger();
    let mut manager = loaded_manager("model.json", &tetra_json());

    manager.clear_model();
    assert_eq!(manager.state(), LoadState::Empty);
    assert!(manager.model_root().is_none());
    assert_eq!(manager.scene_roots().node_count(), 0);

    manager.clear_model();
    assert_eq!(manager.state(), LoadState::Empty);
    assert!(manager.model_root().is_none());
    assert_eq!(manager.scene_roots().node_count(), 0);
}

#[test]
fn bounds_default_while_empty_and_real_when_loaded() {
    init_logger();
    let mut manager = MeshLifecycleManager::new(SceneRoots::new());

    let bounds = manager.bounds();
    assert_eq!(bounds.radius, DEFAULT_BOUNDS_RADIUS);
    assert!(bounds.bbox.is_none());

    manager
        .load_model_from_bytes("model.json", &tetra_json())
        .unwrap();
    let bounds = manager.bounds();
    assert!(bounds.bbox.is_some());
    assert!(bounds.radius > 0.0 && bounds.radius < DEFAULT_BOUNDS_RADIUS);
}

#[test]
fn unsupported_extension_fails_before_any_read() {
    init_logger();
    let mut manager = MeshLifecycleManager::new(SceneRoots::new());

    // The file does not exist; the extension check must reject first.
    let err = manager
        .load_model_from_url("/nonexistent/model.obj")
        .unwrap_err();
    assert!(matches!(err, ViewerError::UnsupportedFormat { .. }));
    assert_eq!(manager.state(), LoadState::Empty);
}

#[test]
fn unsupported_bytes_leave_the_current_model_intact() {
    init_logger();
    let mut manager = loaded_manager("model.json", &tetra_json());
    let kept_id = manager.model_root().unwrap().node_id;

    let err = manager
        .load_model_from_bytes("mesh.obj", b"v 0 0 0")
        .unwrap_err();
    assert!(matches!(err, ViewerError::UnsupportedFormat { .. }));
    // The rejected attempt must not have cleared anything.
    assert_eq!(manager.state(), LoadState::Loaded);
    assert_eq!(manager.model_root().unwrap().node_id, kept_id);
    assert_eq!(manager.scene_roots().node_count(), 1);
}

#[test]
fn decode_failure_leaves_a_clean_empty_state() {
    init_logger();
    let mut manager = loaded_manager("model.json", &tetra_json());

    let err = manager
        .load_model_from_bytes("broken.json", b"{\"vertices\": [1, 2]}")
        .unwrap_err();
    assert!(matches!(err, ViewerError::DecodeFailure { .. }));
    // The previous model is gone and nothing half-mounted remains.
    assert_eq!(manager.state(), LoadState::Empty);
    assert!(manager.model_root().is_none());
    assert_eq!(manager.scene_roots().node_count(), 0);
}

#[test]
fn degraded_synthesis_does_not_fail_the_load() {
    init_logger();
    // No faces: normals and tangents cannot be synthesized.
    let json = serde_json::to_vec(&serde_json::json!({
        "vertices": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    }))
    .unwrap();
    let manager = loaded_manager("soup.json", &json);

    assert_eq!(manager.state(), LoadState::Loaded);
    let surface = &manager.model_root().unwrap().surfaces[0];
    assert!(!surface.report.has_normals);
    assert!(!surface.report.has_tangents);
}

#[test]
fn stale_decode_result_is_discarded() {
    init_logger();
    let mut manager = MeshLifecycleManager::new(SceneRoots::new());

    let stale = manager.begin_load();
    let current = manager.begin_load();

    let decoded = resources::decode("model.json", &tetra_json()).unwrap();
    assert!(!manager.install_decoded(stale, decoded));
    assert!(manager.model_root().is_none());

    let decoded = resources::decode("model.json", &tetra_json()).unwrap();
    assert!(manager.install_decoded(current, decoded));
    assert_eq!(manager.state(), LoadState::Loaded);
}

#[test]
fn clear_during_load_invalidates_the_ticket() {
    init_logger();
    let mut manager = MeshLifecycleManager::new(SceneRoots::new());

    let ticket = manager.begin_load();
    manager.clear_model();

    let decoded = resources::decode("model.json", &tetra_json()).unwrap();
    assert!(!manager.install_decoded(ticket, decoded));
    assert_eq!(manager.state(), LoadState::Empty);
    assert_eq!(manager.scene_roots().node_count(), 0);
}

#[test]
fn glb_decoder_reads_back_the_written_geometry() {
    init_logger();
    let decoded = resources::decode("model.glb", &tetra_glb()).unwrap();
    assert_eq!(decoded.surfaces.len(), 1);
    let geometry = &decoded.surfaces[0].geometry;
    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.triangle_count(), 4);
    assert_eq!(geometry.positions[0], [1.0, 1.0, 1.0]);
    // The fixture carries no attributes beyond positions and indices.
    assert!(geometry.normals.is_none());
    assert!(geometry.uvs.is_none());
}
