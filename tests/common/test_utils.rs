//! Shared fixtures for the integration tests: synthetic model files in both
//! supported formats plus a preloaded manager.

use mesh_stage::lifecycle::MeshLifecycleManager;
use mesh_stage::SceneRoots;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const TETRA_POSITIONS: [[f32; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
];

pub const TETRA_INDICES: [u32; 12] = [0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3];

/// A tetrahedron in the legacy flat JSON format: positions + faces only, so
/// every other attribute must come from synthesis.
pub fn tetra_json() -> Vec<u8> {
    let vertices: Vec<f32> = TETRA_POSITIONS.iter().flatten().copied().collect();
    serde_json::to_vec(&serde_json::json!({
        "name": "tetra",
        "vertices": vertices,
        "faces": TETRA_INDICES,
    }))
    .unwrap()
}

/// Assembles a minimal valid GLB: one buffer, one mesh, one
/// primitive with POSITION + u32 indices.
pub fn build_glb(positions: &[[f32; 3]], indices: &[u32]) -> Vec<u8> {
    let mut bin: Vec<u8> = Vec::new();
    for p in positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let pos_len = bin.len();
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let idx_len = bin.len() - pos_len;
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    let json = serde_json::json!({
        "asset": {"version": "2.0"},
        "buffers": [{"byteLength": bin.len()}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": pos_len},
            {"buffer": 0, "byteOffset": pos_len, "byteLength": idx_len}
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": positions.len(),
                "type": "VEC3",
                "min": min,
                "max": max
            },
            {
                "bufferView": 1,
                "componentType": 5125,
                "count": indices.len(),
                "type": "SCALAR"
            }
        ],
        "meshes": [{"name": "surface", "primitives": [
            {"attributes": {"POSITION": 0}, "indices": 1, "mode": 4}
        ]}],
        "nodes": [{"mesh": 0}],
        "scenes": [{"nodes": [0]}],
        "scene": 0
    });
    let mut json_bytes = serde_json::to_vec(&json).unwrap();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&0x4654_6C67u32.to_le_bytes()); // "glTF"
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes()); // "JSON"
    out.extend(json_bytes);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942u32.to_le_bytes()); // "BIN\0"
    out.extend(bin);
    out
}

pub fn tetra_glb() -> Vec<u8> {
    build_glb(&TETRA_POSITIONS, &TETRA_INDICES)
}

/// A manager with the tetrahedron already loaded from the given file name.
pub fn loaded_manager(url: &str, bytes: &[u8]) -> MeshLifecycleManager {
    let mut manager = MeshLifecycleManager::new(SceneRoots::new());
    manager
        .load_model_from_bytes(url, bytes)
        .expect("fixture model should load");
    manager
}
