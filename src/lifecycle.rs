//! The mesh lifecycle manager.
//!
//! Owns the currently loaded model and the two scene mount roots. The load
//! path is: detect format, decode, synthesize missing attributes, attach the
//! base/wire material pair, mount under the format's coordinate frame.
//! Loading always fully disposes the previous model first, and a failed load
//! leaves the manager empty rather than half-mounted.
//!
//! Hosts that run the decoder themselves (or off-thread) use the two-phase
//! `begin_load` / `install_decoded` pair: each load attempt gets a
//! generation ticket and a decode result is only installed while its ticket
//! is still current, so a clear or a newer load silently discards stale
//! results instead of mounting an orphaned model.

use log::{info, warn};

use crate::data_structures::geometry::Bounds;
use crate::data_structures::model::{ModelRoot, Surface};
use crate::data_structures::scene_graph::SceneRoots;
use crate::error::ViewerError;
use crate::resources::{self, DecodedModel};
use crate::synthesis;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Loaded,
}

/// Ticket identifying one load attempt. Opaque to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadGeneration(u64);

pub struct MeshLifecycleManager {
    roots: SceneRoots,
    model: Option<ModelRoot>,
    state: LoadState,
    generation: u64,
}

impl MeshLifecycleManager {
    /// The two mount roots are injected here; there is no ambient scene.
    pub fn new(roots: SceneRoots) -> Self {
        Self {
            roots,
            model: None,
            state: LoadState::Empty,
            generation: 0,
        }
    }

    /// Loads a model file from the local filesystem. The extension is
    /// checked before any read happens.
    pub fn load_model_from_url(&mut self, url: &str) -> Result<(), ViewerError> {
        resources::detect_format(url)?;
        let bytes = resources::load_binary(url)?;
        self.load_model_from_bytes(url, &bytes)
    }

    /// Loads a model from bytes the host already fetched. `url` is still
    /// used for format detection and naming.
    pub fn load_model_from_bytes(&mut self, url: &str, bytes: &[u8]) -> Result<(), ViewerError> {
        // Reject unknown extensions before the current model is touched.
        resources::detect_format(url)?;
        let generation = self.begin_load();
        match resources::decode(url, bytes) {
            Ok(decoded) => {
                self.install_decoded(generation, decoded);
                Ok(())
            }
            Err(e) => {
                // The previous model is already gone; stay cleanly empty.
                self.state = LoadState::Empty;
                Err(e)
            }
        }
    }

    /// Starts a load attempt: clears any current model and hands back the
    /// ticket a later [`install_decoded`](Self::install_decoded) must match.
    pub fn begin_load(&mut self) -> LoadGeneration {
        self.clear_model();
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadGeneration(self.generation)
    }

    /// Installs a decode result if its ticket is still current. A stale
    /// result (a newer load started, or the model was cleared meanwhile) is
    /// dropped and `false` is returned.
    pub fn install_decoded(&mut self, generation: LoadGeneration, decoded: DecodedModel) -> bool {
        if generation.0 != self.generation {
            info!(
                "discarding stale decode result for {:?} (generation {:?}, current {})",
                decoded.name, generation, self.generation
            );
            return false;
        }

        let surfaces = decoded
            .surfaces
            .into_iter()
            .map(|mut decoded_surface| {
                let report = synthesis::ensure_attributes(&mut decoded_surface.geometry);
                if !report.has_tangents {
                    // Degraded but renderable; never fails the load.
                    warn!(
                        "surface {:?} loaded without tangents (normals: {}, uvs: {})",
                        decoded_surface.name, report.has_normals, report.has_uvs
                    );
                }
                Surface::new(decoded_surface.name, decoded_surface.geometry, report)
            })
            .collect::<Vec<_>>();

        let root = ModelRoot::new(decoded.name, decoded.format, surfaces);
        info!(
            "mounting model {:?} ({} surfaces) under {:?}",
            root.name,
            root.surfaces.len(),
            root.frame
        );
        self.roots.mount(root.frame, root.node_id);
        self.model = Some(root);
        self.state = LoadState::Loaded;
        true
    }

    /// Unmounts and disposes the current model. Idempotent; also invalidates
    /// any in-flight load ticket.
    pub fn clear_model(&mut self) {
        self.generation += 1;
        if let Some(mut root) = self.model.take() {
            // Sweep both roots: caller state may not track which frame was used.
            self.roots.unmount_everywhere(root.node_id);
            root.dispose();
        }
        self.state = LoadState::Empty;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn model_root(&self) -> Option<&ModelRoot> {
        self.model.as_ref()
    }

    pub fn model_root_mut(&mut self) -> Option<&mut ModelRoot> {
        self.model.as_mut()
    }

    /// The live scene hierarchy, for host queries.
    pub fn scene_roots(&self) -> &SceneRoots {
        &self.roots
    }

    pub fn scene_roots_mut(&mut self) -> &mut SceneRoots {
        &mut self.roots
    }

    /// Splits the borrow so the visualization engine can read the model
    /// while mounting helper nodes into the scene.
    pub(crate) fn model_and_roots_mut(&mut self) -> (Option<&mut ModelRoot>, &mut SceneRoots) {
        (self.model.as_mut(), &mut self.roots)
    }

    /// Bounding information for camera framing. With no model loaded this
    /// reports the default radius and no box.
    pub fn bounds(&self) -> Bounds {
        match &self.model {
            Some(root) => root.bounds(),
            None => Bounds::default(),
        }
    }
}
