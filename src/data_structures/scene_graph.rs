//! The two coordinate-frame mount roots the model hangs under.
//!
//! The scene hierarchy itself is owned by the embedding application; this
//! crate only ever adds and removes its own nodes beneath one of two named
//! mount points. Binary scene files arrive already oriented for the viewer
//! and mount under the native root. Legacy flat files are Z-up and mount
//! under the raw root, whose transform carries the up-axis correction the
//! decoder does not apply.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Deg, Quaternion, Rotation3};
use log::warn;

use crate::data_structures::instance::Instance;

/// Identity of a node this crate has placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The coordinate frame a model root is mounted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Exporter-oriented content, mounted with an identity transform.
    Native,
    /// Legacy/raw Z-up content; the root transform applies the up-axis fix.
    LegacyRaw,
}

/// A grouping node: a named transform with child node ids.
#[derive(Clone, Debug)]
pub struct Group {
    pub name: String,
    pub transform: Instance,
    pub children: Vec<NodeId>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Instance::new(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, id: NodeId) {
        self.children.push(id);
    }

    pub fn remove_child(&mut self, id: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != id);
        before != self.children.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }
}

/// The two externally agreed mount points. Constructor-injected into the
/// lifecycle manager so there is no ambient scene state.
#[derive(Debug)]
pub struct SceneRoots {
    native: Group,
    legacy_raw: Group,
}

impl SceneRoots {
    pub fn new() -> Self {
        let mut legacy_raw = Group::new("legacy_raw_root");
        // Z-up to Y-up correction for legacy flat files.
        legacy_raw.transform.rotation = Quaternion::from_angle_x(Deg(-90.0));
        Self {
            native: Group::new("native_root"),
            legacy_raw,
        }
    }

    pub fn root(&self, frame: Frame) -> &Group {
        match frame {
            Frame::Native => &self.native,
            Frame::LegacyRaw => &self.legacy_raw,
        }
    }

    pub fn root_mut(&mut self, frame: Frame) -> &mut Group {
        match frame {
            Frame::Native => &mut self.native,
            Frame::LegacyRaw => &mut self.legacy_raw,
        }
    }

    pub fn mount(&mut self, frame: Frame, id: NodeId) {
        if self.parent_of(id).is_some() {
            warn!("node {:?} is already mounted, unmounting first", id);
            self.unmount_everywhere(id);
        }
        self.root_mut(frame).add_child(id);
    }

    /// Detaches from *both* roots. Callers may not reliably track which frame
    /// a node went under, so teardown always sweeps both.
    pub fn unmount_everywhere(&mut self, id: NodeId) -> bool {
        let a = self.native.remove_child(id);
        let b = self.legacy_raw.remove_child(id);
        a || b
    }

    pub fn parent_of(&self, id: NodeId) -> Option<Frame> {
        if self.native.contains(id) {
            Some(Frame::Native)
        } else if self.legacy_raw.contains(id) {
            Some(Frame::LegacyRaw)
        } else {
            None
        }
    }

    /// Total mounted nodes across both frames.
    pub fn node_count(&self) -> usize {
        self.native.children.len() + self.legacy_raw.children.len()
    }
}

impl Default for SceneRoots {
    fn default() -> Self {
        Self::new()
    }
}
