//! Core data types for scene representation:
//!
//! - `geometry` contains the named attribute buffer set and bounding queries
//! - `instance` holds the position/rotation/scale transform type
//! - `material` contains the base/wire material pair and color parsing
//! - `model` contains surfaces and the model root that owns them
//! - `scene_graph` provides the two coordinate-frame mount roots

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
