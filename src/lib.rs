//! # JT
//!
//! Rust implementation of the JT (Jupiter Tessellation) 8.1 binary CAD
//! interchange format.
//!
//! The JT format was developed by Siemens Digital Industries Software
//! (originally Engineering Animation, Inc.). All rights to the format
//! belong to its authors. This is an independent Rust implementation of
//! the 8.1 file layout, aiming for binary compatibility with existing
//! viewers.
//!
//! ## Modules
//!
//! - [`util`] - Errors, bounding boxes, count ranges
//! - [`io`] - Byte-order aware cursor and buffer codecs
//! - [`guid`] - 16-byte object/segment identifiers
//! - [`codec`] - Bit packing and Int32 predictor compression
//! - [`compress`] - zlib segment payload compression
//! - [`element`] - Typed scene-graph elements and their wire forms
//! - [`property`] - Per-node key/value property tables
//! - [`segment`] - File header, TOC and the segment containers
//! - [`scene`] - Caller-facing scene tree
//! - [`writer`] - Scene tree to file lowering
//! - [`reader`] - File parsing and scene reconstruction
//!
//! ## Example
//!
//! ```ignore
//! use jt::{save, JtFile, SceneNode};
//!
//! let mut root = SceneNode::new();
//! root.name = Some("Housing".to_string());
//! save(&root, "housing.jt")?;
//!
//! let file = JtFile::open("housing.jt")?;
//! println!("{} nodes", file.scene()?.subtree_len());
//! ```

pub mod util;
pub mod io;
pub mod guid;
pub mod codec;
pub mod compress;
pub mod element;
pub mod property;
pub mod segment;
pub mod scene;
pub mod writer;
pub mod reader;

// Re-export commonly used types
pub use util::{Error, Result};
pub use guid::Guid;
pub use scene::{GeometricSet, MeasurementUnit, PropertyValue, Rgba, SceneNode};
pub use writer::{save, save_with, SaveEvent, SaveOptions};
pub use reader::JtFile;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::guid::Guid;
    pub use crate::reader::JtFile;
    pub use crate::scene::{GeometricSet, MeasurementUnit, PropertyValue, Rgba, SceneNode};
    pub use crate::util::{Error, Result};
    pub use crate::writer::{save, save_with, SaveEvent, SaveOptions};
}
