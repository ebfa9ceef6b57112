//! File-level containers: header, TOC and the three segment kinds.

pub mod header;
pub mod lsg;
pub mod meta_data;
pub mod shape_lod;
pub mod toc;

pub use header::{ElementHeader, FileHeader, LogicElementHeaderZlib, SegmentHeader};
pub use lsg::LsgSegment;
pub use meta_data::MetaDataSegment;
pub use shape_lod::ShapeLodSegment;
pub use toc::{TocEntry, TocSegment};

pub const SEGMENT_TYPE_LSG: i32 = 1;
pub const SEGMENT_TYPE_META_DATA: i32 = 4;
pub const SEGMENT_TYPE_SHAPE_LOD: i32 = 6;

/// Whether payloads of this segment type travel behind a zlib header.
/// Shape-LOD payloads compress their vertex data internally and are
/// stored raw at the segment level.
pub fn segment_type_compressed(segment_type: i32) -> bool {
    matches!(segment_type, SEGMENT_TYPE_LSG | SEGMENT_TYPE_META_DATA)
}
