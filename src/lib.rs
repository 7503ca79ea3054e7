//! Format-agnostic reader core for large multiresolution scientific
//! datasets.
//!
//! A [`Collection`] exposes metadata (dimensions, meshes, variable
//! descriptors) and a read pipeline (open, read, close, plus one-shot
//! `get_var` reads) over any storage format implementing the [`Format`]
//! trait. Variables may be multiresolution and compressed; which
//! approximation is read is selected by a refinement level and a
//! level-of-detail index into the variable's compression-ratio ladder, both
//! accepting the positive-from-coarsest / negative-from-finest convention.
//!
//! [`MemBackend`] is a ready-made in-RAM backend, useful as a reference
//! implementation and for exercising collections in tests.

mod attribute;
mod collection;
mod dimension;
mod errors;
mod filetable;
mod format;
mod level;
mod memory;
mod mesh;
#[cfg(test)]
mod testing;
mod varinfo;

pub use attribute::AttValues;
pub use attribute::Attribute;
pub use attribute::XType;
pub use collection::Collection;
pub use dimension::Dimension;
pub use errors::Error;
pub use errors::Result;
pub use filetable::FileHandle;
pub use filetable::FileObject;
pub use filetable::FileTable;
pub use format::Format;
pub use level::clamp_level;
pub use level::clamp_lod;
pub use level::resolve_level;
pub use level::resolve_lod;
pub use memory::MemBackend;
pub use mesh::Mesh;
pub use mesh::MeshType;
pub use varinfo::AuxVar;
pub use varinfo::Axis;
pub use varinfo::BaseVar;
pub use varinfo::CoordVar;
pub use varinfo::DataVar;
pub use varinfo::Location;
pub use varinfo::MissingValue;
