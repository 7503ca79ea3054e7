use std::path::PathBuf;

use crate::attribute::{Attribute, XType};
use crate::dimension::Dimension;
use crate::errors::Result;
use crate::mesh::Mesh;
use crate::varinfo::{AuxVar, CoordVar, DataVar};

/// The primitive seam a concrete storage format implements.
///
/// Everything a [`Collection`](crate::Collection) exposes (metadata queries,
/// derived dimension logic, the open/read/close pipeline, one-shot whole
/// variable reads) is built purely from these operations, so supporting a
/// new storage format means implementing only this trait.
///
/// `level` and `lod` arguments arrive canonicalized: the collection clamps
/// and resolves signed selectors first, so backends only ever see indices in
/// `0..num_ref_levels(name)` and `0..cratios.len()` respectively.
pub trait Format {
    /// Open the collection described by `paths` and build all metadata.
    /// Called once before any other operation.
    fn initialize(&mut self, paths: &[PathBuf], options: &[String]) -> Result<()>;

    fn dimension(&self, name: &str) -> Option<Dimension>;

    fn dimension_names(&self) -> Vec<String>;

    fn mesh(&self, name: &str) -> Option<Mesh>;

    fn mesh_names(&self) -> Vec<String>;

    fn coord_var_info(&self, name: &str) -> Option<CoordVar>;

    fn data_var_info(&self, name: &str) -> Option<DataVar>;

    fn aux_var_info(&self, name: &str) -> Option<AuxVar>;

    fn data_var_names(&self) -> Vec<String>;

    fn coord_var_names(&self) -> Vec<String>;

    fn aux_var_names(&self) -> Vec<String>;

    /// Depth of the variable's multiresolution hierarchy. Uncompressed
    /// variables report 1 (the native level only).
    fn num_ref_levels(&self, name: &str) -> usize;

    /// Look up an attribute bound to `varname`, or a global attribute when
    /// `varname` is empty. Typed access happens on the returned
    /// [`Attribute`].
    fn att(&self, varname: &str, attname: &str) -> Option<&Attribute>;

    fn att_names(&self, varname: &str) -> Vec<String>;

    fn att_type(&self, varname: &str, attname: &str) -> Option<XType> {
        self.att(varname, attname).map(|att| att.xtype())
    }

    /// Dimension lengths of `name` at a canonical refinement level, fastest
    /// varying first, along with the internal storage block size per axis.
    /// Backends without internal blocking report all-ones.
    fn dim_lens_at_level(&self, name: &str, level: usize) -> Result<(Vec<usize>, Vec<usize>)>;

    /// PROJ-style map projection string, empty if the collection has none.
    fn map_projection(&self) -> String {
        String::new()
    }

    /// Open one (timestep, variable, level, lod) tuple for reading and
    /// return a backend-private session token.
    fn open_variable_read(&mut self, ts: usize, name: &str, level: usize, lod: usize)
        -> Result<usize>;

    fn close_variable(&mut self, token: usize) -> Result<()>;

    /// Read the inclusive grid-index region `[min, max]` into `region`,
    /// decompressed and contiguous, fastest-varying axis first.
    fn read_region_f32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [f32],
    ) -> Result<()>;

    fn read_region_i32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [i32],
    ) -> Result<()>;

    /// Blocked variant of [`read_region_f32`](Format::read_region_f32):
    /// bounds are block-aligned and the backend's blocked layout is
    /// preserved in the output. Backends without internal blocking fall
    /// back to the contiguous read.
    fn read_region_block_f32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [f32],
    ) -> Result<()> {
        self.read_region_f32(token, min, max, region)
    }

    fn read_region_block_i32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [i32],
    ) -> Result<()> {
        self.read_region_i32(token, min, max, region)
    }

    /// True iff a stored volume exists for this tuple. Pure; no side
    /// effects.
    fn variable_exists(&self, ts: usize, name: &str, level: usize, lod: usize) -> bool;
}
