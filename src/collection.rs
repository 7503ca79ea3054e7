use std::path::PathBuf;

use paste::paste;
use tracing::{debug, trace};

use crate::attribute::XType;
use crate::dimension::Dimension;
use crate::errors::{Error, Result};
use crate::filetable::{FileHandle, FileObject, FileTable};
use crate::format::Format;
use crate::level::{resolve_level, resolve_lod};
use crate::mesh::{Mesh, MeshType};
use crate::varinfo::{AuxVar, Axis, BaseVar, CoordVar, DataVar, Location};

/// Format-agnostic access to one data collection.
///
/// A collection answers metadata queries (dimensions, meshes, variable
/// descriptors and everything derivable from them) and drives the read
/// pipeline: open a (timestep, variable, level, lod) tuple, read the whole
/// extent, hyperslices, or subregions, then close. The `get_var_*` family
/// wraps the pipeline into one call.
///
/// A collection is not thread safe and must be driven from one thread at a
/// time. At most one variable is open at once: `open_variable_read` and the
/// `get_var_*` methods implicitly close any session already open, after
/// which the old handle fails rather than aliasing the new session.
pub struct Collection<F: Format> {
    format: F,
    table: FileTable,
    open: Option<FileHandle>,
}

fn validate_region(min: &[usize], max: &[usize], dims: &[usize]) -> Result<()> {
    let bad = || Error::BadRegion {
        min: min.to_vec(),
        max: max.to_vec(),
        dims: dims.to_vec(),
    };

    if min.len() != dims.len() || max.len() != dims.len() {
        return Err(bad());
    }
    for d in 0..dims.len() {
        if min[d] > max[d] || max[d] >= dims[d] {
            return Err(bad());
        }
    }

    Ok(())
}

fn validate_block_alignment(
    min: &[usize],
    max: &[usize],
    dims: &[usize],
    block_size: &[usize],
) -> Result<()> {
    for d in 0..dims.len() {
        let bs = block_size.get(d).copied().unwrap_or(1).max(1);
        let end_aligned = (max[d] + 1) % bs == 0 || max[d] == dims[d] - 1;
        if min[d] % bs != 0 || !end_aligned {
            return Err(Error::UnalignedRegion {
                min: min.to_vec(),
                max: max.to_vec(),
                block_size: block_size.to_vec(),
            });
        }
    }

    Ok(())
}

/// Number of values a blocked read yields: the block-rounded extent,
/// including any padding past the grid edge.
fn blocked_size(min: &[usize], max: &[usize], block_size: &[usize]) -> usize {
    let mut size = 1;
    for d in 0..min.len() {
        let bs = block_size.get(d).copied().unwrap_or(1).max(1);
        let end = (max[d] + bs) / bs * bs;
        size *= end - min[d];
    }

    size
}

impl<F: Format> Collection<F> {
    pub fn new(format: F) -> Self {
        Self {
            format,
            table: FileTable::new(),
            open: None,
        }
    }

    /// Open the collection described by `paths` and build all metadata.
    pub fn initialize(&mut self, paths: &[PathBuf], options: &[String]) -> Result<()> {
        self.format.initialize(paths, options)
    }

    // ------------------------------------------------------------------
    // Metadata queries
    // ------------------------------------------------------------------

    pub fn dimension(&self, name: &str) -> Option<Dimension> {
        self.format.dimension(name)
    }

    pub fn dimension_names(&self) -> Vec<String> {
        self.format.dimension_names()
    }

    pub fn mesh(&self, name: &str) -> Option<Mesh> {
        self.format.mesh(name)
    }

    pub fn mesh_names(&self) -> Vec<String> {
        self.format.mesh_names()
    }

    /// Dimension names spanned by a mesh: the spatial dimensions of a
    /// structured mesh, or the node and (if layered) layers dimensions of an
    /// unstructured one.
    pub fn mesh_dim_names(&self, name: &str) -> Option<Vec<String>> {
        let mesh = self.format.mesh(name)?;
        match mesh.mesh_type() {
            MeshType::Structured => Some(mesh.dim_names().to_vec()),
            MeshType::Unstruc2d | MeshType::Unstruc3d => Some(vec![mesh.node_dim().to_string()]),
            MeshType::UnstrucLayered => {
                let layers = mesh.layers_dim()?;
                Some(vec![mesh.node_dim().to_string(), layers.to_string()])
            }
        }
    }

    pub fn mesh_dim_lens(&self, name: &str) -> Option<Vec<usize>> {
        let names = self.mesh_dim_names(name)?;
        Some(names.iter().map(|n| self.dim_len(n)).collect())
    }

    pub fn coord_var_info(&self, name: &str) -> Option<CoordVar> {
        self.format.coord_var_info(name)
    }

    pub fn data_var_info(&self, name: &str) -> Option<DataVar> {
        self.format.data_var_info(name)
    }

    pub fn aux_var_info(&self, name: &str) -> Option<AuxVar> {
        self.format.aux_var_info(name)
    }

    /// Type-agnostic descriptor lookup across data, coordinate, and
    /// auxiliary variables.
    pub fn base_var_info(&self, name: &str) -> Option<BaseVar> {
        if let Some(var) = self.format.data_var_info(name) {
            return Some(var.base().clone());
        }
        if let Some(var) = self.format.coord_var_info(name) {
            return Some(var.base().clone());
        }
        self.format.aux_var_info(name).map(|var| var.base().clone())
    }

    pub fn data_var_names(&self) -> Vec<String> {
        self.format.data_var_names()
    }

    pub fn coord_var_names(&self) -> Vec<String> {
        self.format.coord_var_names()
    }

    pub fn aux_var_names(&self) -> Vec<String> {
        self.format.aux_var_names()
    }

    /// Data variables whose mesh binds exactly `topology_dim` coordinate
    /// axes.
    pub fn data_var_names_with_topology(&self, topology_dim: usize) -> Vec<String> {
        self.format
            .data_var_names()
            .into_iter()
            .filter(|name| {
                self.format
                    .data_var_info(name)
                    .and_then(|var| self.format.mesh(var.mesh()))
                    .map(|mesh| mesh.topology_dim() == topology_dim)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn is_data_var(&self, name: &str) -> bool {
        self.format.data_var_names().iter().any(|n| n == name)
    }

    pub fn is_coord_var(&self, name: &str) -> bool {
        self.format.coord_var_names().iter().any(|n| n == name)
    }

    pub fn is_aux_var(&self, name: &str) -> bool {
        self.format.aux_var_names().iter().any(|n| n == name)
    }

    // ------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------

    /// A variable's ordered dimension names, fastest-varying first. With
    /// `spatial` false, a time-varying variable's time dimension is appended
    /// last (slowest-varying), never interleaved.
    pub fn var_dim_names(&self, name: &str, spatial: bool) -> Option<Vec<String>> {
        if let Some(var) = self.format.data_var_info(name) {
            let mut names = self.data_var_spatial_dims(&var)?;
            if !spatial && var.time_coord_var().is_some() {
                if let Some(time_dim) = self.time_dim_name(name) {
                    names.push(time_dim);
                }
            }
            return Some(names);
        }

        if let Some(var) = self.format.coord_var_info(name) {
            let mut names = var.dim_names().to_vec();
            if !spatial {
                if let Some(time_dim) = var.time_dim() {
                    names.push(time_dim.to_string());
                }
            }
            return Some(names);
        }

        self.format
            .aux_var_info(name)
            .map(|var| var.dim_names().to_vec())
    }

    /// A variable's ordered dimension lengths. The appended time dimension
    /// reports the collection's timestep count, not the raw first length.
    pub fn var_dim_lens(&self, name: &str, spatial: bool) -> Option<Vec<usize>> {
        let spatial_names = self.var_dim_names(name, true)?;
        let mut lens: Vec<usize> = spatial_names.iter().map(|n| self.dim_len(n)).collect();

        // Append exactly when var_dim_names appends, so the two queries
        // always agree in length even when a time coordinate declares no
        // time dimension
        if !spatial && self.var_dim_names(name, false)?.len() > spatial_names.len() {
            lens.push(self.num_time_steps(name));
        }

        Some(lens)
    }

    /// A variable's ordered dimensions as (name, length) records.
    pub fn var_dimensions(&self, name: &str, spatial: bool) -> Option<Vec<Dimension>> {
        let names = self.var_dim_names(name, spatial)?;
        let lens = self.var_dim_lens(name, spatial)?;

        Some(
            names
                .into_iter()
                .zip(lens)
                .map(|(name, len)| Dimension::new(name, len))
                .collect(),
        )
    }

    /// True iff the variable is sampled across timesteps: a data variable
    /// with a time coordinate, or a coordinate variable on the time axis.
    /// Auxiliary variables are never time-varying.
    pub fn is_time_varying(&self, name: &str) -> bool {
        if let Some(var) = self.format.data_var_info(name) {
            return var.time_coord_var().is_some();
        }
        if let Some(var) = self.format.coord_var_info(name) {
            return var.axis() == Axis::T;
        }

        false
    }

    /// Number of timesteps the variable is sampled at: 1 when the variable
    /// is not time-varying, 0 when the name is entirely unrecognized.
    pub fn num_time_steps(&self, name: &str) -> usize {
        if !self.is_data_var(name) && !self.is_coord_var(name) && !self.is_aux_var(name) {
            return 0;
        }
        if !self.is_time_varying(name) {
            return 1;
        }

        let dim = match self.time_dim_name(name).and_then(|n| self.format.dimension(&n)) {
            Some(dim) => dim,
            None => return 0,
        };
        if dim.is_time_varying() {
            dim.lengths().len()
        } else {
            dim.length()
        }
    }

    /// The variable's compression-ratio vector, or `[1]` when the name is
    /// unknown. Never empty.
    pub fn cratios(&self, name: &str) -> Vec<usize> {
        self.base_var_info(name)
            .map(|var| var.cratios().to_vec())
            .unwrap_or_else(|| vec![1])
    }

    pub fn num_ref_levels(&self, name: &str) -> usize {
        self.format.num_ref_levels(name)
    }

    /// Dimension lengths and storage block size at a refinement level,
    /// fastest-varying first. `level` may be negative; it is clamped and
    /// resolved against the variable's hierarchy.
    pub fn dim_lens_at_level(&self, name: &str, level: i32) -> Result<(Vec<usize>, Vec<usize>)> {
        let level = resolve_level(level, self.format.num_ref_levels(name));
        self.format.dim_lens_at_level(name, level)
    }

    /// Shape of one hyperslice (all but the slowest-varying spatial
    /// dimension) and the number of slices at the given level.
    pub fn hyperslice_info(&self, name: &str, level: i32) -> Result<(Vec<usize>, usize)> {
        let (mut dims, _) = self.dim_lens_at_level(name, level)?;
        let nslices = match dims.pop() {
            Some(n) => n,
            None => 0,
        };

        Ok((dims, nslices))
    }

    pub fn att_names(&self, varname: &str) -> Vec<String> {
        self.format.att_names(varname)
    }

    pub fn att_type(&self, varname: &str, attname: &str) -> Option<XType> {
        self.format.att_type(varname, attname)
    }

    /// Attribute values widened to `f64`. `varname` empty addresses global
    /// attributes.
    pub fn att_f64s(&self, varname: &str, attname: &str) -> Option<Vec<f64>> {
        self.format.att(varname, attname).map(|att| att.values_f64())
    }

    pub fn att_i64s(&self, varname: &str, attname: &str) -> Option<Vec<i64>> {
        self.format.att(varname, attname).map(|att| att.values_i64())
    }

    pub fn att_text(&self, varname: &str, attname: &str) -> Option<String> {
        self.format
            .att(varname, attname)
            .map(|att| att.text().to_string())
    }

    /// PROJ-style map projection string, empty if the collection has none.
    pub fn map_projection(&self) -> String {
        self.format.map_projection()
    }

    // ------------------------------------------------------------------
    // Read pipeline
    // ------------------------------------------------------------------

    /// True iff a stored volume exists for this tuple. Pure; never touches
    /// the open session.
    pub fn variable_exists(&self, ts: usize, name: &str, level: i32, lod: i32) -> bool {
        let level = resolve_level(level, self.format.num_ref_levels(name));
        let lod = resolve_lod(lod, self.cratios(name).len());

        self.format.variable_exists(ts, name, level, lod)
    }

    /// Open one (timestep, variable, level, lod) tuple for reading.
    ///
    /// Closes any session already open: the collection keeps a single active
    /// variable, and the superseded handle fails from here on.
    pub fn open_variable_read(
        &mut self,
        ts: usize,
        name: &str,
        level: i32,
        lod: i32,
    ) -> Result<FileHandle> {
        let level = resolve_level(level, self.format.num_ref_levels(name));
        let lod = resolve_lod(lod, self.cratios(name).len());

        if !self.format.variable_exists(ts, name, level, lod) {
            return Err(Error::VariableUnavailable {
                name: name.to_string(),
                ts,
                level,
                lod,
            });
        }

        self.close_open_session();

        let token = self.format.open_variable_read(ts, name, level, lod)?;
        let handle = self.table.insert(FileObject {
            ts,
            name: name.to_string(),
            level,
            lod,
            slice: 0,
            token,
        });
        self.open = Some(handle);
        debug!(name, ts, level, lod, "opened variable for reading");

        Ok(handle)
    }

    /// Release the session. The handle is invalid for further reads.
    pub fn close_variable(&mut self, handle: FileHandle) -> Result<()> {
        let object = self.table.remove(handle).ok_or(Error::InvalidHandle)?;
        if self.open == Some(handle) {
            self.open = None;
        }
        debug!(name = object.name.as_str(), ts = object.ts, "closed variable");

        self.format.close_variable(object.token)
    }

    fn close_open_session(&mut self) {
        if let Some(handle) = self.open.take() {
            if let Some(object) = self.table.remove(handle) {
                trace!(name = object.name.as_str(), "implicitly closing open variable");
                // Best effort: the superseding operation proceeds either way
                let _ = self.format.close_variable(object.token);
            }
        }
    }

    fn session(&self, handle: FileHandle) -> Result<(String, usize, usize, usize)> {
        let object = self.table.get(handle).ok_or(Error::InvalidHandle)?;

        Ok((object.name.clone(), object.level, object.token, object.slice))
    }

    fn data_var_spatial_dims(&self, var: &DataVar) -> Option<Vec<String>> {
        let mesh = self.format.mesh(var.mesh())?;
        let sample_dim = if var.location() == Location::Face {
            mesh.face_dim().to_string()
        } else {
            mesh.node_dim().to_string()
        };

        match mesh.mesh_type() {
            MeshType::Structured => Some(mesh.dim_names().to_vec()),
            MeshType::Unstruc2d | MeshType::Unstruc3d => Some(vec![sample_dim]),
            MeshType::UnstrucLayered => {
                let layers = mesh.layers_dim()?;
                Some(vec![sample_dim, layers.to_string()])
            }
        }
    }

    /// The time dimension behind a variable, via its time coordinate.
    fn time_dim_name(&self, name: &str) -> Option<String> {
        if let Some(var) = self.format.data_var_info(name) {
            let coord = self.format.coord_var_info(var.time_coord_var()?)?;
            return coord.time_dim().map(str::to_string);
        }

        let coord = self.format.coord_var_info(name)?;
        coord.time_dim().map(str::to_string)
    }

    fn dim_len(&self, name: &str) -> usize {
        self.format
            .dimension(name)
            .map(|dim| dim.length())
            .unwrap_or(0)
    }
}

// Reads come in f32 and i32 flavors with identical orchestration; generate
// both families from one definition.
macro_rules! read_methods {
    ($type:ty) => {
        paste! {
            impl<F: Format> Collection<F> {
                /// Read the variable's entire spatial extent at its opened
                /// level. The buffer must hold exactly the product of the
                /// dimensions reported by `dim_lens_at_level`.
                pub fn [<read_ $type>](&mut self, handle: FileHandle, buf: &mut [$type]) -> Result<()> {
                    let (name, level, token, _) = self.session(handle)?;
                    let (dims, _) = self.format.dim_lens_at_level(&name, level)?;
                    let want: usize = dims.iter().product();
                    if buf.len() != want {
                        return Err(Error::BadBufferSize { got: buf.len(), want });
                    }
                    if want == 0 {
                        return Ok(());
                    }

                    let min = vec![0; dims.len()];
                    let max: Vec<usize> = dims.iter().map(|&d| d - 1).collect();
                    self.format.[<read_region_ $type>](token, &min, &max, buf)
                }

                /// Read the next hyperslice along the slowest-varying
                /// spatial dimension and advance the slice cursor. Must be
                /// called once per slice; further calls fail.
                pub fn [<read_slice_ $type>](&mut self, handle: FileHandle, buf: &mut [$type]) -> Result<()> {
                    let (name, level, token, slice) = self.session(handle)?;
                    let (dims, _) = self.format.dim_lens_at_level(&name, level)?;
                    let nslices = dims.last().copied().unwrap_or(0);
                    if slice >= nslices {
                        return Err(Error::SlicesExhausted { nslices });
                    }

                    let want: usize = dims[..dims.len() - 1].iter().product();
                    if buf.len() != want {
                        return Err(Error::BadBufferSize { got: buf.len(), want });
                    }

                    let mut min = vec![0; dims.len()];
                    let mut max: Vec<usize> = dims.iter().map(|&d| d - 1).collect();
                    min[dims.len() - 1] = slice;
                    max[dims.len() - 1] = slice;
                    trace!(name = name.as_str(), slice, nslices, "reading hyperslice");
                    self.format.[<read_region_ $type>](token, &min, &max, buf)?;

                    if let Some(object) = self.table.get_mut(handle) {
                        object.slice += 1;
                    }

                    Ok(())
                }

                /// Read an inclusive axis-aligned subregion in grid-index
                /// coordinates. Output is contiguous regardless of the
                /// backend's internal blocking.
                pub fn [<read_region_ $type>](
                    &mut self,
                    handle: FileHandle,
                    min: &[usize],
                    max: &[usize],
                    buf: &mut [$type],
                ) -> Result<()> {
                    let (name, level, token, _) = self.session(handle)?;
                    let (dims, _) = self.format.dim_lens_at_level(&name, level)?;
                    validate_region(min, max, &dims)?;

                    let want: usize = min
                        .iter()
                        .zip(max)
                        .map(|(&lo, &hi)| hi - lo + 1)
                        .product();
                    if buf.len() != want {
                        return Err(Error::BadBufferSize { got: buf.len(), want });
                    }

                    self.format.[<read_region_ $type>](token, min, max, buf)
                }

                /// Blocked variant of the region read: min/max must lie on
                /// the variable's storage-block boundaries (the region end
                /// may also be the last index), and the buffer receives the
                /// backend's blocked layout over the block-rounded extent.
                pub fn [<read_region_block_ $type>](
                    &mut self,
                    handle: FileHandle,
                    min: &[usize],
                    max: &[usize],
                    buf: &mut [$type],
                ) -> Result<()> {
                    let (name, level, token, _) = self.session(handle)?;
                    let (dims, block_size) = self.format.dim_lens_at_level(&name, level)?;
                    validate_region(min, max, &dims)?;
                    validate_block_alignment(min, max, &dims, &block_size)?;

                    let want = blocked_size(min, max, &block_size);
                    if buf.len() != want {
                        return Err(Error::BadBufferSize { got: buf.len(), want });
                    }

                    self.format.[<read_region_block_ $type>](token, min, max, buf)
                }

                /// One-shot read of a single timestep: open, read the whole
                /// extent, close. Any variable already open is implicitly
                /// closed first and its handle invalidated.
                pub fn [<get_var_at_ $type>](
                    &mut self,
                    ts: usize,
                    name: &str,
                    level: i32,
                    lod: i32,
                    buf: &mut [$type],
                ) -> Result<()> {
                    debug!(name, ts, level, lod, "one-shot variable read");
                    let handle = self.open_variable_read(ts, name, level, lod)?;
                    let read = self.[<read_ $type>](handle, buf);
                    let closed = self.close_variable(handle);

                    read.and(closed)
                }

                /// One-shot read of every timestep, concatenated with time
                /// slowest-varying. For a variable stored as one unit per
                /// timestep this transparently stitches the units together.
                /// Any variable already open is implicitly closed first.
                pub fn [<get_var_ $type>](
                    &mut self,
                    name: &str,
                    level: i32,
                    lod: i32,
                    buf: &mut [$type],
                ) -> Result<()> {
                    let nts = self.num_time_steps(name);
                    if nts == 0 {
                        return Err(Error::UnknownVariable(name.to_string()));
                    }

                    let (dims, _) = self.dim_lens_at_level(name, level)?;
                    let stride: usize = dims.iter().product();
                    let want = stride * nts;
                    if buf.len() != want {
                        return Err(Error::BadBufferSize { got: buf.len(), want });
                    }
                    if want == 0 {
                        return Ok(());
                    }

                    for (ts, chunk) in buf.chunks_exact_mut(stride).enumerate() {
                        self.[<get_var_at_ $type>](ts, name, level, lod, chunk)?;
                    }

                    Ok(())
                }
            }
        }
    };
}

read_methods!(f32);
read_methods!(i32);
