use std::collections::HashMap;
use std::path::PathBuf;

use ndarray::{ArrayD, IxDyn};
use num_traits::{cast, NumCast};

use crate::attribute::Attribute;
use crate::dimension::Dimension;
use crate::errors::{Error, Result};
use crate::format::Format;
use crate::mesh::Mesh;
use crate::varinfo::{AuxVar, BaseVar, CoordVar, DataVar};

/// In-RAM [`Format`] backend serving synthetic multiresolution data.
///
/// Grids are stored at native resolution, one per (timestep, variable);
/// coarser refinement levels are derived by power-of-two subsampling, so a
/// variable with `n` levels reads every `2^(n-1-level)`-th sample at
/// `level`. Uncompressed variables expose only their native level.
///
/// Blocked reads emit the block-rounded extent in row-major order with
/// zero-filled padding past the grid edge.
///
/// Intended as the reference backend for exercising a
/// [`Collection`](crate::Collection) without touching storage; every
/// descriptor and grid is registered up front and `initialize` is a no-op.
#[derive(Default)]
pub struct MemBackend {
    num_levels: usize,
    dimensions: Vec<Dimension>,
    meshes: Vec<Mesh>,
    coord_vars: Vec<CoordVar>,
    data_vars: Vec<DataVar>,
    aux_vars: Vec<AuxVar>,
    atts: HashMap<String, Vec<Attribute>>,
    grids: HashMap<(usize, String), ArrayD<f32>>,
    /// Native extent per variable, fastest-varying axis first.
    native_dims: HashMap<String, Vec<usize>>,
    block_sizes: HashMap<String, Vec<usize>>,
    projection: String,
    sessions: Vec<Option<Session>>,
}

struct Session {
    ts: usize,
    name: String,
    level: usize,
}

impl MemBackend {
    pub fn new(num_levels: usize) -> Self {
        Self {
            num_levels: num_levels.max(1),
            ..Self::default()
        }
    }

    pub fn add_dimension(&mut self, dimension: Dimension) {
        self.dimensions.push(dimension);
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn add_coord_var(&mut self, var: CoordVar) {
        self.coord_vars.push(var);
    }

    pub fn add_data_var(&mut self, var: DataVar) {
        self.data_vars.push(var);
    }

    pub fn add_aux_var(&mut self, var: AuxVar) {
        self.aux_vars.push(var);
    }

    /// Register an attribute, bound to `varname` or globally when `varname`
    /// is empty.
    pub fn add_attribute<S: Into<String>>(&mut self, varname: S, att: Attribute) {
        self.atts.entry(varname.into()).or_default().push(att);
    }

    /// Declare a storage block size, one entry per axis, fastest first.
    pub fn set_block_size<S: Into<String>>(&mut self, varname: S, block_size: Vec<usize>) {
        self.block_sizes.insert(varname.into(), block_size);
    }

    pub fn set_map_projection<S: Into<String>>(&mut self, projection: S) {
        self.projection = projection.into();
    }

    /// Store one timestep of native-resolution data. The array's shape is
    /// in `ndarray` order, slowest-varying axis first; the variable's
    /// dimension lengths (fastest first) are its reverse.
    pub fn put_grid<S: Into<String>>(&mut self, ts: usize, varname: S, grid: ArrayD<f32>) {
        let varname = varname.into();
        let dims: Vec<usize> = grid.shape().iter().rev().copied().collect();
        self.native_dims.insert(varname.clone(), dims);
        self.grids.insert((ts, varname), grid);
    }

    fn base_var(&self, name: &str) -> Option<&BaseVar> {
        if let Some(var) = self.data_vars.iter().find(|v| v.name() == name) {
            return Some(var.base());
        }
        if let Some(var) = self.coord_vars.iter().find(|v| v.name() == name) {
            return Some(var.base());
        }
        self.aux_vars
            .iter()
            .find(|v| v.name() == name)
            .map(|v| v.base())
    }

    /// Subsampling factor between `level` and native resolution.
    fn factor(&self, name: &str, level: usize) -> usize {
        let levels = self.num_ref_levels(name).max(1);
        1 << (levels - 1 - level.min(levels - 1))
    }

    fn dims_at(&self, name: &str, level: usize) -> Option<Vec<usize>> {
        let native = self.native_dims.get(name)?;
        let factor = self.factor(name, level);

        Some(
            native
                .iter()
                .map(|&d| ((d + factor - 1) / factor).max(1))
                .collect(),
        )
    }

    fn session(&self, token: usize) -> Result<&Session> {
        self.sessions
            .get(token)
            .and_then(|s| s.as_ref())
            .ok_or(Error::InvalidHandle)
    }

    /// Sample the open session's grid over `[min, max]`, subsampled for the
    /// session's level, casting each value to the requested type. Indices
    /// run fastest-varying first; the stored array is indexed in reverse.
    fn sample_into<N: NumCast>(&self, token: usize, min: &[usize], max: &[usize], region: &mut [N]) -> Result<()> {
        let session = self.session(token)?;
        let grid = self
            .grids
            .get(&(session.ts, session.name.clone()))
            .ok_or_else(|| Error::UnknownVariable(session.name.clone()))?;
        let factor = self.factor(&session.name, session.level);

        let mut index = min.to_vec();
        for out in region.iter_mut() {
            let native: Vec<usize> = index.iter().rev().map(|&i| i * factor).collect();
            let value = grid[IxDyn(&native)];
            *out = cast(value)
                .ok_or_else(|| Error::Backend(format!("value {value} not representable")))?;

            for d in 0..index.len() {
                index[d] += 1;
                if index[d] <= max[d] {
                    break;
                }
                index[d] = min[d];
            }
        }

        Ok(())
    }

    /// Blocked sampling: iterate the block-rounded extent, zero-filling
    /// positions past the grid edge.
    fn sample_block_into<N: NumCast>(
        &self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [N],
    ) -> Result<()> {
        let session = self.session(token)?;
        let grid = self
            .grids
            .get(&(session.ts, session.name.clone()))
            .ok_or_else(|| Error::UnknownVariable(session.name.clone()))?;
        let factor = self.factor(&session.name, session.level);
        let dims = self
            .dims_at(&session.name, session.level)
            .ok_or_else(|| Error::UnknownVariable(session.name.clone()))?;
        let block_size = self.block_sizes.get(&session.name);

        let ends: Vec<usize> = (0..min.len())
            .map(|d| {
                let bs = block_size
                    .and_then(|b| b.get(d).copied())
                    .unwrap_or(1)
                    .max(1);
                (max[d] + bs) / bs * bs
            })
            .collect();

        let mut index = min.to_vec();
        for out in region.iter_mut() {
            *out = if index.iter().zip(&dims).all(|(&i, &d)| i < d) {
                let native: Vec<usize> = index.iter().rev().map(|&i| i * factor).collect();
                let value = grid[IxDyn(&native)];
                cast(value)
                    .ok_or_else(|| Error::Backend(format!("value {value} not representable")))?
            } else {
                cast(0f32).ok_or_else(|| Error::Backend("zero not representable".into()))?
            };

            for d in 0..index.len() {
                index[d] += 1;
                if index[d] < ends[d] {
                    break;
                }
                index[d] = min[d];
            }
        }

        Ok(())
    }
}

impl Format for MemBackend {
    fn initialize(&mut self, _paths: &[PathBuf], _options: &[String]) -> Result<()> {
        Ok(())
    }

    fn dimension(&self, name: &str) -> Option<Dimension> {
        self.dimensions.iter().find(|d| d.name() == name).cloned()
    }

    fn dimension_names(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name().to_string()).collect()
    }

    fn mesh(&self, name: &str) -> Option<Mesh> {
        self.meshes.iter().find(|m| m.name() == name).cloned()
    }

    fn mesh_names(&self) -> Vec<String> {
        self.meshes.iter().map(|m| m.name().to_string()).collect()
    }

    fn coord_var_info(&self, name: &str) -> Option<CoordVar> {
        self.coord_vars.iter().find(|v| v.name() == name).cloned()
    }

    fn data_var_info(&self, name: &str) -> Option<DataVar> {
        self.data_vars.iter().find(|v| v.name() == name).cloned()
    }

    fn aux_var_info(&self, name: &str) -> Option<AuxVar> {
        self.aux_vars.iter().find(|v| v.name() == name).cloned()
    }

    fn data_var_names(&self) -> Vec<String> {
        self.data_vars.iter().map(|v| v.name().to_string()).collect()
    }

    fn coord_var_names(&self) -> Vec<String> {
        self.coord_vars.iter().map(|v| v.name().to_string()).collect()
    }

    fn aux_var_names(&self) -> Vec<String> {
        self.aux_vars.iter().map(|v| v.name().to_string()).collect()
    }

    fn num_ref_levels(&self, name: &str) -> usize {
        match self.base_var(name) {
            Some(var) if var.is_compressed() => self.num_levels,
            Some(_) => 1,
            None => 0,
        }
    }

    fn att(&self, varname: &str, attname: &str) -> Option<&Attribute> {
        self.atts
            .get(varname)?
            .iter()
            .find(|a| a.name() == attname)
    }

    fn att_names(&self, varname: &str) -> Vec<String> {
        self.atts
            .get(varname)
            .map(|atts| atts.iter().map(|a| a.name().to_string()).collect())
            .unwrap_or_default()
    }

    fn dim_lens_at_level(&self, name: &str, level: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let dims = self
            .dims_at(name, level)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        let block_size = self
            .block_sizes
            .get(name)
            .cloned()
            .unwrap_or_else(|| vec![1; dims.len()]);

        Ok((dims, block_size))
    }

    fn map_projection(&self) -> String {
        self.projection.clone()
    }

    fn open_variable_read(
        &mut self,
        ts: usize,
        name: &str,
        level: usize,
        lod: usize,
    ) -> Result<usize> {
        if !self.variable_exists(ts, name, level, lod) {
            return Err(Error::VariableUnavailable {
                name: name.to_string(),
                ts,
                level,
                lod,
            });
        }

        let session = Session {
            ts,
            name: name.to_string(),
            level,
        };
        for (token, slot) in self.sessions.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(session);
                return Ok(token);
            }
        }
        self.sessions.push(Some(session));

        Ok(self.sessions.len() - 1)
    }

    fn close_variable(&mut self, token: usize) -> Result<()> {
        let slot = self.sessions.get_mut(token).ok_or(Error::InvalidHandle)?;
        if slot.take().is_none() {
            return Err(Error::InvalidHandle);
        }

        Ok(())
    }

    fn read_region_f32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [f32],
    ) -> Result<()> {
        self.sample_into(token, min, max, region)
    }

    fn read_region_i32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [i32],
    ) -> Result<()> {
        self.sample_into(token, min, max, region)
    }

    fn read_region_block_f32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [f32],
    ) -> Result<()> {
        self.sample_block_into(token, min, max, region)
    }

    fn read_region_block_i32(
        &mut self,
        token: usize,
        min: &[usize],
        max: &[usize],
        region: &mut [i32],
    ) -> Result<()> {
        self.sample_block_into(token, min, max, region)
    }

    fn variable_exists(&self, ts: usize, name: &str, level: usize, lod: usize) -> bool {
        let levels = self.num_ref_levels(name);
        let lods = self
            .base_var(name)
            .map(|var| var.cratios().len())
            .unwrap_or(0);

        level < levels && lod < lods && self.grids.contains_key(&(ts, name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn backend() -> MemBackend {
        let mut backend = MemBackend::new(3);
        backend.add_data_var(DataVar::new(
            BaseVar::new("u", "m/s", crate::attribute::XType::Float)
                .with_compression("bior4.4", vec![8, 4, 2, 1]),
            "grid".to_string(),
            None,
            crate::varinfo::Location::Node,
            None,
        ));
        // 4 rows (ny), 8 cols (nx), value = y * 100 + x
        let grid = Array::from_shape_fn(IxDyn(&[4, 8]), |ix| (ix[0] * 100 + ix[1]) as f32);
        backend.put_grid(0, "u", grid);

        backend
    }

    #[test]
    fn test_dims_per_level() {
        let backend = backend();
        assert_eq!(backend.dims_at("u", 2).unwrap(), vec![8, 4]);
        assert_eq!(backend.dims_at("u", 1).unwrap(), vec![4, 2]);
        assert_eq!(backend.dims_at("u", 0).unwrap(), vec![2, 1]);
        assert!(backend.dims_at("nope", 0).is_none());
    }

    #[test]
    fn test_exists_and_session_lifecycle() {
        let mut backend = backend();
        assert!(backend.variable_exists(0, "u", 2, 0));
        assert!(!backend.variable_exists(1, "u", 2, 0));
        assert!(!backend.variable_exists(0, "u", 3, 0));
        assert!(!backend.variable_exists(0, "u", 0, 4));

        let token = backend.open_variable_read(0, "u", 2, 0).unwrap();
        assert!(backend.close_variable(token).is_ok());
        assert!(backend.close_variable(token).is_err());

        // Slot is reused
        let again = backend.open_variable_read(0, "u", 1, 0).unwrap();
        assert_eq!(again, token);
    }

    #[test]
    fn test_native_read() {
        let mut backend = backend();
        let token = backend.open_variable_read(0, "u", 2, 0).unwrap();
        let mut region = vec![0f32; 4];
        backend
            .read_region_f32(token, &[2, 1], &[3, 2], &mut region)
            .unwrap();
        assert_eq!(region, vec![102.0, 103.0, 202.0, 203.0]);
    }

    #[test]
    fn test_subsampled_read() {
        let mut backend = backend();
        let token = backend.open_variable_read(0, "u", 1, 0).unwrap();
        // Level 1 samples every other native value
        let mut region = vec![0f32; 8];
        backend
            .read_region_f32(token, &[0, 0], &[3, 1], &mut region)
            .unwrap();
        assert_eq!(
            region,
            vec![0.0, 2.0, 4.0, 6.0, 200.0, 202.0, 204.0, 206.0]
        );
    }

    #[test]
    fn test_int_read_casts() {
        let mut backend = backend();
        let token = backend.open_variable_read(0, "u", 2, 0).unwrap();
        let mut region = vec![0i32; 2];
        backend
            .read_region_i32(token, &[6, 3], &[7, 3], &mut region)
            .unwrap();
        assert_eq!(region, vec![306, 307]);
    }
}
