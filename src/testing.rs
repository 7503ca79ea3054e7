//! Shared fixtures for unit tests.

use ndarray::{ArrayD, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::attribute::{Attribute, XType};
use crate::collection::Collection;
use crate::dimension::Dimension;
use crate::memory::MemBackend;
use crate::mesh::Mesh;
use crate::varinfo::{AuxVar, Axis, BaseVar, CoordVar, DataVar, Location};

pub(crate) const NX: usize = 8;
pub(crate) const NY: usize = 4;
pub(crate) const NT: usize = 3;

/// Deterministic random grid with whole-number values, exact in f32.
pub(crate) fn farray(seed: u64, shape: &[usize]) -> ArrayD<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    ArrayD::from_shape_fn(IxDyn(shape), |_| rng.gen_range(0..1000) as f32)
}

/// Value stored at (ts, y, x) in the "temp" grids.
pub(crate) fn temp_value(ts: usize, y: usize, x: usize) -> f32 {
    (ts * 10_000 + y * 100 + x) as f32
}

/// A small structured collection over an NX x NY grid with NT timesteps:
///
/// - "temp": compressed data variable on "grid2d", time-varying via the
///   "T" coordinate, 3 refinement levels, cratios [8, 4, 2, 1]
/// - "bath": uncompressed static data variable, blocked 4 x 2 storage
/// - "X", "Y": spatial coordinate variables; "T": time coordinate
/// - "faceNodes": auxiliary connectivity variable (metadata only)
pub(crate) fn collection() -> Collection<MemBackend> {
    let mut backend = MemBackend::new(3);

    backend.add_dimension(Dimension::new("nx", NX));
    backend.add_dimension(Dimension::new("ny", NY));
    backend.add_dimension(Dimension::new("time", NT));

    backend.add_mesh(Mesh::structured(
        "grid2d",
        vec!["nx".to_string(), "ny".to_string()],
        vec!["X".to_string(), "Y".to_string()],
    ));

    backend.add_coord_var(CoordVar::new(
        BaseVar::new("X", "degrees_east", XType::Float),
        vec!["nx".to_string()],
        None,
        Axis::X,
        true,
    ));
    backend.add_coord_var(CoordVar::new(
        BaseVar::new("Y", "degrees_north", XType::Float),
        vec!["ny".to_string()],
        None,
        Axis::Y,
        true,
    ));
    backend.add_coord_var(CoordVar::new(
        BaseVar::new("T", "seconds", XType::Double),
        vec![],
        Some("time".to_string()),
        Axis::T,
        true,
    ));

    backend.add_data_var(DataVar::new(
        BaseVar::new("temp", "K", XType::Float).with_compression("bior4.4", vec![8, 4, 2, 1]),
        "grid2d".to_string(),
        Some("T".to_string()),
        Location::Node,
        None,
    ));
    backend.add_data_var(DataVar::new(
        BaseVar::new("bath", "m", XType::Float),
        "grid2d".to_string(),
        None,
        Location::Node,
        None,
    ));
    backend.add_aux_var(AuxVar::new(
        BaseVar::new("faceNodes", "", XType::Int32),
        vec!["nx".to_string(), "ny".to_string()],
        -1,
    ));

    backend.add_attribute("", Attribute::new_text("title", "cumulus test collection"));
    backend.add_attribute("temp", Attribute::new_text("long_name", "air temperature"));
    backend.add_attribute("temp", Attribute::new_f32("valid_range", vec![150.0, 350.0]));

    for ts in 0..NT {
        let grid =
            ArrayD::from_shape_fn(IxDyn(&[NY, NX]), |ix| temp_value(ts, ix[0], ix[1]));
        backend.put_grid(ts, "temp", grid);
    }
    backend.put_grid(0, "bath", farray(7, &[NY, NX]));
    backend.set_block_size("bath", vec![4, 2]);
    backend.set_map_projection("+proj=latlong");

    Collection::new(backend)
}
