use std::collections::HashMap;

use crate::attribute::{Attribute, XType};

/// Geometric axis a coordinate variable is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    T = 3,
}

/// Sampling location of a data variable on its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Node,
    Edge,
    Face,
    Volume,
}

/// How missing samples are marked: either a sentinel value baked into the
/// data, or a separate mask variable.
#[derive(Clone, Debug, PartialEq)]
pub enum MissingValue {
    Value(f64),
    Mask(String),
}

/// Metadata common to every variable: storage type, compression parameters,
/// units, and attributes.
///
/// `cratios` is the monotonically decreasing compression-ratio vector; the
/// default `[1]` means "stored uncompressed". It is never empty, a contract
/// callers rely on when computing 1/cratio.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseVar {
    name: String,
    units: String,
    xtype: XType,
    wname: String,
    cratios: Vec<usize>,
    periodic: Vec<bool>,
    atts: HashMap<String, Attribute>,
}

impl BaseVar {
    pub fn new<S: Into<String>, U: Into<String>>(name: S, units: U, xtype: XType) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            xtype,
            wname: String::new(),
            cratios: vec![1],
            periodic: vec![],
            atts: HashMap::new(),
        }
    }

    /// Declare wavelet compression with the given compression-ratio ladder.
    pub fn with_compression<S: Into<String>>(mut self, wname: S, cratios: Vec<usize>) -> Self {
        self.wname = wname.into();
        self.cratios = if cratios.is_empty() { vec![1] } else { cratios };
        self
    }

    pub fn with_periodic(mut self, periodic: Vec<bool>) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn with_attribute(mut self, att: Attribute) -> Self {
        self.atts.insert(att.name().to_string(), att);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn xtype(&self) -> XType {
        self.xtype
    }

    pub fn wname(&self) -> &str {
        &self.wname
    }

    pub fn cratios(&self) -> &[usize] {
        &self.cratios
    }

    pub fn periodic(&self) -> &[bool] {
        &self.periodic
    }

    pub fn attributes(&self) -> &HashMap<String, Attribute> {
        &self.atts
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.atts.get(name)
    }

    /// True iff a wavelet name was declared.
    pub fn is_compressed(&self) -> bool {
        !self.wname.is_empty()
    }
}

/// A coordinate variable: samples along one geometric axis.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordVar {
    base: BaseVar,
    dim_names: Vec<String>,
    time_dim: Option<String>,
    axis: Axis,
    uniform: bool,
}

impl CoordVar {
    pub fn new(
        base: BaseVar,
        dim_names: Vec<String>,
        time_dim: Option<String>,
        axis: Axis,
        uniform: bool,
    ) -> Self {
        Self {
            base,
            dim_names,
            time_dim,
            axis,
            uniform,
        }
    }

    pub fn base(&self) -> &BaseVar {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Spatial dimension names, fastest-varying first.
    pub fn dim_names(&self) -> &[String] {
        &self.dim_names
    }

    pub fn time_dim(&self) -> Option<&str> {
        self.time_dim.as_deref()
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// True iff samples are uniformly spaced along the axis.
    pub fn uniform(&self) -> bool {
        self.uniform
    }
}

/// A data variable: a field sampled on a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct DataVar {
    base: BaseVar,
    mesh: String,
    time_coord_var: Option<String>,
    location: Location,
    missing: Option<MissingValue>,
}

impl DataVar {
    pub fn new(
        base: BaseVar,
        mesh: String,
        time_coord_var: Option<String>,
        location: Location,
        missing: Option<MissingValue>,
    ) -> Self {
        Self {
            base,
            mesh,
            time_coord_var,
            location,
            missing,
        }
    }

    pub fn base(&self) -> &BaseVar {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn mesh(&self) -> &str {
        &self.mesh
    }

    pub fn time_coord_var(&self) -> Option<&str> {
        self.time_coord_var.as_deref()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn missing(&self) -> Option<&MissingValue> {
        self.missing.as_ref()
    }

    /// True iff missing samples are marked with a sentinel value.
    pub fn has_missing(&self) -> bool {
        matches!(self.missing, Some(MissingValue::Value(_)))
    }

    pub fn missing_value(&self) -> Option<f64> {
        match self.missing {
            Some(MissingValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Name of the mask variable marking missing samples, if one is used.
    pub fn mask_var(&self) -> Option<&str> {
        match &self.missing {
            Some(MissingValue::Mask(name)) => Some(name),
            _ => None,
        }
    }
}

/// An auxiliary variable: raw array data not sampled on any mesh, e.g.
/// connectivity indices. Never time-varying.
#[derive(Clone, Debug, PartialEq)]
pub struct AuxVar {
    base: BaseVar,
    dim_names: Vec<String>,
    offset: i64,
}

impl AuxVar {
    pub fn new(base: BaseVar, dim_names: Vec<String>, offset: i64) -> Self {
        Self {
            base,
            dim_names,
            offset,
        }
    }

    pub fn base(&self) -> &BaseVar {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn dim_names(&self) -> &[String] {
        &self.dim_names
    }

    /// Offset added to raw values, e.g. to convert 1-based connectivity
    /// indices to 0-based.
    pub fn offset(&self) -> i64 {
        self.offset
    }
}
