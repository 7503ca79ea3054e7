use num_traits::{cast, NumCast};
use paste::paste;

/// External storage type of an attribute or variable, as declared by the
/// format backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XType {
    Float,
    Double,
    UInt8,
    Int8,
    Int32,
    Int64,
    Text,
}

/// Value payload of an [`Attribute`], stored in its external type.
#[derive(Clone, Debug, PartialEq)]
pub enum AttValues {
    Float(Vec<f32>),
    Double(Vec<f64>),
    UInt8(Vec<u8>),
    Int8(Vec<i8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Text(String),
}

/// A typed key/value annotation, bound either to one variable or, when the
/// owning variable name is empty, to the whole collection.
///
/// Getters convert from the stored external type to the requested access
/// type, so requesting `f64` values from a `Float` attribute upcasts
/// transparently. Only widening getters are offered; a narrowing conversion
/// that cannot represent a stored value drops that entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    values: AttValues,
}

macro_rules! attribute_constructor {
    ($type:ty, $variant:ident) => {
        paste! {
            pub fn [<new_ $type>]<S: Into<String>>(name: S, values: Vec<$type>) -> Self {
                Self {
                    name: name.into(),
                    values: AttValues::$variant(values),
                }
            }
        }
    };
}

impl Attribute {
    attribute_constructor!(f32, Float);
    attribute_constructor!(f64, Double);
    attribute_constructor!(u8, UInt8);
    attribute_constructor!(i8, Int8);
    attribute_constructor!(i32, Int32);
    attribute_constructor!(i64, Int64);

    pub fn new_text<S: Into<String>, T: Into<String>>(name: S, text: T) -> Self {
        Self {
            name: name.into(),
            values: AttValues::Text(text.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xtype(&self) -> XType {
        match self.values {
            AttValues::Float(_) => XType::Float,
            AttValues::Double(_) => XType::Double,
            AttValues::UInt8(_) => XType::UInt8,
            AttValues::Int8(_) => XType::Int8,
            AttValues::Int32(_) => XType::Int32,
            AttValues::Int64(_) => XType::Int64,
            AttValues::Text(_) => XType::Text,
        }
    }

    pub fn values(&self) -> &AttValues {
        &self.values
    }

    /// Number of stored values; for text, the number of bytes.
    pub fn len(&self) -> usize {
        match &self.values {
            AttValues::Float(v) => v.len(),
            AttValues::Double(v) => v.len(),
            AttValues::UInt8(v) => v.len(),
            AttValues::Int8(v) => v.len(),
            AttValues::Int32(v) => v.len(),
            AttValues::Int64(v) => v.len(),
            AttValues::Text(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn values_as<N: NumCast>(&self) -> Vec<N> {
        match &self.values {
            AttValues::Float(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::Double(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::UInt8(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::Int8(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::Int32(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::Int64(v) => v.iter().filter_map(|&x| cast(x)).collect(),
            AttValues::Text(_) => vec![],
        }
    }

    /// Numeric values widened to `f64`. Empty for a text attribute.
    pub fn values_f64(&self) -> Vec<f64> {
        self.values_as()
    }

    /// Numeric values widened to `i64`. Empty for a text attribute;
    /// floating point entries truncate toward zero, and entries with no
    /// representation at all (NaN, out of range) are dropped.
    pub fn values_i64(&self) -> Vec<i64> {
        self.values_as()
    }

    /// Text payload. Empty for a numeric attribute.
    pub fn text(&self) -> &str {
        match &self.values {
            AttValues::Text(s) => s,
            _ => "",
        }
    }
}
