//! Parameter types: the names and shapes of the components of a parameter.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParameterError;

/// Shape of a parameter component. The empty shape denotes a scalar.
pub type Shape = Vec<usize>;

/// Shape declaration accepted when building a [`ParameterType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeSpec {
    /// A vector of the given length; `0` and `1` declare a scalar.
    Dim(usize),
    /// An explicit shape, taken as is.
    Shape(Shape),
}

impl ShapeSpec {
    /// The declared shape.
    pub fn into_shape(self) -> Shape {
        match self {
            ShapeSpec::Dim(0 | 1) => Vec::new(),
            ShapeSpec::Dim(n) => vec![n],
            ShapeSpec::Shape(s) => s,
        }
    }
}

impl From<usize> for ShapeSpec {
    fn from(n: usize) -> Self {
        ShapeSpec::Dim(n)
    }
}

impl From<()> for ShapeSpec {
    fn from(_: ()) -> Self {
        ShapeSpec::Shape(Vec::new())
    }
}

impl From<Vec<usize>> for ShapeSpec {
    fn from(s: Vec<usize>) -> Self {
        ShapeSpec::Shape(s)
    }
}

impl From<&[usize]> for ShapeSpec {
    fn from(s: &[usize]) -> Self {
        ShapeSpec::Shape(s.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for ShapeSpec {
    fn from(s: [usize; N]) -> Self {
        ShapeSpec::Shape(s.to_vec())
    }
}

/// Mapping from parameter names to shapes.
///
/// Iteration is always in sorted name order, independent of the order of insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterType {
    entries: BTreeMap<String, Shape>,
}

impl ParameterType {
    /// The empty parameter type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the component `name`, returning the previous shape if it was already declared.
    ///
    /// Insertion is the only supported modification and is meant for building a type.
    pub fn insert(&mut self, name: impl Into<String>, shape: impl Into<ShapeSpec>) -> Option<Shape> {
        self.entries.insert(name.into(), shape.into().into_shape())
    }

    /// Shape of the component `name`.
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is a component.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Component names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Components in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no components.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a parameter type from loosely typed data.
    ///
    /// `null` gives the empty type. Otherwise `value` has to be an object whose values are non-negative integers
    /// (see [`ShapeSpec::Dim`]) or arrays of non-negative integers.
    pub fn from_json(value: &Value) -> Result<Self, ParameterError> {
        let map = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(map) => map,
            other => {
                return Err(ParameterError::Validation(format!(
                    "parameter type must be a mapping, got {other}"
                )));
            }
        };
        let invalid = |name: &str, v: &Value| {
            ParameterError::Validation(format!(
                "shape of {name} must be a non-negative integer or a tuple of them, got {v}"
            ))
        };
        let mut res = Self::new();
        for (name, v) in map {
            let spec = match v {
                Value::Number(n) => ShapeSpec::Dim(n.as_u64().ok_or_else(|| invalid(name, v))? as usize),
                Value::Array(items) => ShapeSpec::Shape(
                    items
                        .iter()
                        .map(|i| i.as_u64().map(|n| n as usize).ok_or_else(|| invalid(name, v)))
                        .collect::<Result<_, _>>()?,
                ),
                _ => return Err(invalid(name, v)),
            };
            res.insert(name.as_str(), spec);
        }
        Ok(res)
    }
}

impl<K: Into<String>, V: Into<ShapeSpec>> FromIterator<(K, V)> for ParameterType {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut res = Self::new();
        for (k, v) in iter {
            res.insert(k, v);
        }
        res
    }
}

pub(crate) struct DisplayShape<'a>(pub &'a [usize]);

impl fmt::Display for DisplayShape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            [n] => write!(f, "({n},)"),
            dims => {
                write!(f, "(")?;
                for (i, d) in dims.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{d}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, shape)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {}", DisplayShape(shape))?;
        }
        write!(f, "}}")
    }
}
