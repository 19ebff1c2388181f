//! Parameter values and their interpretation.

use std::{collections::BTreeMap, fmt};

use ndarray::{arr0, Array1, ArrayD, IxDyn};
use serde_json::Value;

use crate::{
    config::FloatCmp,
    error::ParameterError,
    parameter_type::ParameterType,
};

/// A parameter: a mapping from component names to tensors.
///
/// Equality is approximate, see [`Parameter::allclose`].
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    values: BTreeMap<String, ArrayD<f64>>,
}

impl Parameter {
    /// The parameter without components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the component `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: ArrayD<f64>) -> Option<ArrayD<f64>> {
        self.values.insert(name.into(), value)
    }

    /// Value of the component `name`.
    pub fn get(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.values.get(name)
    }

    /// Mutable value of the component `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArrayD<f64>> {
        self.values.get_mut(name)
    }

    /// Whether `name` is a component.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Components in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Component names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no components.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The parameter type this parameter conforms to.
    pub fn parameter_type(&self) -> ParameterType {
        self.iter().map(|(k, v)| (k, v.shape())).collect()
    }

    /// Copy with independently owned tensors.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Whether both parameters have the same components and all values are close under the default tolerances.
    pub fn allclose(&self, other: &Parameter) -> bool {
        self.allclose_with(other, &FloatCmp::default())
    }

    /// Like [`Parameter::allclose`] with explicit tolerances.
    pub fn allclose_with(&self, other: &Parameter, cmp: &FloatCmp) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| cmp.all_close(v, w)))
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.allclose(other)
    }
}

impl<K: Into<String>> FromIterator<(K, ArrayD<f64>)> for Parameter {
    fn from_iter<T: IntoIterator<Item = (K, ArrayD<f64>)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v.ndim() {
                0 => write!(f, "{name}: {}", v.iter().next().copied().unwrap_or_default())?,
                _ => {
                    write!(f, "{name}: [")?;
                    for (j, x) in v.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{x}")?;
                    }
                    write!(f, "]")?;
                }
            }
        }
        write!(f, "}}")
    }
}

/// Loosely typed value of a single component, or a sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A number.
    Scalar(f64),
    /// A sequence; nested sequences have to be rectangular.
    List(Vec<ParamValue>),
    /// A tensor, taken as a single value.
    Array(ArrayD<f64>),
}

impl ParamValue {
    /// Converts the value into a tensor. Scalars become zero-dimensional tensors.
    pub fn into_array(self) -> Result<ArrayD<f64>, ParameterError> {
        match self {
            ParamValue::Scalar(x) => Ok(arr0(x).into_dyn()),
            ParamValue::Array(a) => Ok(a),
            ParamValue::List(items) => {
                let arrays = items
                    .into_iter()
                    .map(ParamValue::into_array)
                    .collect::<Result<Vec<_>, _>>()?;
                let inner = arrays.first().map_or_else(Vec::new, |a| a.shape().to_vec());
                if arrays.iter().any(|a| a.shape() != inner.as_slice()) {
                    return Err(ParameterError::Validation("ragged nested sequence".into()));
                }
                let mut shape = vec![arrays.len()];
                shape.extend(&inner);
                let data = arrays.iter().flat_map(|a| a.iter().copied()).collect();
                ArrayD::from_shape_vec(IxDyn(&shape), data)
                    .map_err(|e| ParameterError::Validation(e.to_string()))
            }
        }
    }

    /// Reads a number or a (nested) array of numbers.
    pub fn from_json(value: &Value) -> Result<Self, ParameterError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(ParamValue::Scalar)
                .ok_or_else(|| ParameterError::Validation(format!("{n} is not representable as float"))),
            Value::Array(items) => items
                .iter()
                .map(ParamValue::from_json)
                .collect::<Result<_, _>>()
                .map(ParamValue::List),
            other => Err(ParameterError::Validation(format!(
                "expected a number or a list of numbers, got {other}"
            ))),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Scalar(x)
    }
}

impl From<i32> for ParamValue {
    fn from(x: i32) -> Self {
        ParamValue::Scalar(x.into())
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::List(v.into_iter().map(ParamValue::Scalar).collect())
    }
}

impl<const N: usize> From<[f64; N]> for ParamValue {
    fn from(v: [f64; N]) -> Self {
        ParamValue::List(v.into_iter().map(ParamValue::Scalar).collect())
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        ParamValue::List(v)
    }
}

impl From<ArrayD<f64>> for ParamValue {
    fn from(a: ArrayD<f64>) -> Self {
        ParamValue::Array(a)
    }
}

impl From<Array1<f64>> for ParamValue {
    fn from(a: Array1<f64>) -> Self {
        ParamValue::Array(a.into_dyn())
    }
}

/// Anything [`parse_parameter`] can interpret as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterInput {
    /// No parameter.
    None,
    /// An already built parameter.
    Parameter(Parameter),
    /// Values by component name.
    Map(BTreeMap<String, ParamValue>),
    /// A single value or a sequence of values, assigned to the components in sorted name order.
    Value(ParamValue),
}

impl ParameterInput {
    /// Reads `null`, an object of values or a value.
    pub fn from_json(value: &Value) -> Result<Self, ParameterError> {
        match value {
            Value::Null => Ok(ParameterInput::None),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), ParamValue::from_json(v)?)))
                .collect::<Result<_, ParameterError>>()
                .map(ParameterInput::Map),
            other => ParamValue::from_json(other).map(ParameterInput::Value),
        }
    }

    fn describe(&self) -> String {
        match self {
            ParameterInput::None => "None".into(),
            ParameterInput::Parameter(mu) => mu.parameter_type().to_string(),
            ParameterInput::Map(m) => format!("mapping with keys {:?}", m.keys().collect::<Vec<_>>()),
            ParameterInput::Value(_) => "value".into(),
        }
    }
}

impl From<()> for ParameterInput {
    fn from(_: ()) -> Self {
        ParameterInput::None
    }
}

impl From<Parameter> for ParameterInput {
    fn from(mu: Parameter) -> Self {
        ParameterInput::Parameter(mu)
    }
}

impl From<&Parameter> for ParameterInput {
    fn from(mu: &Parameter) -> Self {
        ParameterInput::Parameter(mu.clone())
    }
}

impl From<Option<Parameter>> for ParameterInput {
    fn from(mu: Option<Parameter>) -> Self {
        mu.map_or(ParameterInput::None, ParameterInput::Parameter)
    }
}

impl From<Option<&Parameter>> for ParameterInput {
    fn from(mu: Option<&Parameter>) -> Self {
        mu.cloned().into()
    }
}

impl From<BTreeMap<String, ParamValue>> for ParameterInput {
    fn from(m: BTreeMap<String, ParamValue>) -> Self {
        ParameterInput::Map(m)
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for ParameterInput {
    fn from(m: [(K, V); N]) -> Self {
        ParameterInput::Map(m.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

macro_rules! impl_input_from_value {
    ($($t:ty),*) => {$(
        impl From<$t> for ParameterInput {
            fn from(v: $t) -> Self {
                ParameterInput::Value(v.into())
            }
        }
    )*};
}

impl_input_from_value!(f64, i32, Vec<f64>, Vec<ParamValue>, ParamValue, ArrayD<f64>, Array1<f64>);

impl<const N: usize> From<[f64; N]> for ParameterInput {
    fn from(v: [f64; N]) -> Self {
        ParameterInput::Value(v.into())
    }
}

/// Interprets `input` as a parameter of type `parameter_type`.
///
/// - Without a (non-empty) parameter type, only [`ParameterInput::None`] is accepted and `None` is returned.
/// - A [`Parameter`] must have exactly the given type and is returned as is.
/// - A mapping must have exactly the component names of the type.
/// - A single value is treated as a sequence of length one. Sequences are assigned to the components in sorted
///   name order, except that a type with a single component takes a sequence whose length is not one as a whole.
///
/// Finally every component has to have its declared shape.
pub fn parse_parameter(
    input: impl Into<ParameterInput>,
    parameter_type: Option<&ParameterType>,
) -> Result<Option<Parameter>, ParameterError> {
    let input = input.into();
    let ty = match parameter_type {
        Some(ty) if !ty.is_empty() => ty,
        _ => {
            return match input {
                ParameterInput::None => Ok(None),
                other => Err(ParameterError::TypeMismatch {
                    expected: "None".into(),
                    actual: other.describe(),
                }),
            };
        }
    };

    let values: Vec<(String, ParamValue)> = match input {
        ParameterInput::None => {
            return Err(ParameterError::TypeMismatch {
                expected: ty.to_string(),
                actual: "None".into(),
            });
        }
        ParameterInput::Parameter(mu) => {
            let actual = mu.parameter_type();
            if actual != *ty {
                return Err(ParameterError::TypeMismatch {
                    expected: ty.to_string(),
                    actual: actual.to_string(),
                });
            }
            return Ok(Some(mu));
        }
        ParameterInput::Map(map) => {
            if !map.keys().map(String::as_str).eq(ty.names()) {
                return Err(ParameterError::ComponentMismatch {
                    expected: ty.names().map(String::from).collect(),
                    actual: map.into_keys().collect(),
                });
            }
            map.into_iter().collect()
        }
        ParameterInput::Value(value) => {
            let items = match value {
                ParamValue::List(items) if ty.len() == 1 && items.len() != 1 => vec![ParamValue::List(items)],
                ParamValue::List(items) => items,
                other => vec![other],
            };
            if items.len() != ty.len() {
                return Err(ParameterError::LengthMismatch {
                    expected: ty.len(),
                    actual: items.len(),
                });
            }
            ty.names().map(String::from).zip(items).collect()
        }
    };

    let mut mu = Parameter::new();
    for ((name, value), (_, expected)) in values.into_iter().zip(ty.iter()) {
        let value = value.into_array()?;
        if value.shape() != expected {
            return Err(ParameterError::ShapeMismatch {
                name,
                expected: expected.to_vec(),
                actual: value.shape().to_vec(),
            });
        }
        mu.insert(name, value);
    }
    log::trace!("parsed parameter {mu}");
    Ok(Some(mu))
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};

    use super::*;

    fn ty() -> ParameterType {
        [("nu", 2usize), ("mu", 1)].into_iter().collect()
    }

    #[test]
    fn sequence_assigned_in_sorted_order() -> anyhow::Result<()> {
        let mu = parse_parameter(vec![ParamValue::from(3.0), ParamValue::from([1.0, 2.0])], Some(&ty()))?
            .ok_or_else(|| anyhow::anyhow!("expected a parameter"))?;
        assert_eq!(mu.get("mu"), Some(&arr0(3.0).into_dyn()));
        assert_eq!(mu.get("nu"), Some(&arr1(&[1.0, 2.0]).into_dyn()));
        assert_eq!(mu.to_string(), "{mu: 3, nu: [1, 2]}");
        Ok(())
    }

    #[test]
    fn single_component_absorbs_sequence() -> anyhow::Result<()> {
        let t: ParameterType = [("x", 3usize)].into_iter().collect();
        let mu = parse_parameter([1.0, 2.0, 3.0], Some(&t))?;
        assert_eq!(mu.map(|m| m.parameter_type()), Some(t.clone()));
        let s: ParameterType = [("s", 1usize)].into_iter().collect();
        assert!(parse_parameter(vec![4.0], Some(&s))?.is_some());
        assert!(parse_parameter(4, Some(&s))?.is_some());
        Ok(())
    }

    #[test]
    fn errors() {
        let t = ty();
        assert!(matches!(parse_parameter((), Some(&t)), Err(ParameterError::TypeMismatch { .. })));
        assert!(matches!(parse_parameter(1.0, None), Err(ParameterError::TypeMismatch { .. })));
        assert!(matches!(
            parse_parameter([("mu", 1.0)], Some(&t)),
            Err(ParameterError::ComponentMismatch { .. })
        ));
        assert!(matches!(
            parse_parameter(vec![1.0, 2.0, 3.0], Some(&t)),
            Err(ParameterError::LengthMismatch { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            parse_parameter(vec![1.0, 2.0], Some(&t)),
            Err(ParameterError::ShapeMismatch { .. })
        ));
        let ragged = ParamValue::List(vec![ParamValue::from([1.0]), ParamValue::from([1.0, 2.0])]);
        assert!(matches!(ragged.into_array(), Err(ParameterError::Validation(_))));
    }

    #[test]
    fn nested_lists_become_matrices() -> anyhow::Result<()> {
        let v = ParamValue::from(vec![ParamValue::from([1.0, 2.0]), ParamValue::from([3.0, 4.0])]);
        assert_eq!(v.into_array()?, arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn());
        Ok(())
    }

    #[test]
    fn absent_type_requires_absent_value() -> anyhow::Result<()> {
        assert_eq!(parse_parameter((), None)?, None);
        assert_eq!(parse_parameter((), Some(&ParameterType::new()))?, None);
        Ok(())
    }
}
