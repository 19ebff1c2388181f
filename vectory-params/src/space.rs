//! Parameter spaces.

use std::collections::BTreeMap;

use itertools::Itertools;
use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use crate::{error::ParameterError, parameter::Parameter, parameter_type::ParameterType};

/// All parameters of a given type whose entries lie in per-component intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicParameterSpace {
    parameter_type: ParameterType,
    ranges: BTreeMap<String, (f64, f64)>,
}

impl CubicParameterSpace {
    /// Space where every entry of every component lies in `[minimum, maximum]`.
    pub fn new(parameter_type: ParameterType, minimum: f64, maximum: f64) -> Result<Self, ParameterError> {
        let ranges = parameter_type
            .names()
            .map(|name| (name.to_owned(), (minimum, maximum)))
            .collect();
        Self::with_ranges(parameter_type, ranges)
    }

    /// Space with an interval per component.
    pub fn with_ranges(
        parameter_type: ParameterType,
        ranges: BTreeMap<String, (f64, f64)>,
    ) -> Result<Self, ParameterError> {
        if !ranges.keys().map(String::as_str).eq(parameter_type.names()) {
            return Err(ParameterError::ComponentMismatch {
                expected: parameter_type.names().map(String::from).collect(),
                actual: ranges.into_keys().collect(),
            });
        }
        if let Some((name, (lo, hi))) = ranges.iter().find(|(_, (lo, hi))| !(lo <= hi)) {
            return Err(ParameterError::Validation(format!(
                "empty range [{lo}, {hi}] for {name}"
            )));
        }
        Ok(Self {
            parameter_type,
            ranges,
        })
    }

    /// The type of the parameters in this space.
    pub fn parameter_type(&self) -> &ParameterType {
        &self.parameter_type
    }

    /// Interval of the component `name`.
    pub fn range(&self, name: &str) -> Option<(f64, f64)> {
        self.ranges.get(name).copied()
    }

    /// Whether `mu` has the type of the space and all of its entries lie in their intervals.
    pub fn contains(&self, mu: &Parameter) -> bool {
        mu.parameter_type() == self.parameter_type
            && mu.iter().all(|(name, v)| {
                self.range(name)
                    .is_some_and(|(lo, hi)| v.iter().all(|&x| lo <= x && x <= hi))
            })
    }

    /// Tensor grid with `count` equidistant points per scalar entry, interval ends included.
    pub fn sample_uniformly(&self, count: usize) -> Result<Vec<Parameter>, ParameterError> {
        let axes: Vec<Vec<f64>> = self
            .parameter_type
            .iter()
            .flat_map(|(name, shape)| {
                let (lo, hi) = self.ranges[name];
                std::iter::repeat(linspace(lo, hi, count)).take(shape.iter().product())
            })
            .collect();
        axes.into_iter()
            .multi_cartesian_product()
            .map(|point| self.assemble(&point))
            .collect()
    }

    /// `count` parameters drawn uniformly from the space.
    pub fn sample_randomly(&self, count: usize, rng: &mut impl Rng) -> Vec<Parameter> {
        (0..count)
            .map(|_| {
                self.parameter_type
                    .iter()
                    .map(|(name, shape)| {
                        let (lo, hi) = self.ranges[name];
                        let value = ArrayD::from_shape_fn(IxDyn(shape), |_| lo + rng.gen::<f64>() * (hi - lo));
                        (name, value)
                    })
                    .collect()
            })
            .collect()
    }

    fn assemble(&self, point: &[f64]) -> Result<Parameter, ParameterError> {
        let mut offset = 0;
        let mut mu = Parameter::new();
        for (name, shape) in self.parameter_type.iter() {
            let size: usize = shape.iter().product();
            let value = ArrayD::from_shape_vec(IxDyn(shape), point[offset..offset + size].to_vec())
                .map_err(|e| ParameterError::Validation(e.to_string()))?;
            mu.insert(name, value);
            offset += size;
        }
        Ok(mu)
    }
}

fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lo],
        n => (0..n).map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn uniform_grid() -> anyhow::Result<()> {
        let t: ParameterType = [("a", 1usize), ("b", 2)].into_iter().collect();
        let space = CubicParameterSpace::new(t, 0.0, 1.0)?;
        let samples = space.sample_uniformly(3)?;
        assert_eq!(samples.len(), 27);
        assert!(samples.iter().all(|mu| space.contains(mu)));
        assert_eq!(samples[1].get("b").map(|b| b.iter().copied().collect::<Vec<_>>()), Some(vec![0.0, 0.5]));
        Ok(())
    }

    #[test]
    fn random_samples_stay_inside() -> anyhow::Result<()> {
        let t: ParameterType = [("k", [2usize, 2])].into_iter().collect();
        let ranges = [("k".to_owned(), (-1.0, 3.0))].into_iter().collect();
        let space = CubicParameterSpace::with_ranges(t, ranges)?;
        let mut rng = StdRng::seed_from_u64(7);
        let samples = space.sample_randomly(20, &mut rng);
        assert!(samples.iter().all(|mu| space.contains(mu)));
        Ok(())
    }

    #[test]
    fn invalid_ranges() {
        let t: ParameterType = [("k", 1usize)].into_iter().collect();
        assert!(matches!(
            CubicParameterSpace::new(t.clone(), 1.0, 0.0),
            Err(ParameterError::Validation(_))
        ));
        let ranges = [("j".to_owned(), (0.0, 1.0))].into_iter().collect();
        assert!(matches!(
            CubicParameterSpace::with_ranges(t, ranges),
            Err(ParameterError::ComponentMismatch { .. })
        ));
    }
}
