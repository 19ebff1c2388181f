//! The parametric capability.
//!
//! Every object whose evaluation depends on a parameter owns a [`ParameterProfile`], built once at construction
//! from the components it introduces itself and the profiles of the objects it depends on. The [`Parametric`]
//! trait exposes the profile and derives parameter handling from it.

use std::collections::BTreeMap;

use crate::{
    error::ParameterError,
    parameter::{parse_parameter, Parameter, ParameterInput},
    parameter_type::ParameterType,
    space::CubicParameterSpace,
};

/// How the local component names of an object map to global parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GlobalNames {
    /// No mapping. Only valid if the object introduces no local components.
    #[default]
    None,
    /// Every local name is its own global name.
    Identity,
    /// Explicit mapping `local -> global`.
    Map(BTreeMap<String, String>),
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlobalNames {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        GlobalNames::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Inputs of [`ParameterProfile::build`].
#[derive(Default)]
pub struct ProfileSpec<'a> {
    local_type: ParameterType,
    global_names: GlobalNames,
    inherits: Vec<&'a dyn Parametric>,
    provides: ParameterType,
}

impl<'a> ProfileSpec<'a> {
    /// Spec of an object that introduces no components and depends on nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Components introduced by the object itself, under their local names.
    pub fn local(mut self, local_type: ParameterType) -> Self {
        self.local_type = local_type;
        self
    }

    /// Global names of the local components.
    pub fn global_names(mut self, global_names: GlobalNames) -> Self {
        self.global_names = global_names;
        self
    }

    /// Shorthand for [`GlobalNames::Identity`].
    pub fn local_global(self) -> Self {
        self.global_names(GlobalNames::Identity)
    }

    /// Merges the parameter type of `dependency` into the built type.
    pub fn inherit(mut self, dependency: &'a dyn Parametric) -> Self {
        self.inherits.push(dependency);
        self
    }

    /// Merges the parameter types of all `dependencies`.
    pub fn inherit_all(mut self, dependencies: impl IntoIterator<Item = &'a dyn Parametric>) -> Self {
        self.inherits.extend(dependencies);
        self
    }

    /// Components the object supplies to its dependencies itself. They are not part of the built type.
    pub fn provides(mut self, provides: ParameterType) -> Self {
        self.provides = provides;
        self
    }

    /// Shorthand for [`ParameterProfile::build`].
    pub fn build(self) -> Result<ParameterProfile, ParameterError> {
        ParameterProfile::build(self)
    }
}

/// Parameter metadata of a parametric object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterProfile {
    parameter_type: Option<ParameterType>,
    local_type: Option<ParameterType>,
    global_names: BTreeMap<String, String>,
    provided: Option<ParameterType>,
    parameter_space: Option<CubicParameterSpace>,
}

impl ParameterProfile {
    /// Profile of an object that does not depend on a parameter.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merges the local declarations and the types of the dependencies into a profile.
    ///
    /// Every local name needs a global name. The global type starts from the local components under their
    /// global names; the components of each parametric dependency are merged in afterwards. A name declared
    /// twice with different shapes is a [`ParameterError::Conflict`], as is an inherited component whose shape
    /// differs from the provided one. Provided components are never part of the result.
    pub fn build(spec: ProfileSpec<'_>) -> Result<Self, ParameterError> {
        let ProfileSpec {
            local_type,
            global_names,
            inherits,
            provides,
        } = spec;

        let global_names: BTreeMap<String, String> = match global_names {
            GlobalNames::None => BTreeMap::new(),
            GlobalNames::Identity => local_type.names().map(|k| (k.to_owned(), k.to_owned())).collect(),
            GlobalNames::Map(map) => map,
        };
        if let Some(missing) = local_type.names().find(|k| !global_names.contains_key(*k)) {
            return Err(ParameterError::Validation(format!(
                "must specify a global name for {missing}"
            )));
        }

        let mut global_type = ParameterType::new();
        for (local, shape) in local_type.iter() {
            merge(&mut global_type, &global_names[local], shape)?;
        }

        for dependency in inherits.iter().filter(|d| d.parametric()) {
            for (name, shape) in dependency.parameter_type().into_iter().flat_map(|t| t.iter()) {
                if let Some(existing) = global_type.get(name) {
                    if existing != shape {
                        return Err(conflict(name, existing, shape));
                    }
                }
                match provides.get(name) {
                    Some(provided) if provided != shape => return Err(conflict(name, provided, shape)),
                    Some(_) => {}
                    None => {
                        global_type.insert(name, shape);
                    }
                }
            }
        }

        log::debug!(
            "built parameter type {global_type} from local type {local_type} and {} dependencies",
            inherits.len()
        );
        Ok(Self {
            parameter_type: non_empty(global_type),
            local_type: non_empty(local_type),
            global_names,
            provided: non_empty(provides),
            parameter_space: None,
        })
    }

    /// Attaches the parameter space the parameters of the object are expected to lie in.
    pub fn with_parameter_space(mut self, space: CubicParameterSpace) -> Result<Self, ParameterError> {
        let expected = self.parameter_type.clone().unwrap_or_default();
        if *space.parameter_type() != expected {
            return Err(ParameterError::TypeMismatch {
                expected: expected.to_string(),
                actual: space.parameter_type().to_string(),
            });
        }
        self.parameter_space = Some(space);
        Ok(self)
    }

    /// The merged parameter type, `None` if the object is not parametric.
    pub fn parameter_type(&self) -> Option<&ParameterType> {
        self.parameter_type.as_ref()
    }

    /// The components introduced by the object itself, under their local names.
    pub fn local_type(&self) -> Option<&ParameterType> {
        self.local_type.as_ref()
    }

    /// Mapping `local -> global` of the local component names.
    pub fn global_names(&self) -> &BTreeMap<String, String> {
        &self.global_names
    }

    /// Components supplied by the object itself.
    pub fn provided(&self) -> Option<&ParameterType> {
        self.provided.as_ref()
    }

    /// The attached parameter space.
    pub fn parameter_space(&self) -> Option<&CubicParameterSpace> {
        self.parameter_space.as_ref()
    }
}

fn merge(ty: &mut ParameterType, name: &str, shape: &[usize]) -> Result<(), ParameterError> {
    match ty.get(name) {
        Some(existing) if existing != shape => Err(conflict(name, existing, shape)),
        Some(_) => Ok(()),
        None => {
            ty.insert(name, shape);
            Ok(())
        }
    }
}

fn conflict(name: &str, existing: &[usize], incoming: &[usize]) -> ParameterError {
    ParameterError::Conflict {
        name: name.to_owned(),
        existing: existing.to_vec(),
        incoming: incoming.to_vec(),
    }
}

fn non_empty(ty: ParameterType) -> Option<ParameterType> {
    (!ty.is_empty()).then_some(ty)
}

/// An object whose evaluation depends on a parameter.
pub trait Parametric {
    /// The parameter metadata of the object.
    fn parameter_profile(&self) -> &ParameterProfile;

    /// The parameter type of the object, `None` if it does not depend on a parameter.
    fn parameter_type(&self) -> Option<&ParameterType> {
        self.parameter_profile().parameter_type()
    }

    /// Whether the object depends on a parameter.
    fn parametric(&self) -> bool {
        self.parameter_type().is_some()
    }

    /// Interprets `input` as a parameter for this object.
    ///
    /// A [`Parameter`] is accepted as is if it contains every component of the parameter type with the
    /// declared shape; additional components are allowed. Any other input goes through [`parse_parameter`].
    fn parse_parameter(&self, input: ParameterInput) -> Result<Option<Parameter>, ParameterError> {
        match (input, self.parameter_type()) {
            (ParameterInput::Parameter(mu), Some(ty)) => {
                check_components(&mu, ty)?;
                Ok(Some(mu))
            }
            (input, ty) => parse_parameter(input, ty),
        }
    }

    /// The values of the local components of the object, keyed by their local names.
    fn local_parameter(&self, mu: &Parameter) -> Result<Option<Parameter>, ParameterError> {
        let profile = self.parameter_profile();
        let Some(local_type) = profile.local_type() else {
            return Ok(None);
        };
        local_type
            .names()
            .map(|local| {
                let global = &profile.global_names()[local];
                mu.get(global)
                    .map(|v| (local, v.clone()))
                    .ok_or_else(|| missing(self.parameter_type(), mu))
            })
            .collect::<Result<Parameter, _>>()
            .map(Some)
    }

    /// Restricts `mu` to the components of the parameter type of the object.
    fn strip_parameter(&self, mu: &Parameter) -> Result<Option<Parameter>, ParameterError> {
        let Some(ty) = self.parameter_type() else {
            return Ok(None);
        };
        check_components(mu, ty)?;
        Ok(Some(
            ty.names()
                .filter_map(|name| mu.get(name).map(|v| (name, v.clone())))
                .collect(),
        ))
    }

    /// Human readable description of the parameter type.
    fn parameter_info(&self) -> String {
        match self.parameter_type() {
            None => "The parameter_type is None\n".to_owned(),
            Some(ty) => format!("The parameter_type is: {ty}\n\n"),
        }
    }
}

fn check_components(mu: &Parameter, ty: &ParameterType) -> Result<(), ParameterError> {
    for (name, shape) in ty.iter() {
        let value = mu.get(name).ok_or_else(|| missing(Some(ty), mu))?;
        if value.shape() != shape {
            return Err(ParameterError::ShapeMismatch {
                name: name.to_owned(),
                expected: shape.to_vec(),
                actual: value.shape().to_vec(),
            });
        }
    }
    Ok(())
}

fn missing(ty: Option<&ParameterType>, mu: &Parameter) -> ParameterError {
    ParameterError::ComponentMismatch {
        expected: ty.into_iter().flat_map(|t| t.names().map(String::from)).collect(),
        actual: mu.names().map(String::from).collect(),
    }
}

impl Parametric for ParameterProfile {
    fn parameter_profile(&self) -> &ParameterProfile {
        self
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr0, arr1};

    use super::*;
    use crate::parameter::ParamValue;

    struct Term {
        profile: ParameterProfile,
    }

    impl Parametric for Term {
        fn parameter_profile(&self) -> &ParameterProfile {
            &self.profile
        }
    }

    fn term(local: &[(&str, usize)], names: &[(&str, &str)]) -> anyhow::Result<Term> {
        let profile = ProfileSpec::new()
            .local(local.iter().copied().collect())
            .global_names(names.iter().copied().collect())
            .build()?;
        Ok(Term { profile })
    }

    #[test]
    fn local_names_are_remapped() -> anyhow::Result<()> {
        let t = term(&[("k", 1), ("f", 3)], &[("k", "diffusion"), ("f", "source")])?;
        let expected: ParameterType = [("diffusion", 1usize), ("source", 3)].into_iter().collect();
        assert_eq!(t.parameter_type(), Some(&expected));
        assert_eq!(t.profile.local_type().map(ParameterType::len), Some(2));

        let mu: Parameter = [
            ("diffusion", arr0(0.5).into_dyn()),
            ("source", arr1(&[1.0, 2.0, 3.0]).into_dyn()),
        ]
        .into_iter()
        .collect();
        let local = t.local_parameter(&mu)?.ok_or_else(|| anyhow::anyhow!("no local parameter"))?;
        assert_eq!(local.names().collect::<Vec<_>>(), ["f", "k"]);
        assert_eq!(local.get("k"), mu.get("diffusion"));
        Ok(())
    }

    #[test]
    fn inherited_types_are_merged() -> anyhow::Result<()> {
        let a = term(&[("k", 1)], &[("k", "k")])?;
        let b = term(&[("f", 2)], &[("f", "f")])?;
        let sum = ProfileSpec::new().inherit(&a).inherit(&b).build()?;
        assert_eq!(sum.parameter_type().map(ToString::to_string).as_deref(), Some("{f: (2,), k: ()}"));
        assert_eq!(sum.local_type(), None);

        let mu = sum
            .parse_parameter([("f", ParamValue::from(vec![1.0, 2.0])), ("k", ParamValue::from(3.0))].into())?
            .ok_or_else(|| anyhow::anyhow!("no parameter"))?;
        let stripped = a.strip_parameter(&mu)?.ok_or_else(|| anyhow::anyhow!("no parameter"))?;
        assert_eq!(stripped.names().collect::<Vec<_>>(), ["k"]);
        assert!(a.parse_parameter(mu.into()).is_ok());
        Ok(())
    }

    #[test]
    fn conflicting_shapes() -> anyhow::Result<()> {
        let a = term(&[("k", 1)], &[("k", "k")])?;
        let b = term(&[("k", 2)], &[("k", "k")])?;
        assert!(matches!(
            ProfileSpec::new().inherit_all([&a as &dyn Parametric, &b]).build(),
            Err(ParameterError::Conflict { name, .. }) if name == "k"
        ));
        assert!(matches!(
            ProfileSpec::new()
                .local([("x", 3usize)].into_iter().collect())
                .local_global()
                .inherit(&b)
                .build()
                .map(|p| p.parameter_type().cloned()),
            Ok(Some(_))
        ));
        assert!(matches!(
            ProfileSpec::new()
                .local([("k", 3usize)].into_iter().collect())
                .local_global()
                .inherit(&b)
                .build(),
            Err(ParameterError::Conflict { .. })
        ));
        Ok(())
    }

    #[test]
    fn provided_components_are_excluded() -> anyhow::Result<()> {
        let a = term(&[("k", 1), ("t", 1)], &[("k", "k"), ("t", "t")])?;
        let outer = ProfileSpec::new()
            .inherit(&a)
            .provides([("t", 1usize)].into_iter().collect())
            .build()?;
        assert_eq!(outer.parameter_type().map(|t| t.names().collect::<Vec<_>>()), Some(vec!["k"]));
        assert!(outer.provided().is_some_and(|p| p.contains("t")));

        let wrong = ProfileSpec::new()
            .inherit(&a)
            .provides([("t", 2usize)].into_iter().collect())
            .build();
        assert!(matches!(wrong, Err(ParameterError::Conflict { .. })));
        Ok(())
    }

    #[test]
    fn missing_global_name() {
        let res = ProfileSpec::new()
            .local([("k", 1usize), ("f", 1)].into_iter().collect())
            .global_names([("k", "k")].into_iter().collect())
            .build();
        assert!(matches!(res, Err(ParameterError::Validation(_))));
        let res = ProfileSpec::new().local([("k", 1usize)].into_iter().collect()).build();
        assert!(matches!(res, Err(ParameterError::Validation(_))));
    }

    #[test]
    fn non_parametric_objects() -> anyhow::Result<()> {
        let p = ParameterProfile::empty();
        assert!(!p.parametric());
        assert_eq!(p.parameter_info(), "The parameter_type is None\n");
        assert_eq!(p.parse_parameter(ParameterInput::None)?, None);
        assert!(p.parse_parameter(1.0f64.into()).is_err());
        assert_eq!(p.strip_parameter(&Parameter::new())?, None);

        let t = term(&[("k", 2)], &[("k", "k")])?;
        assert_eq!(t.parameter_info(), "The parameter_type is: {k: (2,)}\n\n");
        Ok(())
    }

    #[test]
    fn parameter_space_must_match() -> anyhow::Result<()> {
        let t = term(&[("k", 1)], &[("k", "k")])?;
        let space = CubicParameterSpace::new([("k", 1usize)].into_iter().collect(), 0.0, 1.0)?;
        let other = CubicParameterSpace::new([("j", 1usize)].into_iter().collect(), 0.0, 1.0)?;
        assert!(t.profile.clone().with_parameter_space(space).is_ok());
        assert!(matches!(
            t.profile.clone().with_parameter_space(other),
            Err(ParameterError::TypeMismatch { .. })
        ));
        Ok(())
    }
}
