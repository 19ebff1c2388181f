use approx::assert_abs_diff_eq;
use ndarray::array;
use num_complex::Complex64;
use vectory_core::prelude::*;
use vectory_linalg::prelude::*;
use vectory_ndarray::prelude::*;
use vectory_params::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn weighted() -> NdMatrixOperator<f64> {
    NdMatrixOperator::new(array![[2.0, 0.0], [0.0, 1.0]])
}

#[test]
fn euclidean_and_weighted_products() -> anyhow::Result<()> {
    init_logger();
    let product = weighted();
    let u = product.source().from_numpy(array![[1.0, 1.0], [1.0, 0.0]].view())?;

    assert_abs_diff_eq!(u.norm2(None)?, array![2.0, 1.0]);
    assert_abs_diff_eq!(u.norm2(Some(&product))?, array![3.0, 2.0]);
    assert_abs_diff_eq!(u.norm(Some(&product))?, array![3.0f64.sqrt(), 2.0f64.sqrt()]);
    assert_eq!(u.gramian(Some(&product))?, array![[3.0, 2.0], [2.0, 2.0]]);
    assert_eq!(u.gramian(None)?, u.dot(&u)?);

    let v = product.source().from_numpy(array![[0.0, 1.0], [1.0, 1.0]].view())?;
    assert_eq!(u.inner(&v, Some(&product))?, array![[1.0, 3.0], [0.0, 2.0]]);
    assert_eq!(u.pairwise_inner(&v, Some(&product))?, array![1.0, 2.0]);
    assert_eq!(u.pairwise_inner(&v, None)?, array![1.0, 1.0]);
    Ok(())
}

#[test]
fn rectangular_apply_and_adjoint() -> anyhow::Result<()> {
    let op = NdMatrixOperator::new(array![[1.0, 2.0, 0.0], [0.0, 1.0, -1.0]]);
    assert_eq!((op.source().dim(), op.range().dim()), (3, 2));
    assert!(op.linear());
    assert!(!op.parametric());

    let u = op.source().from_numpy(array![[1.0, 1.0, 1.0], [0.0, 0.0, 2.0]].view())?;
    assert_eq!(op.apply(&u, None)?.to_numpy()?, array![[3.0, 0.0], [0.0, -2.0]]);

    let v = op.range().from_numpy(array![[1.0, 1.0]].view())?;
    assert_eq!(op.apply_adjoint(&v, None)?.to_numpy()?, array![[1.0, 3.0, -1.0]]);
    assert_eq!(op.apply2(&v, &u, None)?, array![[3.0, -2.0]]);
    assert!(matches!(
        op.pairwise_apply2(&v, &u, None),
        Err(OperatorError::Array(VectorArrayError::DimensionMismatch { .. }))
    ));
    assert!(matches!(op.apply_inverse(&v, None, false), Err(OperatorError::NotSupported(_))));
    Ok(())
}

#[test]
fn complex_adjoint() -> anyhow::Result<()> {
    let c = |re, im| Complex64::new(re, im);
    let op = NdMatrixOperator::new(array![[c(0.0, 1.0), c(1.0, 0.0)], [c(0.0, 0.0), c(2.0, -1.0)]]);
    let u = op.source().from_numpy(array![[c(1.0, 1.0), c(0.0, 2.0)]].view())?;
    let v = op.range().from_numpy(array![[c(3.0, 0.0), c(1.0, -1.0)]].view())?;
    let lhs = v.dot(&op.apply(&u, None)?)?;
    let rhs = op.apply_adjoint(&v, None)?.dot(&u)?;
    assert_eq!(lhs, rhs);
    Ok(())
}

#[test]
fn arrays_from_other_spaces_are_rejected() -> anyhow::Result<()> {
    let op = NdMatrixOperator::with_spaces(
        array![[1.0, 0.0], [0.0, 1.0]],
        NdVectorSpace::with_id(2, "state"),
        NdVectorSpace::with_id(2, "state"),
    )?;
    let anonymous = NdVectorSpace::new(2).zeros(1);
    assert!(matches!(
        op.apply(&anonymous, None),
        Err(OperatorError::Array(VectorArrayError::SpaceMismatch))
    ));
    assert!(matches!(
        anonymous.norm(Some(&op)),
        Err(OperatorError::Array(VectorArrayError::SpaceMismatch))
    ));
    assert!(NdMatrixOperator::with_spaces(array![[1.0, 0.0]], NdVectorSpace::new(2), NdVectorSpace::new(2)).is_err());
    Ok(())
}

#[test]
fn non_parametric_operator_rejects_parameters() -> anyhow::Result<()> {
    let op = weighted();
    let u = op.source().zeros(1);
    let mu: Parameter = [("k", array![1.0].into_dyn())].into_iter().collect();
    assert!(matches!(
        op.apply(&u, Some(&mu)),
        Err(OperatorError::Parameter(ParameterError::TypeMismatch { .. }))
    ));
    assert_eq!(op.parameter_info(), "The parameter_type is None\n");
    Ok(())
}

#[test]
fn solver_options_from_json() -> anyhow::Result<()> {
    init_logger();
    let options: SolverOptions = serde_json::from_str(r#"{"solver": "cholesky"}"#)?;
    assert_eq!(options.solver, DenseSolver::Cholesky);
    let defaults: SolverOptions = serde_json::from_str("{}")?;
    assert_eq!(defaults, SolverOptions::default());
    assert!(serde_json::from_str::<SolverOptions>(r#"{"solver": "qr"}"#).is_err());

    let op = weighted().with_solver_options(options);
    let v = op.range().from_numpy(array![[4.0, 3.0]].view())?;
    assert_abs_diff_eq!(op.apply_inverse(&v, None, false)?.to_numpy()?, array![[2.0, 3.0]], epsilon = 1e-12);
    Ok(())
}
