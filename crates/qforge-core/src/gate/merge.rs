//! Gate fusion.

use tracing::debug;

use super::Gate;
use super::params::DenseMatrix;
use crate::error::{SimError, SimResult};

/// Largest support a merged gate may have. A dense matrix on 10 qubits
/// already holds 2^20 complex entries.
pub const MAX_MERGE_QUBITS: usize = 10;

/// Compose two gates into one: the result applies `first`, then `second`.
///
/// Both gates are embedded into the sorted union of their qubits (identity on
/// qubits a gate does not touch) and multiplied as `second · first`. The
/// supports may overlap or be disjoint.
///
/// Fails with [`SimError::UnsupportedMerge`] if either operand is a
/// measurement or the union spans more than [`MAX_MERGE_QUBITS`] qubits.
pub fn merge(first: &Gate, second: &Gate) -> SimResult<Gate> {
    first.validate()?;
    second.validate()?;

    if let Some(culprit) = [first, second].into_iter().find(|g| !g.is_unitary()) {
        return Err(SimError::UnsupportedMerge(format!(
            "'{}' has no unitary matrix",
            culprit.name()
        )));
    }

    // Size the support before any dense matrix is built.
    let mut support = first.target_qubits();
    support.extend(second.target_qubits());
    support.sort_unstable();
    support.dedup();
    if support.len() > MAX_MERGE_QUBITS {
        return Err(SimError::UnsupportedMerge(format!(
            "combined support of {} qubits exceeds the limit of {MAX_MERGE_QUBITS}",
            support.len()
        )));
    }

    let (Some(a), Some(b)) = (first.unitary(), second.unitary()) else {
        return Err(SimError::UnsupportedMerge(
            "operand has no unitary matrix".to_string(),
        ));
    };

    let product = b.embed(&support)?.dot(&a.embed(&support)?);
    debug!(
        first = first.name(),
        second = second.name(),
        qubits = support.len(),
        "merged gates"
    );
    Ok(Gate::Merged(DenseMatrix::from_parts(support, product)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::PauliOp;
    use crate::state::QuantumState;

    fn assert_states_close(a: &QuantumState, b: &QuantumState) {
        for (x, y) in a.state_vector().iter().zip(b.state_vector()) {
            assert!((x - y).norm() < 1e-10, "{x} != {y}");
        }
    }

    #[test]
    fn merge_overlapping_matches_sequence() {
        let first = Gate::cnot(0, 1).unwrap();
        let second = Gate::y(1);
        let merged = merge(&first, &second).unwrap();
        assert_eq!(merged.target_qubits(), vec![0, 1]);

        let mut expected = QuantumState::new(3, false).unwrap();
        expected.set_haar_random_state(3);
        let mut actual = expected.clone();
        first.apply(&mut expected).unwrap();
        second.apply(&mut expected).unwrap();
        merged.apply(&mut actual).unwrap();
        assert_states_close(&expected, &actual);
    }

    #[test]
    fn merge_disjoint_supports() {
        let first = Gate::h(2);
        let second = Gate::rx(0, 0.4);
        let merged = merge(&first, &second).unwrap();
        assert_eq!(merged.target_qubits(), vec![0, 2]);

        let mut expected = QuantumState::new(3, false).unwrap();
        expected.set_haar_random_state(8);
        let mut actual = expected.clone();
        first.apply(&mut expected).unwrap();
        second.apply(&mut expected).unwrap();
        merged.apply(&mut actual).unwrap();
        assert_states_close(&expected, &actual);
    }

    #[test]
    fn merge_is_ordered() {
        // X·H != H·X
        let hx = merge(&Gate::h(0), &Gate::x(0)).unwrap();
        let xh = merge(&Gate::x(0), &Gate::h(0)).unwrap();
        assert_ne!(hx, xh);
    }

    #[test]
    fn merge_rejects_measurement() {
        let err = merge(&Gate::h(0), &Gate::measurement(0, 0, 1)).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedMerge(_)));
        let err = merge(&Gate::measurement(0, 0, 1), &Gate::h(0)).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedMerge(_)));
    }

    #[test]
    fn merge_rejects_wide_operand_without_building_it() {
        let targets: Vec<u32> = (0..40).collect();
        let zz = Gate::pauli_rotation(&targets, &[PauliOp::Z; 40], 0.3).unwrap();
        assert!(matches!(
            merge(&zz, &Gate::h(0)),
            Err(SimError::UnsupportedMerge(_))
        ));

        let ones = vec![num_complex::Complex64::new(1.0, 0.0); 1 << 16];
        let wide = Gate::diagonal(&(0..16).collect::<Vec<u32>>(), &ones).unwrap();
        assert!(matches!(
            merge(&Gate::x(3), &wide),
            Err(SimError::UnsupportedMerge(_))
        ));
    }

    #[test]
    fn merge_rejects_wide_support() {
        let targets: Vec<u32> = (0..6).collect();
        let ones = vec![num_complex::Complex64::new(1.0, 0.0); 64];
        let a = Gate::diagonal(&targets, &ones).unwrap();
        let b = Gate::diagonal(&(6..12).collect::<Vec<u32>>(), &ones).unwrap();
        assert!(matches!(merge(&a, &b), Err(SimError::UnsupportedMerge(_))));
    }
}
