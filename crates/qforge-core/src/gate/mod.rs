//! Quantum gate types.
//!
//! A [`Gate`] is an immutable value. It knows nothing about the state it will
//! be applied to, so qubit indices are checked against the state only when
//! the gate is applied; malformed parameters (a CNOT whose control equals its
//! target, a diagonal with the wrong number of entries, ...) are rejected when
//! the gate is built.
//!
//! Qubit `q` is bit `q` of the basis index. Multi-qubit gates describe their
//! matrices in a local basis where bit j stands for the j-th entry of
//! [`Gate::target_qubits`].

mod matrix;
mod merge;
mod params;

pub use merge::{MAX_MERGE_QUBITS, merge};
pub use params::{DenseMatrix, DiagonalMatrix, Measurement, PauliRotation, Rotation};

use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::observable::PauliOp;
use crate::state::{PauliMasks, QuantumState};

/// A gate, unitary or measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Identity.
    Identity { target: u32 },
    /// Pauli-X.
    PauliX { target: u32 },
    /// Pauli-Y.
    PauliY { target: u32 },
    /// Pauli-Z.
    PauliZ { target: u32 },
    /// Hadamard.
    Hadamard { target: u32 },
    /// `exp(-i·θ/2·X)`.
    RotationX(Rotation),
    /// `exp(-i·θ/2·Y)`.
    RotationY(Rotation),
    /// `exp(-i·θ/2·Z)`.
    RotationZ(Rotation),
    /// Controlled-X.
    Cnot { control: u32, target: u32 },
    /// Multi-qubit Pauli rotation.
    PauliRotation(PauliRotation),
    /// Diagonal matrix over a qubit subset.
    DiagonalMatrix(DiagonalMatrix),
    /// Z-basis measurement into the classical register.
    Measurement(Measurement),
    /// Dense matrix, usually the result of [`merge`].
    Merged(DenseMatrix),
}

impl Gate {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn identity(target: u32) -> Self {
        Gate::Identity { target }
    }

    pub fn x(target: u32) -> Self {
        Gate::PauliX { target }
    }

    pub fn y(target: u32) -> Self {
        Gate::PauliY { target }
    }

    pub fn z(target: u32) -> Self {
        Gate::PauliZ { target }
    }

    pub fn h(target: u32) -> Self {
        Gate::Hadamard { target }
    }

    /// Rotation about X by `angle`, `exp(-i·angle/2·X)`.
    pub fn rx(target: u32, angle: f64) -> Self {
        Gate::RotationX(Rotation::new(target, angle))
    }

    /// Rotation about Y by `angle`, `exp(-i·angle/2·Y)`.
    pub fn ry(target: u32, angle: f64) -> Self {
        Gate::RotationY(Rotation::new(target, angle))
    }

    /// Rotation about Z by `angle`, `exp(-i·angle/2·Z)`.
    pub fn rz(target: u32, angle: f64) -> Self {
        Gate::RotationZ(Rotation::new(target, angle))
    }

    /// CNOT. Fails if `control == target`.
    pub fn cnot(control: u32, target: u32) -> SimResult<Self> {
        let gate = Gate::Cnot { control, target };
        gate.validate()?;
        Ok(gate)
    }

    /// `exp(+i·angle/2·P)` with `P = ⊗_j paulis[j]` on `targets[j]`.
    pub fn pauli_rotation(targets: &[u32], paulis: &[PauliOp], angle: f64) -> SimResult<Self> {
        PauliRotation::new(targets, paulis, angle).map(Gate::PauliRotation)
    }

    /// Diagonal gate. `elements` must hold exactly `2^targets.len()` entries.
    pub fn diagonal(targets: &[u32], elements: &[Complex64]) -> SimResult<Self> {
        DiagonalMatrix::new(targets, elements).map(Gate::DiagonalMatrix)
    }

    /// Measure `target`, writing the outcome into register slot `register`.
    pub fn measurement(target: u32, register: u32, seed: u64) -> Self {
        Gate::Measurement(Measurement {
            target,
            register,
            seed,
        })
    }

    /// Arbitrary dense gate.
    pub fn dense(targets: &[u32], matrix: Array2<Complex64>) -> SimResult<Self> {
        DenseMatrix::new(targets, matrix).map(Gate::Merged)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Get the name of this gate.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Identity { .. } => "id",
            Gate::PauliX { .. } => "x",
            Gate::PauliY { .. } => "y",
            Gate::PauliZ { .. } => "z",
            Gate::Hadamard { .. } => "h",
            Gate::RotationX(_) => "rx",
            Gate::RotationY(_) => "ry",
            Gate::RotationZ(_) => "rz",
            Gate::Cnot { .. } => "cx",
            Gate::PauliRotation(_) => "pauli_rotation",
            Gate::DiagonalMatrix(_) => "diagonal",
            Gate::Measurement(_) => "measure",
            Gate::Merged(_) => "dense",
        }
    }

    /// Qubits the gate acts on. For CNOT this is `[control, target]`.
    pub fn target_qubits(&self) -> Vec<u32> {
        match self {
            Gate::Identity { target }
            | Gate::PauliX { target }
            | Gate::PauliY { target }
            | Gate::PauliZ { target }
            | Gate::Hadamard { target } => vec![*target],
            Gate::RotationX(r) | Gate::RotationY(r) | Gate::RotationZ(r) => vec![r.target()],
            Gate::Cnot { control, target } => vec![*control, *target],
            Gate::PauliRotation(p) => p.targets().to_vec(),
            Gate::DiagonalMatrix(d) => d.targets().to_vec(),
            Gate::Measurement(m) => vec![m.target],
            Gate::Merged(d) => d.targets().to_vec(),
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        self.target_qubits().len()
    }

    /// False only for measurements.
    pub fn is_unitary(&self) -> bool {
        !matches!(self, Gate::Measurement(_))
    }

    /// Check parameters that do not depend on any state.
    ///
    /// The payload types validate themselves; only the plain CNOT variant can
    /// be built in a malformed shape.
    pub fn validate(&self) -> SimResult<()> {
        if let Gate::Cnot { control, target } = self {
            if control == target {
                return Err(SimError::invalid_gate(
                    "cx",
                    format!("control and target are both qubit {control}"),
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Application
    // =========================================================================

    /// Apply the gate to `state` in place.
    pub fn apply(&self, state: &mut QuantumState) -> SimResult<()> {
        self.apply_seeded(state, None)
    }

    /// Apply the gate; a measurement draws from `seed_override` instead of its own seed.
    pub(crate) fn apply_seeded(
        &self,
        state: &mut QuantumState,
        seed_override: Option<u64>,
    ) -> SimResult<()> {
        self.validate()?;
        for qubit in self.target_qubits() {
            state.check_qubit(self.name(), qubit)?;
        }

        match self {
            Gate::Identity { .. } => {}
            Gate::PauliX { target } => state.apply_x(*target),
            Gate::PauliZ { target } => {
                let (one, minus_one) = (Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0));
                state.apply_single_diagonal(*target, one, minus_one);
            }
            Gate::RotationZ(r) => {
                let (d0, d1) = matrix::rz_phases(r.generator_angle());
                state.apply_single_diagonal(r.target(), d0, d1);
            }
            Gate::PauliY { target } | Gate::Hadamard { target } => {
                if let Some(m) = self.single_qubit_matrix() {
                    state.apply_single_qubit(*target, m);
                }
            }
            Gate::RotationX(r) => {
                state.apply_single_qubit(r.target(), matrix::rx_matrix(r.generator_angle()));
            }
            Gate::RotationY(r) => {
                state.apply_single_qubit(r.target(), matrix::ry_matrix(r.generator_angle()));
            }
            Gate::Cnot { control, target } => state.apply_cnot(*control, *target),
            Gate::PauliRotation(p) => {
                state.apply_pauli_rotation(PauliMasks::from_ops(&p.ops()), p.angle());
            }
            Gate::DiagonalMatrix(d) => match (d.targets(), d.elements()) {
                ([target], [d0, d1]) => state.apply_single_diagonal(*target, *d0, *d1),
                (targets, elements) => state.apply_diagonal(targets, elements),
            },
            Gate::Measurement(m) => measure(m, state, seed_override.unwrap_or(m.seed))?,
            Gate::Merged(dense) => match dense.targets() {
                [target] => state.apply_single_qubit(*target, matrix::to_matrix2(dense.matrix())),
                targets => state.apply_dense(targets, dense.matrix()),
            },
        }
        Ok(())
    }
}

/// Sample an outcome for `m.target`, collapse the state onto it and record it.
fn measure(m: &Measurement, state: &mut QuantumState, seed: u64) -> SimResult<()> {
    let p0 = state.zero_probability(m.target)?;
    let total = state.norm_squared();

    let mut rng = StdRng::seed_from_u64(seed);
    let r: f64 = rng.r#gen::<f64>() * total;
    let (outcome, probability) = if r < p0 { (0, p0) } else { (1, total - p0) };

    state.project(m.target, outcome, probability);
    state.set_classical_value(m.register as usize, outcome);
    debug!(
        target = m.target,
        register = m.register,
        outcome,
        probability,
        "measured qubit"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_gate_properties() {
        assert_eq!(Gate::h(3).name(), "h");
        assert_eq!(Gate::h(3).target_qubits(), vec![3]);
        assert_eq!(Gate::cnot(2, 0).unwrap().target_qubits(), vec![2, 0]);
        assert_eq!(Gate::cnot(2, 0).unwrap().num_qubits(), 2);
        assert!(Gate::rx(0, PI).is_unitary());
        assert!(!Gate::measurement(0, 0, 0).is_unitary());
    }

    #[test]
    fn test_cnot_control_equals_target() {
        let err = Gate::cnot(1, 1).unwrap_err();
        assert!(matches!(err, SimError::InvalidGate { gate: "cx", .. }));

        // A hand-built variant is still rejected when applied.
        let mut state = QuantumState::new(2, false).unwrap();
        let gate = Gate::Cnot { control: 0, target: 0 };
        assert!(gate.apply(&mut state).unwrap_err().is_invalid_gate());
        assert!(approx_eq(state.state_vector()[0], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_out_of_range_detected_at_apply() {
        let gate = Gate::x(5);
        let mut state = QuantumState::new(2, false).unwrap();
        assert!(matches!(
            gate.apply(&mut state),
            Err(SimError::QubitOutOfRange { gate: "x", qubit: 5, num_qubits: 2 })
        ));
        let cx = Gate::cnot(0, 2).unwrap();
        assert!(cx.apply(&mut state).unwrap_err().is_invalid_gate());
    }

    #[test]
    fn test_pauli_y_phases() {
        // Y|0⟩ = i|1⟩
        let mut state = QuantumState::new(1, false).unwrap();
        Gate::y(0).apply(&mut state).unwrap();
        assert!(approx_eq(state.state_vector()[1], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_rz_sign_convention() {
        // Rz(θ)|1⟩ = e^{iθ/2}|1⟩
        let mut state = QuantumState::new(1, false).unwrap();
        state.set_computational_basis(1).unwrap();
        Gate::rz(0, 0.6).apply(&mut state).unwrap();
        assert!(approx_eq(state.state_vector()[1], Complex64::from_polar(1.0, 0.3)));
    }

    #[test]
    fn test_diagonal_phase() {
        let mut state = QuantumState::new(2, false).unwrap();
        Gate::h(0).apply(&mut state).unwrap();
        Gate::h(1).apply(&mut state).unwrap();
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        // entry index: bit 0 = qubit 1, bit 1 = qubit 0
        Gate::diagonal(&[1, 0], &[one, one, i, one])
            .unwrap()
            .apply(&mut state)
            .unwrap();
        // basis 1 = qubit0 set, qubit1 clear -> entry index 0b10
        assert!(approx_eq(state.state_vector()[1], i * 0.5));
        assert!(approx_eq(state.state_vector()[2], Complex64::new(0.5, 0.0)));
    }

    #[test]
    fn test_pauli_rotation_matches_rx() {
        // exp(+iφ/2·X) is Rx(-φ)
        let mut a = QuantumState::new(2, false).unwrap();
        a.set_haar_random_state(1);
        let mut b = a.clone();
        Gate::pauli_rotation(&[1], &[PauliOp::X], 0.9)
            .unwrap()
            .apply(&mut a)
            .unwrap();
        Gate::rx(1, -0.9).apply(&mut b).unwrap();
        for (x, y) in a.state_vector().iter().zip(b.state_vector()) {
            assert!(approx_eq(*x, *y));
        }
    }

    #[test]
    fn test_measurement_collapses() {
        let mut state = QuantumState::new(1, false).unwrap();
        Gate::h(0).apply(&mut state).unwrap();
        Gate::measurement(0, 2, 17).apply(&mut state).unwrap();

        let outcome = state.classical_value(2).unwrap();
        let amps = state.state_vector();
        assert!(approx_eq(amps[outcome as usize], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(amps[1 - outcome as usize], Complex64::new(0.0, 0.0)));
        assert_eq!(state.classical_register().len(), 3);
    }

    #[test]
    fn test_measurement_of_one() {
        let mut state = QuantumState::new(2, false).unwrap();
        Gate::x(1).apply(&mut state).unwrap();
        for seed in 0..20 {
            Gate::measurement(1, 0, seed).apply(&mut state).unwrap();
            assert_eq!(state.classical_value(0), Some(1));
        }
        assert!(approx_eq(state.state_vector()[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_measurement_out_of_range_leaves_state() {
        let mut state = QuantumState::new(2, false).unwrap();
        let before = state.clone();
        assert!(matches!(
            Gate::measurement(4, 0, 1).apply(&mut state),
            Err(SimError::QubitOutOfRange { qubit: 4, num_qubits: 2, .. })
        ));
        assert_eq!(state, before);
        assert!(state.classical_register().is_empty());
    }

    #[test]
    fn test_merged_single_qubit_fast_path() {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let mut m = Array2::from_elem((2, 2), s);
        m[[1, 1]] = -s;
        let dense = Gate::dense(&[0], m).unwrap();
        let mut state = QuantumState::new(1, false).unwrap();
        dense.apply(&mut state).unwrap();
        assert!(approx_eq(state.state_vector()[1], s));
    }
}
