//! `qforge-bridge`: flat functional interface over `qforge-core`.
//!
//! Host-language bindings see free functions and plain data only: `u32`
//! qubit indices and seeds, `f64` angles, [`Complex`] numbers and [`Pauli`]
//! letters. State, circuit, gate and observable values are owned by the
//! caller and passed back in by reference.
//!
//! Seeds cross the boundary as `u32` and are widened to `u64` unchanged.
//!
//! # Example
//!
//! ```rust
//! use qforge_bridge::*;
//!
//! let mut state = new_quantum_state(2, false).unwrap();
//! let mut circuit = new_quantum_circuit(2);
//! add_h_gate(&mut circuit, 0);
//! add_cnot_gate(&mut circuit, 0, 1).unwrap();
//! update_quantum_state(&circuit, &mut state, 1).unwrap();
//!
//! let mut zz = new_observable(2);
//! add_operator(&mut zz, 1.0.into(), "Z 0 Z 1").unwrap();
//! let value = get_expectation_value(&zz, &state).unwrap();
//! assert!((value.real - 1.0).abs() < 1e-12);
//! ```

pub mod telemetry;

use num_complex::Complex64;
use tracing::debug;

pub use qforge_core::{Gate, Observable, QuantumCircuit, QuantumState, SimError, SimResult};
use qforge_core::PauliOp;

// =============================================================================
// Boundary types
// =============================================================================

/// A complex number as it crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub real: f64,
    pub imag: f64,
}

impl From<f64> for Complex {
    fn from(value: f64) -> Self {
        Self {
            real: value,
            imag: 0.0,
        }
    }
}

impl From<Complex> for Complex64 {
    fn from(value: Complex) -> Self {
        Complex64::new(value.real, value.imag)
    }
}

impl From<Complex64> for Complex {
    fn from(value: Complex64) -> Self {
        Self {
            real: value.re,
            imag: value.im,
        }
    }
}

/// A non-identity Pauli letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Pauli {
    X = 1,
    Y = 2,
    Z = 3,
}

impl From<Pauli> for PauliOp {
    fn from(value: Pauli) -> Self {
        match value {
            Pauli::X => PauliOp::X,
            Pauli::Y => PauliOp::Y,
            Pauli::Z => PauliOp::Z,
        }
    }
}

impl TryFrom<u32> for Pauli {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Pauli::X),
            2 => Ok(Pauli::Y),
            3 => Ok(Pauli::Z),
            other => Err(other),
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// Allocate a state in |0...0⟩.
pub fn new_quantum_state(qubit_count: u32, multi_cpu: bool) -> SimResult<QuantumState> {
    QuantumState::new(qubit_count, multi_cpu)
}

pub fn set_zero_state(state: &mut QuantumState) {
    state.set_zero_state();
}

pub fn set_haar_random_state(state: &mut QuantumState, seed: u32) {
    state.set_haar_random_state(u64::from(seed));
}

/// Draw `sampling_count` basis-state indices.
pub fn quantum_state_sampling(state: &QuantumState, sampling_count: u32, seed: u32) -> Vec<u64> {
    state.sample(sampling_count as usize, u64::from(seed))
}

pub fn get_state_vector(state: &QuantumState) -> Vec<Complex> {
    state.state_vector().iter().copied().map(Complex::from).collect()
}

/// The classical register; one slot per register index up to the highest written.
pub fn get_classical_register(state: &QuantumState) -> Vec<u64> {
    state.classical_register().to_vec()
}

// =============================================================================
// Circuit
// =============================================================================

pub fn new_quantum_circuit(qubit_count: u32) -> QuantumCircuit {
    QuantumCircuit::new(qubit_count)
}

/// Run `circuit` against `state`. `seed` drives every measurement in the circuit.
pub fn update_quantum_state(
    circuit: &QuantumCircuit,
    state: &mut QuantumState,
    seed: u32,
) -> SimResult<()> {
    debug!(seed, gates = circuit.gate_count(), "updating quantum state");
    circuit.execute(state, Some(u64::from(seed)))
}

pub fn add_h_gate(circuit: &mut QuantumCircuit, index: u32) {
    circuit.add_h_gate(index);
}

pub fn add_x_gate(circuit: &mut QuantumCircuit, index: u32) {
    circuit.add_x_gate(index);
}

pub fn add_y_gate(circuit: &mut QuantumCircuit, index: u32) {
    circuit.add_y_gate(index);
}

pub fn add_z_gate(circuit: &mut QuantumCircuit, index: u32) {
    circuit.add_z_gate(index);
}

pub fn add_r_x_gate(circuit: &mut QuantumCircuit, index: u32, angle: f64) {
    circuit.add_rx_gate(index, angle);
}

pub fn add_r_y_gate(circuit: &mut QuantumCircuit, index: u32, angle: f64) {
    circuit.add_ry_gate(index, angle);
}

pub fn add_r_z_gate(circuit: &mut QuantumCircuit, index: u32, angle: f64) {
    circuit.add_rz_gate(index, angle);
}

pub fn add_cnot_gate(circuit: &mut QuantumCircuit, control: u32, target: u32) -> SimResult<()> {
    circuit.add_cnot_gate(control, target).map(|_| ())
}

/// Append a copy of `gate`; the caller's gate stays usable.
pub fn add_gate_copy(circuit: &mut QuantumCircuit, gate: &Gate) {
    circuit.add_gate_copy(gate);
}

// =============================================================================
// Gates
// =============================================================================

pub fn new_identity_gate(index: u32) -> Gate {
    Gate::identity(index)
}

pub fn new_h_gate(index: u32) -> Gate {
    Gate::h(index)
}

pub fn new_x_gate(index: u32) -> Gate {
    Gate::x(index)
}

pub fn new_y_gate(index: u32) -> Gate {
    Gate::y(index)
}

pub fn new_z_gate(index: u32) -> Gate {
    Gate::z(index)
}

pub fn new_r_x_gate(index: u32, angle: f64) -> Gate {
    Gate::rx(index, angle)
}

pub fn new_r_y_gate(index: u32, angle: f64) -> Gate {
    Gate::ry(index, angle)
}

pub fn new_r_z_gate(index: u32, angle: f64) -> Gate {
    Gate::rz(index, angle)
}

pub fn new_cnot_gate(control: u32, target: u32) -> SimResult<Gate> {
    Gate::cnot(control, target)
}

/// `exp(+i·angle/2·P)`; the angle is not negated.
pub fn new_pauli_rotation_gate(
    target_qubits: &[u32],
    paulis: &[Pauli],
    angle: f64,
) -> SimResult<Gate> {
    let ops: Vec<PauliOp> = paulis.iter().copied().map(PauliOp::from).collect();
    Gate::pauli_rotation(target_qubits, &ops, angle)
}

pub fn new_diagonal_matrix_gate(target_qubits: &[u32], elements: &[Complex]) -> SimResult<Gate> {
    let elements: Vec<Complex64> = elements.iter().copied().map(Complex64::from).collect();
    Gate::diagonal(target_qubits, &elements)
}

pub fn new_measurement(index: u32, reg: u32, seed: u32) -> Gate {
    Gate::measurement(index, reg, u64::from(seed))
}

/// Compose two gates: `applied_first`, then `applied_later`.
pub fn merge(applied_first: &Gate, applied_later: &Gate) -> SimResult<Gate> {
    qforge_core::merge(applied_first, applied_later)
}

// =============================================================================
// Observable
// =============================================================================

pub fn new_observable(qubit_count: u32) -> Observable {
    Observable::new(qubit_count)
}

pub fn add_operator(observable: &mut Observable, coef: Complex, pauli_string: &str) -> SimResult<()> {
    observable.add_operator(coef.into(), pauli_string)
}

pub fn get_expectation_value(observable: &Observable, state: &QuantumState) -> SimResult<Complex> {
    observable.expectation_value(state).map(Complex::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_conversions() {
        let c: Complex = 2.5.into();
        assert_eq!(c, Complex { real: 2.5, imag: 0.0 });
        let z: Complex64 = Complex { real: 1.0, imag: -2.0 }.into();
        assert_eq!(z, Complex64::new(1.0, -2.0));
        assert_eq!(Complex::from(z), Complex { real: 1.0, imag: -2.0 });
    }

    #[test]
    fn pauli_discriminants() {
        assert_eq!(Pauli::X as u32, 1);
        assert_eq!(Pauli::Z as u32, 3);
        assert_eq!(Pauli::try_from(2), Ok(Pauli::Y));
        assert_eq!(Pauli::try_from(0), Err(0));
        assert_eq!(PauliOp::from(Pauli::Y), PauliOp::Y);
    }
}
