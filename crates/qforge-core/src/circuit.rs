//! Gate sequences bound to a register width.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};
use crate::gate::{Gate, MAX_MERGE_QUBITS, merge};
use crate::state::QuantumState;

/// An ordered list of gates for a fixed number of qubits.
///
/// Gates are stored by value. Qubit indices are not checked when a gate is
/// added; an out-of-range index surfaces when the circuit is executed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuantumCircuit {
    num_qubits: u32,
    gates: Vec<Gate>,
}

impl QuantumCircuit {
    /// Create an empty circuit.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Number of qubits.
    pub fn qubit_count(&self) -> u32 {
        self.num_qubits
    }

    /// The gates, in execution order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Append a gate.
    pub fn add_gate(&mut self, gate: Gate) -> &mut Self {
        self.gates.push(gate);
        self
    }

    /// Append a copy of `gate`; the caller keeps its own value.
    pub fn add_gate_copy(&mut self, gate: &Gate) -> &mut Self {
        self.add_gate(gate.clone())
    }

    /// Remove and return the gate at `index`, `None` if out of bounds.
    pub fn remove_gate(&mut self, index: usize) -> Option<Gate> {
        (index < self.gates.len()).then(|| self.gates.remove(index))
    }

    // =========================================================================
    // Builder shortcuts
    // =========================================================================

    pub fn add_identity_gate(&mut self, target: u32) -> &mut Self {
        self.add_gate(Gate::identity(target))
    }

    pub fn add_x_gate(&mut self, target: u32) -> &mut Self {
        self.add_gate(Gate::x(target))
    }

    pub fn add_y_gate(&mut self, target: u32) -> &mut Self {
        self.add_gate(Gate::y(target))
    }

    pub fn add_z_gate(&mut self, target: u32) -> &mut Self {
        self.add_gate(Gate::z(target))
    }

    pub fn add_h_gate(&mut self, target: u32) -> &mut Self {
        self.add_gate(Gate::h(target))
    }

    pub fn add_rx_gate(&mut self, target: u32, angle: f64) -> &mut Self {
        self.add_gate(Gate::rx(target, angle))
    }

    pub fn add_ry_gate(&mut self, target: u32, angle: f64) -> &mut Self {
        self.add_gate(Gate::ry(target, angle))
    }

    pub fn add_rz_gate(&mut self, target: u32, angle: f64) -> &mut Self {
        self.add_gate(Gate::rz(target, angle))
    }

    /// Append a CNOT. Fails, leaving the circuit unchanged, if `control == target`.
    pub fn add_cnot_gate(&mut self, control: u32, target: u32) -> SimResult<&mut Self> {
        let gate = Gate::cnot(control, target)?;
        Ok(self.add_gate(gate))
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Apply every gate to `state` in order.
    ///
    /// With `seed` set, each measurement draws from a seed derived from it
    /// instead of its own, so one number reproduces the whole run. The width
    /// check happens before any gate runs; a gate failing later leaves the
    /// gates before it applied.
    #[instrument(skip(self, state), fields(num_qubits = self.num_qubits, gates = self.gates.len()))]
    pub fn execute(&self, state: &mut QuantumState, seed: Option<u64>) -> SimResult<()> {
        if state.qubit_count() != self.num_qubits {
            return Err(SimError::DimensionMismatch {
                expected: self.num_qubits,
                got: state.qubit_count(),
            });
        }

        let mut seeds = seed.map(StdRng::seed_from_u64);
        for (index, gate) in self.gates.iter().enumerate() {
            let derived = match gate {
                Gate::Measurement(_) => seeds.as_mut().map(|rng| rng.next_u64()),
                _ => None,
            };
            gate.apply_seeded(state, derived).inspect_err(|e| {
                debug!(index, gate = gate.name(), error = %e, "gate failed");
            })?;
        }
        debug!("circuit executed");
        Ok(())
    }

    /// Fuse runs of consecutive unitary gates into dense blocks.
    ///
    /// Walks the circuit once, growing the current block while the union of
    /// supports stays within `max_block_qubits` (capped at
    /// [`MAX_MERGE_QUBITS`]). Measurements end a block and are kept as they
    /// are. A block of one gate is emitted unchanged.
    pub fn merge_adjacent(&self, max_block_qubits: usize) -> SimResult<QuantumCircuit> {
        let limit = max_block_qubits.min(MAX_MERGE_QUBITS);
        let mut merged = QuantumCircuit::new(self.num_qubits);
        let mut block: Option<Gate> = None;

        for gate in &self.gates {
            if !gate.is_unitary() {
                if let Some(current) = block.take() {
                    merged.add_gate(current);
                }
                merged.add_gate_copy(gate);
                continue;
            }
            block = Some(match block.take() {
                Some(current) if support_size(&current, gate) <= limit => merge(&current, gate)?,
                Some(current) => {
                    merged.add_gate(current);
                    gate.clone()
                }
                None => gate.clone(),
            });
        }
        if let Some(current) = block {
            merged.add_gate(current);
        }

        debug!(
            before = self.gates.len(),
            after = merged.gates.len(),
            max_block_qubits = limit,
            "merged adjacent gates"
        );
        Ok(merged)
    }
}

fn support_size(a: &Gate, b: &Gate) -> usize {
    let mut qubits = a.target_qubits();
    qubits.extend(b.target_qubits());
    qubits.sort_unstable();
    qubits.dedup();
    qubits.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_builder_chain() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.add_h_gate(0).add_rx_gate(1, 0.2);
        circuit.add_cnot_gate(0, 1).unwrap().add_z_gate(1);
        assert_eq!(circuit.gate_count(), 4);
        assert_eq!(circuit.gates()[2].name(), "cx");
    }

    #[test]
    fn test_add_cnot_rejects_same_qubit() {
        let mut circuit = QuantumCircuit::new(2);
        assert!(circuit.add_cnot_gate(1, 1).is_err());
        assert_eq!(circuit.gate_count(), 0);
    }

    #[test]
    fn test_add_gate_copy_keeps_original() {
        let gate = Gate::ry(0, 1.0);
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_gate_copy(&gate).add_gate_copy(&gate);
        assert_eq!(circuit.gates(), &[gate.clone(), gate]);
    }

    #[test]
    fn test_remove_gate() {
        let mut circuit = QuantumCircuit::new(1);
        circuit.add_x_gate(0).add_h_gate(0);
        assert_eq!(circuit.remove_gate(0), Some(Gate::x(0)));
        assert_eq!(circuit.remove_gate(5), None);
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn test_execute_dimension_mismatch() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_x_gate(0);
        let mut state = QuantumState::new(2, false).unwrap();
        let err = circuit.execute(&mut state, None).unwrap_err();
        assert!(matches!(err, SimError::DimensionMismatch { expected: 3, got: 2 }));
        assert_eq!(state.state_vector()[0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_execute_partial_application() {
        let mut circuit = QuantumCircuit::new(2);
        circuit.add_x_gate(0).add_x_gate(4).add_x_gate(1);
        let mut state = QuantumState::new(2, false).unwrap();
        let err = circuit.execute(&mut state, None).unwrap_err();
        assert!(err.is_invalid_gate());
        // First X applied, last one not reached.
        assert_eq!(state.state_vector()[1], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_circuit_seed_reproducible() {
        let mut circuit = QuantumCircuit::new(4);
        for q in 0..4 {
            circuit.add_h_gate(q);
        }
        for q in 0..4 {
            circuit.add_gate(Gate::measurement(q, q, 0));
        }

        let run = |seed| {
            let mut state = QuantumState::new(4, false).unwrap();
            circuit.execute(&mut state, Some(seed)).unwrap();
            state.classical_register().to_vec()
        };
        assert_eq!(run(7), run(7));
        assert_eq!(run(7).len(), 4);
        let distinct = (0..16).map(run).collect::<std::collections::HashSet<_>>();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_merge_adjacent_blocks() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_h_gate(0).add_cnot_gate(0, 1).unwrap();
        circuit.add_rz_gate(1, 0.3);
        circuit.add_gate(Gate::measurement(1, 0, 5));
        circuit.add_x_gate(2);

        let merged = circuit.merge_adjacent(2).unwrap();
        let names: Vec<_> = merged.gates().iter().map(Gate::name).collect();
        assert_eq!(names, vec!["dense", "measure", "x"]);

        let mut a = QuantumState::new(3, false).unwrap();
        let mut b = QuantumState::new(3, false).unwrap();
        circuit.execute(&mut a, None).unwrap();
        merged.execute(&mut b, None).unwrap();
        for (x, y) in a.state_vector().iter().zip(b.state_vector()) {
            assert!((x - y).norm() < 1e-10);
        }
        assert_eq!(a.classical_register(), b.classical_register());
    }

    #[test]
    fn test_merge_adjacent_respects_limit() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_h_gate(0).add_h_gate(1).add_h_gate(2);
        let merged = circuit.merge_adjacent(1).unwrap();
        assert_eq!(merged, circuit);
    }
}
