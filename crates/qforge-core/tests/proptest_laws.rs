//! Property-based tests for the algebraic laws of the simulator.
//!
//! Random gate sequences must preserve the norm, fusing gates must not change
//! what a circuit does, and the two worker modes must agree bit for bit.

use num_complex::Complex64;
use proptest::prelude::*;
use qforge_core::{Gate, Observable, PauliOp, QuantumCircuit, QuantumState, merge};

/// Gate operations the strategies draw from.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Y(u32),
    Z(u32),
    Rx(u32, f64),
    Ry(u32, f64),
    Rz(u32, f64),
    Cnot(u32, u32),
    Zz(u32, u32, f64),
}

impl GateOp {
    fn gate(&self) -> Gate {
        match *self {
            GateOp::H(q) => Gate::h(q),
            GateOp::X(q) => Gate::x(q),
            GateOp::Y(q) => Gate::y(q),
            GateOp::Z(q) => Gate::z(q),
            GateOp::Rx(q, a) => Gate::rx(q, a),
            GateOp::Ry(q, a) => Gate::ry(q, a),
            GateOp::Rz(q, a) => Gate::rz(q, a),
            GateOp::Cnot(c, t) => Gate::cnot(c, t).unwrap(),
            GateOp::Zz(a, b, angle) => {
                Gate::pauli_rotation(&[a, b], &[PauliOp::Z, PauliOp::Z], angle).unwrap()
            }
        }
    }
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -6.3_f64..6.3
}

/// Pairs of distinct qubits below `num_qubits` (which must be at least 2).
fn arb_pair(num_qubits: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..num_qubits, 1..num_qubits).prop_map(move |(a, offset)| (a, (a + offset) % num_qubits))
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
        (0..num_qubits).prop_map(GateOp::Y),
        (0..num_qubits).prop_map(GateOp::Z),
        (0..num_qubits, arb_angle()).prop_map(|(q, a)| GateOp::Rx(q, a)),
        (0..num_qubits, arb_angle()).prop_map(|(q, a)| GateOp::Ry(q, a)),
        (0..num_qubits, arb_angle()).prop_map(|(q, a)| GateOp::Rz(q, a)),
        arb_pair(num_qubits).prop_map(|(c, t)| GateOp::Cnot(c, t)),
        (arb_pair(num_qubits), arb_angle()).prop_map(|((a, b), t)| GateOp::Zz(a, b, t)),
    ]
}

/// A width between 2 and 6 together with 1-12 gates on it.
fn arb_circuit() -> impl Strategy<Value = (u32, Vec<GateOp>)> {
    (2_u32..=6).prop_flat_map(|n| (Just(n), prop::collection::vec(arb_gate_op(n), 1..=12)))
}

fn build(num_qubits: u32, ops: &[GateOp]) -> QuantumCircuit {
    let mut circuit = QuantumCircuit::new(num_qubits);
    for op in ops {
        circuit.add_gate(op.gate());
    }
    circuit
}

fn max_distance(a: &QuantumState, b: &QuantumState) -> f64 {
    a.state_vector()
        .iter()
        .zip(b.state_vector())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unitary_sequences_preserve_norm((n, ops) in arb_circuit(), seed in any::<u64>()) {
        let mut state = QuantumState::new(n, false).unwrap();
        state.set_haar_random_state(seed);
        build(n, &ops).execute(&mut state, None).unwrap();
        prop_assert!((state.norm_squared() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn merge_matches_sequential(
        (n, ops) in arb_circuit().prop_filter("two gates", |(_, ops)| ops.len() >= 2),
        seed in any::<u64>(),
    ) {
        let first = ops[0].gate();
        let second = ops[1].gate();
        let merged = merge(&first, &second).unwrap();

        let mut expected = QuantumState::new(n, false).unwrap();
        expected.set_haar_random_state(seed);
        let mut actual = expected.clone();
        first.apply(&mut expected).unwrap();
        second.apply(&mut expected).unwrap();
        merged.apply(&mut actual).unwrap();
        prop_assert!(max_distance(&expected, &actual) < 1e-10);
    }

    #[test]
    fn merge_adjacent_preserves_semantics(
        (n, ops) in arb_circuit(),
        block in 1_usize..=4,
        seed in any::<u64>(),
    ) {
        let circuit = build(n, &ops);
        let fused = circuit.merge_adjacent(block).unwrap();
        prop_assert!(fused.gate_count() <= circuit.gate_count());

        let mut expected = QuantumState::new(n, false).unwrap();
        expected.set_haar_random_state(seed);
        let mut actual = expected.clone();
        circuit.execute(&mut expected, None).unwrap();
        fused.execute(&mut actual, None).unwrap();
        prop_assert!(max_distance(&expected, &actual) < 1e-9);
    }

    #[test]
    fn rotation_then_inverse_is_identity(
        target in 0_u32..4,
        angle in arb_angle(),
        axis in 0_usize..3,
        seed in any::<u64>(),
    ) {
        let make = |a: f64| match axis {
            0 => Gate::rx(target, a),
            1 => Gate::ry(target, a),
            _ => Gate::rz(target, a),
        };
        let mut state = QuantumState::new(4, false).unwrap();
        state.set_haar_random_state(seed);
        let original = state.clone();
        make(angle).apply(&mut state).unwrap();
        make(-angle).apply(&mut state).unwrap();
        prop_assert!(max_distance(&state, &original) < 1e-10);
    }

    #[test]
    fn worker_modes_are_bit_identical((n, ops) in arb_circuit(), seed in any::<u64>()) {
        let circuit = build(n, &ops);
        let mut single = QuantumState::new(n, false).unwrap();
        let mut multi = QuantumState::new(n, true).unwrap();
        single.set_haar_random_state(seed);
        multi.set_haar_random_state(seed);
        circuit.execute(&mut single, None).unwrap();
        circuit.execute(&mut multi, None).unwrap();
        prop_assert_eq!(single.state_vector(), multi.state_vector());
        prop_assert_eq!(single.sample(16, seed), multi.sample(16, seed));

        let mut obs = Observable::new(n);
        obs.add_operator(Complex64::new(1.0, 0.0), "Z 0 X 1").unwrap();
        prop_assert_eq!(
            obs.expectation_value(&single).unwrap(),
            obs.expectation_value(&multi).unwrap()
        );
    }

    #[test]
    fn sampling_is_seed_deterministic(seed in any::<u64>(), state_seed in any::<u64>()) {
        let mut state = QuantumState::new(3, false).unwrap();
        state.set_haar_random_state(state_seed);
        let samples = state.sample(32, seed);
        prop_assert_eq!(&samples, &state.sample(32, seed));
        prop_assert!(samples.iter().all(|&s| s < 8));
    }
}
