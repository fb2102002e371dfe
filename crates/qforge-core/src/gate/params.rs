//! Payloads of the parameterised gate variants.
//!
//! Each payload validates itself on construction, so a value of these types
//! is always well formed apart from its relation to a particular state.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::observable::PauliOp;

/// Turn a caller-facing rotation angle into the angle the kernels expect.
///
/// Rotation kernels apply `exp(+i·φ/2·P)`, while gates expose the usual
/// `R(θ) = exp(-i·θ/2·P)`, hence `φ = -θ`. This is the only place the sign
/// changes.
#[inline]
fn to_generator_angle(angle: f64) -> f64 {
    -angle
}

fn ensure_distinct(gate: &'static str, qubits: &[u32]) -> SimResult<()> {
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(SimError::invalid_gate(
                gate,
                format!("qubit {q} appears more than once"),
            ));
        }
    }
    Ok(())
}

/// Target and angle of a single-axis rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    target: u32,
    generator_angle: f64,
}

impl Rotation {
    /// Rotation of `target` by `angle` (radians, `exp(-i·angle/2·P)` convention).
    pub fn new(target: u32, angle: f64) -> Self {
        Self {
            target,
            generator_angle: to_generator_angle(angle),
        }
    }

    /// The rotated qubit.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// The angle as supplied by the caller.
    pub fn angle(&self) -> f64 {
        -self.generator_angle
    }

    /// The sign-flipped angle handed to the kernels.
    pub fn generator_angle(&self) -> f64 {
        self.generator_angle
    }
}

/// `exp(+i·angle/2·P)` for a multi-qubit Pauli string `P`.
///
/// Unlike [`Rotation`], the angle is used as given.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliRotation {
    targets: Vec<u32>,
    paulis: Vec<PauliOp>,
    angle: f64,
}

impl PauliRotation {
    pub fn new(targets: &[u32], paulis: &[PauliOp], angle: f64) -> SimResult<Self> {
        if targets.is_empty() {
            return Err(SimError::invalid_gate("pauli_rotation", "no target qubits"));
        }
        if targets.len() != paulis.len() {
            return Err(SimError::invalid_gate(
                "pauli_rotation",
                format!(
                    "{} target qubits but {} Pauli operators",
                    targets.len(),
                    paulis.len()
                ),
            ));
        }
        ensure_distinct("pauli_rotation", targets)?;
        Ok(Self {
            targets: targets.to_vec(),
            paulis: paulis.to_vec(),
            angle,
        })
    }

    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    pub fn paulis(&self) -> &[PauliOp] {
        &self.paulis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// (qubit, op) pairs on the global register.
    pub(crate) fn ops(&self) -> Vec<(u32, PauliOp)> {
        self.targets.iter().copied().zip(self.paulis.iter().copied()).collect()
    }

    /// (local bit, op) pairs, local bit j standing for `targets[j]`.
    pub(crate) fn local_ops(&self) -> Vec<(u32, PauliOp)> {
        (0u32..).zip(self.paulis.iter().copied()).collect()
    }
}

/// A diagonal unitary (or scaling) on `k` qubits given by its `2^k` entries.
///
/// Bit j of an entry's index is the value of `targets[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalMatrix {
    targets: Vec<u32>,
    elements: Vec<Complex64>,
}

impl DiagonalMatrix {
    pub fn new(targets: &[u32], elements: &[Complex64]) -> SimResult<Self> {
        if targets.is_empty() {
            return Err(SimError::invalid_gate("diagonal", "no target qubits"));
        }
        ensure_distinct("diagonal", targets)?;
        let expected = 1usize
            .checked_shl(targets.len() as u32)
            .filter(|&n| n == elements.len());
        if expected.is_none() {
            return Err(SimError::invalid_gate(
                "diagonal",
                format!(
                    "{} target qubits need 2^{} entries, got {}",
                    targets.len(),
                    targets.len(),
                    elements.len()
                ),
            ));
        }
        Ok(Self {
            targets: targets.to_vec(),
            elements: elements.to_vec(),
        })
    }

    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    pub fn elements(&self) -> &[Complex64] {
        &self.elements
    }
}

/// Projective Z-basis measurement of one qubit into a classical register slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measurement {
    pub target: u32,
    pub register: u32,
    /// Seed of the outcome draw; replaced by a derived seed when the enclosing
    /// circuit is executed with a circuit-level seed.
    pub seed: u64,
}

/// A dense `2^k × 2^k` matrix on `k` qubits. Merged gates use this form.
///
/// Row and column bit j refer to `targets[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    targets: Vec<u32>,
    matrix: Array2<Complex64>,
}

impl DenseMatrix {
    pub fn new(targets: &[u32], matrix: Array2<Complex64>) -> SimResult<Self> {
        ensure_distinct("dense", targets)?;
        let dim = 1usize.checked_shl(targets.len() as u32).unwrap_or(0);
        if dim == 0 || matrix.dim() != (dim, dim) {
            return Err(SimError::invalid_gate(
                "dense",
                format!(
                    "{} target qubits need a {dim}x{dim} matrix, got {:?}",
                    targets.len(),
                    matrix.dim()
                ),
            ));
        }
        Ok(Self {
            targets: targets.to_vec(),
            matrix,
        })
    }

    pub(crate) fn from_parts(targets: Vec<u32>, matrix: Array2<Complex64>) -> Self {
        Self { targets, matrix }
    }

    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }
}
