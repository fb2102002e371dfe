//! Matrix forms of gates.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use super::{Gate, MAX_MERGE_QUBITS};
use super::params::DenseMatrix;
use crate::error::{SimError, SimResult};
use crate::state::{PauliMasks, gather_bits, scatter_bits};

pub(crate) type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

pub(crate) const IDENTITY: Matrix2 = [[ONE, ZERO], [ZERO, ONE]];
pub(crate) const PAULI_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];
pub(crate) const PAULI_Y: Matrix2 = [[ZERO, Complex64::new(0.0, -1.0)], [I, ZERO]];
pub(crate) const PAULI_Z: Matrix2 = [[ONE, ZERO], [ZERO, Complex64::new(-1.0, 0.0)]];
pub(crate) const HADAMARD: Matrix2 = [
    [Complex64::new(FRAC_1_SQRT_2, 0.0), Complex64::new(FRAC_1_SQRT_2, 0.0)],
    [Complex64::new(FRAC_1_SQRT_2, 0.0), Complex64::new(-FRAC_1_SQRT_2, 0.0)],
];

// Rotation matrices take the generator angle φ and return exp(+i·φ/2·P).

pub(crate) fn rx_matrix(phi: f64) -> Matrix2 {
    let c = Complex64::new((phi / 2.0).cos(), 0.0);
    let is = Complex64::new(0.0, (phi / 2.0).sin());
    [[c, is], [is, c]]
}

pub(crate) fn ry_matrix(phi: f64) -> Matrix2 {
    let c = Complex64::new((phi / 2.0).cos(), 0.0);
    let s = Complex64::new((phi / 2.0).sin(), 0.0);
    [[c, s], [-s, c]]
}

pub(crate) fn rz_phases(phi: f64) -> (Complex64, Complex64) {
    (
        Complex64::from_polar(1.0, phi / 2.0),
        Complex64::from_polar(1.0, -phi / 2.0),
    )
}

fn rz_matrix(phi: f64) -> Matrix2 {
    let (d0, d1) = rz_phases(phi);
    [[d0, ZERO], [ZERO, d1]]
}

fn to_array(m: &Matrix2) -> Array2<Complex64> {
    Array2::from_shape_fn((2, 2), |(r, c)| m[r][c])
}

pub(crate) fn to_matrix2(m: &Array2<Complex64>) -> Matrix2 {
    [[m[[0, 0]], m[[0, 1]]], [m[[1, 0]], m[[1, 1]]]]
}

impl Gate {
    /// The 2×2 matrix of a single-qubit unitary, `None` for every other gate.
    pub(crate) fn single_qubit_matrix(&self) -> Option<Matrix2> {
        match self {
            Gate::Identity { .. } => Some(IDENTITY),
            Gate::PauliX { .. } => Some(PAULI_X),
            Gate::PauliY { .. } => Some(PAULI_Y),
            Gate::PauliZ { .. } => Some(PAULI_Z),
            Gate::Hadamard { .. } => Some(HADAMARD),
            Gate::RotationX(r) => Some(rx_matrix(r.generator_angle())),
            Gate::RotationY(r) => Some(ry_matrix(r.generator_angle())),
            Gate::RotationZ(r) => Some(rz_matrix(r.generator_angle())),
            _ => None,
        }
    }

    /// Dense matrix over [`target_qubits`](Gate::target_qubits), bit j of the
    /// row/column index standing for the j-th target.
    ///
    /// `None` for measurements, which have no unitary form, and for gates on
    /// more than [`MAX_MERGE_QUBITS`] qubits.
    pub fn unitary(&self) -> Option<DenseMatrix> {
        let targets = self.target_qubits();
        if targets.len() > MAX_MERGE_QUBITS {
            return None;
        }
        if let Some(m) = self.single_qubit_matrix() {
            return Some(DenseMatrix::from_parts(targets, to_array(&m)));
        }

        let matrix = match self {
            Gate::Cnot { .. } => {
                // bit 0 = control, bit 1 = target
                let mut m = Array2::eye(4);
                m[[1, 1]] = ZERO;
                m[[3, 3]] = ZERO;
                m[[1, 3]] = ONE;
                m[[3, 1]] = ONE;
                m
            }
            Gate::PauliRotation(p) => {
                let dim = 1usize << p.targets().len();
                let masks = PauliMasks::from_ops(&p.local_ops());
                let (c, s) = ((p.angle() / 2.0).cos(), (p.angle() / 2.0).sin());
                let mut m = Array2::from_diag_elem(dim, Complex64::new(c, 0.0));
                for col in 0..dim {
                    m[[col ^ masks.flip, col]] += I * s * masks.coefficient(col);
                }
                m
            }
            Gate::DiagonalMatrix(d) => Array2::from_diag(&ndarray::arr1(d.elements())),
            Gate::Merged(dense) => dense.matrix().clone(),
            _ => return None,
        };
        Some(DenseMatrix::from_parts(targets, matrix))
    }
}

impl DenseMatrix {
    /// Embed this matrix into the larger `support`, acting as identity on
    /// the extra qubits. `support` must contain every target.
    pub(crate) fn embed(&self, support: &[u32]) -> SimResult<Array2<Complex64>> {
        let positions = self
            .targets()
            .iter()
            .map(|t| {
                support
                    .iter()
                    .position(|s| s == t)
                    .map(|p| p as u32)
                    .ok_or_else(|| {
                        SimError::UnsupportedMerge(format!("qubit {t} is missing from the support"))
                    })
            })
            .collect::<SimResult<Vec<u32>>>()?;

        let own_mask = scatter_bits(usize::MAX, &positions);
        let dim = 1usize << support.len();
        let matrix = self.matrix();
        Ok(Array2::from_shape_fn((dim, dim), |(r, c)| {
            if (r & !own_mask) != (c & !own_mask) {
                ZERO
            } else {
                matrix[[gather_bits(r, &positions), gather_bits(c, &positions)]]
            }
        }))
    }
}
