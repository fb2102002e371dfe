//! Amplitude kernels.
//!
//! Every kernel works on aligned blocks of `2^(k+1)` amplitudes, `k` being
//! the highest qubit it touches. Within a block the local index carries the
//! same low bits as the global basis index, so the kernels never need to
//! know where their block starts. Callers validate qubit indices first.

use ndarray::Array2;
use num_complex::Complex64;

use super::QuantumState;
use crate::observable::PauliOp;

/// Bit masks describing the action of a Pauli string on basis states.
///
/// For a string `P` with `n_Y` Y factors,
/// `P|i⟩ = i^{n_Y} · (-1)^{popcount(i & phase)} · |i ^ flip⟩`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PauliMasks {
    /// Qubits carrying X or Y.
    pub flip: usize,
    /// Qubits carrying Y or Z.
    pub phase: usize,
    y_count: u32,
    /// Highest non-identity qubit.
    pub max_qubit: Option<u32>,
}

impl PauliMasks {
    pub(crate) fn from_ops<'a>(ops: impl IntoIterator<Item = &'a (u32, PauliOp)>) -> Self {
        let mut masks = Self {
            flip: 0,
            phase: 0,
            y_count: 0,
            max_qubit: None,
        };
        for &(qubit, op) in ops {
            let bit = 1usize << qubit;
            match op {
                PauliOp::I => continue,
                PauliOp::X => masks.flip |= bit,
                PauliOp::Y => {
                    masks.flip |= bit;
                    masks.phase |= bit;
                    masks.y_count += 1;
                }
                PauliOp::Z => masks.phase |= bit,
            }
            masks.max_qubit = masks.max_qubit.max(Some(qubit));
        }
        masks
    }

    /// `i^{n_Y}`.
    fn global_phase(&self) -> Complex64 {
        match self.y_count % 4 {
            0 => Complex64::new(1.0, 0.0),
            1 => Complex64::new(0.0, 1.0),
            2 => Complex64::new(-1.0, 0.0),
            _ => Complex64::new(0.0, -1.0),
        }
    }

    /// Coefficient of `|i ^ flip⟩` in `P|i⟩`.
    #[inline]
    pub(crate) fn coefficient(&self, index: usize) -> Complex64 {
        let sign = if (index & self.phase).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        self.global_phase() * sign
    }
}

/// Collect the bits of `index` at `qubits` into a dense local index (bit j ↔ `qubits[j]`).
#[inline]
pub(crate) fn gather_bits(index: usize, qubits: &[u32]) -> usize {
    qubits
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &q)| acc | (((index >> q) & 1) << j))
}

/// Inverse of [`gather_bits`]: spread local bit j onto bit `qubits[j]`.
#[inline]
pub(crate) fn scatter_bits(local: usize, qubits: &[u32]) -> usize {
    qubits
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &q)| acc | (((local >> j) & 1) << q))
}

fn block_bits(qubits: &[u32]) -> u32 {
    qubits.iter().max().map_or(0, |&q| q + 1)
}

impl QuantumState {
    /// Apply a 2×2 matrix to `target`.
    pub(crate) fn apply_single_qubit(&mut self, target: u32, m: [[Complex64; 2]; 2]) {
        let stride = 1usize << target;
        self.for_each_block(target + 1, move |block| {
            let (lo, hi) = block.split_at_mut(stride);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let (x, y) = (*a, *b);
                *a = m[0][0] * x + m[0][1] * y;
                *b = m[1][0] * x + m[1][1] * y;
            }
        });
    }

    /// Bit flip on `target`.
    pub(crate) fn apply_x(&mut self, target: u32) {
        let stride = 1usize << target;
        self.for_each_block(target + 1, move |block| {
            let (lo, hi) = block.split_at_mut(stride);
            lo.swap_with_slice(hi);
        });
    }

    /// `diag(d0, d1)` on `target`.
    pub(crate) fn apply_single_diagonal(&mut self, target: u32, d0: Complex64, d1: Complex64) {
        let stride = 1usize << target;
        self.for_each_block(target + 1, move |block| {
            let (lo, hi) = block.split_at_mut(stride);
            lo.iter_mut().for_each(|a| *a *= d0);
            hi.iter_mut().for_each(|a| *a *= d1);
        });
    }

    pub(crate) fn apply_cnot(&mut self, control: u32, target: u32) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        self.for_each_block(control.max(target) + 1, move |block| {
            for i in 0..block.len() {
                if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                    block.swap(i, i | tgt_mask);
                }
            }
        });
    }

    /// Multiply each amplitude by `diagonal[local]`, `local` gathered from `targets`.
    pub(crate) fn apply_diagonal(&mut self, targets: &[u32], diagonal: &[Complex64]) {
        self.for_each_block(block_bits(targets), |block| {
            for (i, amp) in block.iter_mut().enumerate() {
                *amp *= diagonal[gather_bits(i, targets)];
            }
        });
    }

    /// Apply a dense `2^k × 2^k` matrix whose local bit j acts on `targets[j]`.
    pub(crate) fn apply_dense(&mut self, targets: &[u32], matrix: &Array2<Complex64>) {
        let mask = scatter_bits(usize::MAX, targets);
        let offsets: Vec<usize> = (0..1usize << targets.len())
            .map(|local| scatter_bits(local, targets))
            .collect();
        let offsets = &offsets;

        self.for_each_block(block_bits(targets), move |block| {
            let mut buffer = vec![Complex64::new(0.0, 0.0); offsets.len()];
            for base in (0..block.len()).filter(|base| base & mask == 0) {
                for (slot, &off) in buffer.iter_mut().zip(offsets) {
                    *slot = block[base | off];
                }
                for (row, &off) in offsets.iter().enumerate() {
                    block[base | off] = matrix
                        .row(row)
                        .iter()
                        .zip(&buffer)
                        .map(|(m, v)| m * v)
                        .sum();
                }
            }
        });
    }

    /// `exp(+i·angle/2·P)`.
    pub(crate) fn apply_pauli_rotation(&mut self, masks: PauliMasks, angle: f64) {
        let (c, s) = ((angle / 2.0).cos(), (angle / 2.0).sin());
        let i_s = Complex64::new(0.0, s);

        let Some(max_qubit) = masks.max_qubit else {
            let phase = Complex64::new(c, s);
            self.for_each_amplitude(move |_, amp| *amp *= phase);
            return;
        };

        self.for_each_block(max_qubit + 1, move |block| {
            if masks.flip == 0 {
                for (i, amp) in block.iter_mut().enumerate() {
                    *amp *= c + i_s * masks.coefficient(i);
                }
                return;
            }
            for i in 0..block.len() {
                let j = i ^ masks.flip;
                if i < j {
                    let (a, b) = (block[i], block[j]);
                    block[i] = c * a + i_s * masks.coefficient(j) * b;
                    block[j] = c * b + i_s * masks.coefficient(i) * a;
                }
            }
        });
    }

    /// Project `target` onto `outcome` and rescale by `1/sqrt(probability)`.
    ///
    /// A zero `probability` leaves the kept half unscaled.
    pub(crate) fn project(&mut self, target: u32, outcome: u64, probability: f64) {
        let stride = 1usize << target;
        let scale = if probability > 0.0 { 1.0 / probability.sqrt() } else { 1.0 };
        self.for_each_block(target + 1, move |block| {
            let (lo, hi) = block.split_at_mut(stride);
            let (keep, discard) = if outcome == 0 { (lo, hi) } else { (hi, lo) };
            keep.iter_mut().for_each(|a| *a *= scale);
            discard.fill(Complex64::new(0.0, 0.0));
        });
    }

    /// `⟨bra|P|self⟩` without touching either state.
    pub(crate) fn pauli_transition(&self, bra: &[Complex64], masks: PauliMasks) -> Complex64 {
        let ket = self.state_vector();
        self.reduce(|range| {
            range
                .map(|i| bra[i ^ masks.flip].conj() * masks.coefficient(i) * ket[i])
                .sum()
        })
    }
}
