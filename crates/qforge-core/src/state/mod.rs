//! Statevector storage.
//!
//! A [`QuantumState`] owns `2^n` complex amplitudes together with the
//! classical register that measurement gates write into. Qubit `q`
//! corresponds to bit `q` of the basis-state index, so qubit 0 is the
//! least significant bit.
//!
//! # Worker modes
//!
//! [`WorkerMode::Multi`] runs amplitude kernels on the rayon thread pool.
//! Kernels split the vector into independent blocks of `2^(k+1)` amplitudes,
//! where `k` is the highest qubit a gate touches, so every amplitude sees
//! exactly the same arithmetic in both modes. Reductions (norms,
//! probabilities, expectation values) always sum fixed-size blocks and then
//! combine the partial sums in order, which makes them bit-identical across
//! modes as well.
//!
//! The amplitudes live in one shared-memory vector in both modes, so reading
//! the statevector never needs a gather step.

mod kernels;

pub(crate) use kernels::{PauliMasks, gather_bits, scatter_bits};

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use std::ops::Range;
use tracing::{debug, trace};

use crate::config::{DEFAULT_MAX_QUBITS, HARD_MAX_QUBITS, SimConfig};
use crate::error::{SimError, SimResult};

/// Number of amplitudes summed sequentially before partial sums are combined.
const REDUCTION_BLOCK: usize = 1 << 12;

/// How amplitude kernels are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerMode {
    /// Every kernel runs on the calling thread.
    #[default]
    Single,
    /// Kernels are spread over the rayon thread pool.
    Multi,
}

impl WorkerMode {
    /// Map the boundary flag onto a mode.
    pub fn from_flag(multi_worker: bool) -> Self {
        if multi_worker { Self::Multi } else { Self::Single }
    }
}

/// A pure `n`-qubit quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    num_qubits: u32,
    amplitudes: Vec<Complex64>,
    classical_register: Vec<u64>,
    mode: WorkerMode,
}

impl QuantumState {
    /// Allocate a state in |0...0⟩ with the default qubit cap.
    pub fn new(num_qubits: u32, multi_worker: bool) -> SimResult<Self> {
        Self::allocate(num_qubits, WorkerMode::from_flag(multi_worker), DEFAULT_MAX_QUBITS)
    }

    /// Allocate a state in |0...0⟩ using the cap and worker mode from `config`.
    pub fn with_config(num_qubits: u32, config: &SimConfig) -> SimResult<Self> {
        Self::allocate(
            num_qubits,
            WorkerMode::from_flag(config.multi_worker),
            config.max_qubits.min(HARD_MAX_QUBITS),
        )
    }

    fn allocate(num_qubits: u32, mode: WorkerMode, max_qubits: u32) -> SimResult<Self> {
        if num_qubits > max_qubits {
            return Err(SimError::Allocation {
                qubits: num_qubits,
                reason: format!("exceeds the limit of {max_qubits} qubits"),
            });
        }
        let dim = 1usize
            .checked_shl(num_qubits)
            .ok_or_else(|| SimError::Allocation {
                qubits: num_qubits,
                reason: "dimension overflows the address space".to_string(),
            })?;

        let mut amplitudes = Vec::new();
        amplitudes
            .try_reserve_exact(dim)
            .map_err(|e| SimError::Allocation {
                qubits: num_qubits,
                reason: e.to_string(),
            })?;
        amplitudes.resize(dim, Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);

        debug!(num_qubits, ?mode, "allocated statevector");
        Ok(Self {
            num_qubits,
            amplitudes,
            classical_register: Vec::new(),
            mode,
        })
    }

    /// Number of qubits.
    pub fn qubit_count(&self) -> u32 {
        self.num_qubits
    }

    /// Number of amplitudes, `2^qubit_count`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// The worker mode selected at construction.
    pub fn worker_mode(&self) -> WorkerMode {
        self.mode
    }

    // =========================================================================
    // Initialisation
    // =========================================================================

    /// Reset to |0...0⟩. The classical register is left untouched.
    pub fn set_zero_state(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    /// Reset to the computational basis state `index`.
    pub fn set_computational_basis(&mut self, index: u64) -> SimResult<()> {
        let index = usize::try_from(index)
            .ok()
            .filter(|&i| i < self.dim())
            .ok_or_else(|| {
                SimError::InvalidState(format!(
                    "basis index {index} out of range for {} qubits",
                    self.num_qubits
                ))
            })?;
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(())
    }

    /// Draw a Haar-random state, deterministic in `seed`.
    ///
    /// Real and imaginary parts are i.i.d. standard normal; normalising such a
    /// vector yields the unitarily invariant measure on the unit sphere.
    /// Amplitudes are generated sequentially in both worker modes so the same
    /// seed always produces the same state.
    pub fn set_haar_random_state(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for amp in &mut self.amplitudes {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            *amp = Complex64::new(re, im);
        }
        self.normalize();
        trace!(seed, "drew Haar-random state");
    }

    /// Replace the amplitudes with `amplitudes`, which must have length `2^n`.
    ///
    /// The vector is taken as given; call [`normalize`](Self::normalize) if it
    /// is not already a unit vector.
    pub fn load(&mut self, amplitudes: &[Complex64]) -> SimResult<()> {
        if amplitudes.len() != self.dim() {
            return Err(SimError::InvalidState(format!(
                "expected {} amplitudes, got {}",
                self.dim(),
                amplitudes.len()
            )));
        }
        self.amplitudes.copy_from_slice(amplitudes);
        Ok(())
    }

    // =========================================================================
    // Read-back
    // =========================================================================

    /// The current amplitudes.
    pub fn state_vector(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Outcomes recorded by measurement gates, indexed by register slot.
    ///
    /// The register is as long as the highest slot written plus one; slots that
    /// were never written read as 0.
    pub fn classical_register(&self) -> &[u64] {
        &self.classical_register
    }

    /// Value of one register slot, `None` if it was never written.
    pub fn classical_value(&self, index: usize) -> Option<u64> {
        self.classical_register.get(index).copied()
    }

    /// Write one register slot, growing the register as needed.
    pub fn set_classical_value(&mut self, index: usize, value: u64) {
        if index >= self.classical_register.len() {
            self.classical_register.resize(index + 1, 0);
        }
        self.classical_register[index] = value;
    }

    /// `Σ |a_i|²`.
    pub fn norm_squared(&self) -> f64 {
        self.reduce(|range| self.amplitudes[range].iter().map(|a| a.norm_sqr()).sum())
    }

    /// Rescale to unit norm. A zero vector is left as is.
    pub fn normalize(&mut self) {
        let norm = self.norm_squared().sqrt();
        if norm > 0.0 {
            let scale = 1.0 / norm;
            self.for_each_amplitude(|_, amp| *amp *= scale);
        }
    }

    /// Probability that measuring `qubit` yields 0.
    pub fn zero_probability(&self, qubit: u32) -> SimResult<f64> {
        self.check_qubit("zero_probability", qubit)?;
        let mask = 1usize << qubit;
        Ok(self.reduce(|range| {
            range
                .filter(|i| i & mask == 0)
                .map(|i| self.amplitudes[i].norm_sqr())
                .sum()
        }))
    }

    /// `|a_i|²` for every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// `⟨self|other⟩`.
    pub fn inner_product(&self, other: &QuantumState) -> SimResult<Complex64> {
        if other.num_qubits != self.num_qubits {
            return Err(SimError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        Ok(self.reduce(|range| {
            self.amplitudes[range.clone()]
                .iter()
                .zip(&other.amplitudes[range])
                .map(|(a, b)| a.conj() * b)
                .sum()
        }))
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Draw `count` basis-state indices from the `|a_i|²` distribution.
    ///
    /// Builds the cumulative distribution once and answers each draw with a
    /// binary search. The sequence depends only on the amplitudes and `seed`.
    pub fn sample(&self, count: usize, seed: u64) -> Vec<u64> {
        let mut cumulative = Vec::with_capacity(self.dim());
        let mut total = 0.0;
        for amp in &self.amplitudes {
            total += amp.norm_sqr();
            cumulative.push(total);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let last = self.dim() - 1;
        let samples = (0..count)
            .map(|_| {
                let r: f64 = rng.r#gen::<f64>() * total;
                let index = cumulative.partition_point(|&p| p <= r).min(last);
                index as u64
            })
            .collect();
        trace!(count, seed, "sampled statevector");
        samples
    }

    // =========================================================================
    // Internal scheduling helpers
    // =========================================================================

    /// Fail with [`SimError::QubitOutOfRange`] if `qubit` is not part of this state.
    pub(crate) fn check_qubit(&self, gate: &'static str, qubit: u32) -> SimResult<()> {
        if qubit >= self.num_qubits {
            return Err(SimError::QubitOutOfRange {
                gate,
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Run `op` on every aligned block of `2^block_bits` amplitudes.
    ///
    /// `block_bits` must not exceed `qubit_count`.
    pub(crate) fn for_each_block<F>(&mut self, block_bits: u32, op: F)
    where
        F: Fn(&mut [Complex64]) + Send + Sync,
    {
        let block = 1usize << block_bits;
        match self.mode {
            WorkerMode::Single => self.amplitudes.chunks_mut(block).for_each(op),
            WorkerMode::Multi => self.amplitudes.par_chunks_mut(block).for_each(op),
        }
    }

    /// Run `op` on every amplitude together with its basis index.
    pub(crate) fn for_each_amplitude<F>(&mut self, op: F)
    where
        F: Fn(usize, &mut Complex64) + Send + Sync,
    {
        match self.mode {
            WorkerMode::Single => self
                .amplitudes
                .iter_mut()
                .enumerate()
                .for_each(|(i, a)| op(i, a)),
            WorkerMode::Multi => self
                .amplitudes
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, a)| op(i, a)),
        }
    }

    /// Sum `op` over fixed index blocks, combining the partial sums in order.
    pub(crate) fn reduce<T, F>(&self, op: F) -> T
    where
        T: Send + std::iter::Sum<T>,
        F: Fn(Range<usize>) -> T + Send + Sync,
    {
        let block = REDUCTION_BLOCK.min(self.dim());
        let n_blocks = self.dim() / block;
        let span = |b: usize| b * block..(b + 1) * block;
        let partials: Vec<T> = match self.mode {
            WorkerMode::Single => (0..n_blocks).map(|b| op(span(b))).collect(),
            WorkerMode::Multi => (0..n_blocks).into_par_iter().map(|b| op(span(b))).collect(),
        };
        partials.into_iter().sum()
    }
}
