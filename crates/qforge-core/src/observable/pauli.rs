//! Pauli strings.
//!
//! A Pauli string is a tensor product of single-qubit Pauli operators on
//! named qubits, written textually as `"X 0 Y 1 Z 3"`. Qubits that are not
//! listed act as the identity.
//!
//! # Example
//!
//! ```rust
//! use qforge_core::observable::{PauliOp, PauliString};
//!
//! let ps: PauliString = "Z 3 x 0 Y1".parse().unwrap();
//! assert_eq!(ps.ops(), &[(0, PauliOp::X), (1, PauliOp::Y), (3, PauliOp::Z)]);
//! assert_eq!(ps.to_string(), "X 0 Y 1 Z 3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SimError, SimResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity; dropped from strings.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Parse a single operator letter (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Self::I),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// The operator letter.
    pub fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }
}

impl fmt::Display for PauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with identity factors
/// omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// Construct a PauliString from (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    /// Fails if a qubit appears twice.
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> SimResult<Self> {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        if let Some(w) = v.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SimError::parse(
                &Self::render(&v),
                format!("qubit {} appears more than once", w[0].0),
            ));
        }
        Ok(Self { ops: v })
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// True if there are no non-identity operators.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    fn render(ops: &[(u32, PauliOp)]) -> String {
        ops.iter()
            .map(|(q, op)| format!("{op} {q}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse `s`, also returning the highest qubit index it names.
    ///
    /// Identity factors are dropped from the string but still count towards
    /// the returned index, so callers can range-check every index written.
    pub(crate) fn parse_indexed(s: &str) -> SimResult<(Self, Option<u32>)> {
        let mut ops = Vec::new();
        let mut seen: Vec<u32> = Vec::new();
        let mut tokens = s.split_whitespace();

        while let Some(token) = tokens.next() {
            let mut chars = token.chars();
            let letter = chars.next().unwrap_or_default();
            let op = PauliOp::from_char(letter)
                .ok_or_else(|| SimError::parse(s, format!("unknown Pauli operator '{letter}'")))?;

            let inline = chars.as_str();
            let index = if inline.is_empty() {
                tokens
                    .next()
                    .ok_or_else(|| SimError::parse(s, format!("operator '{letter}' has no qubit index")))?
            } else {
                inline
            };
            let qubit: u32 = index
                .parse()
                .map_err(|_| SimError::parse(s, format!("'{index}' is not a qubit index")))?;

            if seen.contains(&qubit) {
                return Err(SimError::parse(s, format!("qubit {qubit} appears more than once")));
            }
            seen.push(qubit);
            ops.push((qubit, op));
        }

        Ok((Self::from_ops(ops)?, seen.into_iter().max()))
    }
}

impl FromStr for PauliString {
    type Err = SimError;

    /// Accepts `"X 0 Y 1"` as well as the compact `"X0 Y1"`.
    fn from_str(s: &str) -> SimResult<Self> {
        Self::parse_indexed(s).map(|(pauli, _)| pauli)
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::render(&self.ops))
    }
}
