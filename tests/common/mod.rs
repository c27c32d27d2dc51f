//! Shared gate type and proptest generators for integration tests and benches.
#![allow(dead_code)]

use metaop::fingerprint::Canonicalizable;
use metaop::AtomicOperation;
use proptest::collection::vec;
use proptest::prelude::*;

// ============================================================================
// Gate
// ============================================================================

/// A named gate on one or more qubits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gate {
    pub name: &'static str,
    pub qubits: Vec<u32>,
}

impl AtomicOperation for Gate {
    type Resource = u32;

    fn resources(&self) -> &[u32] {
        &self.qubits
    }
}

impl Canonicalizable for Gate {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);
        for q in &self.qubits {
            out.extend_from_slice(&q.to_le_bytes());
        }
        out
    }
}

pub fn h(q: u32) -> Gate {
    Gate { name: "H", qubits: vec![q] }
}

pub fn x(q: u32) -> Gate {
    Gate { name: "X", qubits: vec![q] }
}

pub fn cnot(control: u32, target: u32) -> Gate {
    Gate {
        name: "CNOT",
        qubits: vec![control, target],
    }
}

pub fn cz(a: u32, b: u32) -> Gate {
    Gate {
        name: "CZ",
        qubits: vec![a, b],
    }
}

/// `H(q) CZ(q, 0)` for each `q` in `qubits`, concatenated.
pub fn h_cz_pairs(qubits: &[u32]) -> Vec<Gate> {
    qubits.iter().flat_map(|&q| [h(q), cz(q, 0)]).collect()
}

/// A layered circuit of `layers` CNOT ladders over `width` qubits.
pub fn ladder(width: u32, layers: usize) -> Vec<Gate> {
    let mut out = Vec::new();
    for _ in 0..layers {
        for q in 0..width {
            out.push(h(q));
        }
        for q in 1..width {
            out.push(cnot(q - 1, q));
        }
    }
    out
}

// ============================================================================
// Gate Generation
// ============================================================================

/// One- or two-qubit gate on qubits drawn from `qubits`.
pub fn arb_gate_on(qubits: Vec<u32>) -> impl Strategy<Value = Gate> {
    let n = qubits.len();
    let single = (0..n, prop::sample::select(vec!["H", "X", "T"])).prop_map({
        let qubits = qubits.clone();
        move |(i, name)| Gate {
            name,
            qubits: vec![qubits[i]],
        }
    });
    let pair = (0..n, 0..n, prop::sample::select(vec!["CNOT", "CZ"]))
        .prop_filter("distinct qubits", |(a, b, _)| a != b)
        .prop_map(move |(a, b, name)| Gate {
            name,
            qubits: vec![qubits[a], qubits[b]],
        });
    prop_oneof![3 => single, 1 => pair]
}

/// Gate on qubits `0..4`.
pub fn arb_gate() -> impl Strategy<Value = Gate> {
    arb_gate_on((0..4).collect())
}

/// Circuit of up to `max_len` gates on qubits `0..4`.
pub fn arb_circuit(max_len: usize) -> impl Strategy<Value = Vec<Gate>> {
    vec(arb_gate(), 0..=max_len)
}

/// Two circuits on disjoint qubits (even vs odd), and an interleaving of them
/// that preserves each circuit's internal order.
///
/// Returns `(first ++ second, interleaving)`.
pub fn arb_disjoint_interleaving(max_len: usize) -> impl Strategy<Value = (Vec<Gate>, Vec<Gate>)> {
    (
        vec(arb_gate_on(vec![0, 2, 4]), 0..=max_len),
        vec(arb_gate_on(vec![1, 3, 5]), 0..=max_len),
    )
        .prop_flat_map(|(a, b)| {
            let total = a.len() + b.len();
            (Just(a), Just(b), vec(any::<bool>(), total..=total))
        })
        .prop_map(|(a, b, picks)| {
            let reference: Vec<Gate> = a.iter().chain(b.iter()).cloned().collect();
            let (mut ia, mut ib) = (a.into_iter(), b.into_iter());
            let mut interleaved = Vec::with_capacity(picks.len());
            for pick_first in picks {
                let next = if pick_first {
                    ia.next().or_else(|| ib.next())
                } else {
                    ib.next().or_else(|| ia.next())
                };
                interleaved.extend(next);
            }
            (reference, interleaved)
        })
}
