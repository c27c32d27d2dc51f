//! Minimal gate type for unit tests.

use crate::core::AtomicOperation;
use crate::fingerprint::Canonicalizable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gate {
    pub name: &'static str,
    pub qubits: Vec<u32>,
    pub exponent: Option<i64>,
}

impl AtomicOperation for Gate {
    type Resource = u32;

    fn resources(&self) -> &[u32] {
        &self.qubits
    }
}

impl Canonicalizable for Gate {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32);
        out.extend_from_slice(&(self.name.len() as u32).to_le_bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&(self.qubits.len() as u32).to_le_bytes());
        for q in &self.qubits {
            out.extend_from_slice(&q.to_le_bytes());
        }
        match self.exponent {
            Some(e) => {
                out.push(1);
                out.extend_from_slice(&e.to_le_bytes());
            }
            None => out.push(0),
        }
        out
    }
}

fn gate(name: &'static str, qubits: &[u32]) -> Gate {
    Gate {
        name,
        qubits: qubits.to_vec(),
        exponent: None,
    }
}

pub fn h(q: u32) -> Gate {
    gate("H", &[q])
}

pub fn x(q: u32) -> Gate {
    gate("X", &[q])
}

pub fn cnot(control: u32, target: u32) -> Gate {
    gate("CNOT", &[control, target])
}

pub fn cz(a: u32, b: u32) -> Gate {
    gate("CZ", &[a, b])
}

pub fn zpow(exponent: i64, q: u32) -> Gate {
    Gate {
        exponent: Some(exponent),
        ..gate("ZPow", &[q])
    }
}

/// Acts on no qubit.
pub fn global_phase(k: i64) -> Gate {
    Gate {
        exponent: Some(k),
        ..gate("GPhase", &[])
    }
}
