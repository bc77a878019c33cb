//! Morgan (ECFP-style) circular fingerprints.
//!
//! Each heavy atom starts from an invariant built from its degree, total
//! valence, atomic number, isotope, charge, hydrogen count and ring
//! membership. Every iteration folds in the sorted (bond order, neighbour
//! invariant) pairs. All invariants from iterations 0..=radius are folded
//! into a bit vector of `n_bits`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::smiles::Molecule;

pub const DEFAULT_RADIUS: usize = 2;
pub const DEFAULT_BITS: usize = 1024;

fn hash_combine(seed: &mut u32, value: u32) {
    *seed ^= value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}

fn hash_values(values: &[u32]) -> u32 {
    let mut seed = 0u32;
    for &v in values {
        hash_combine(&mut seed, v);
    }
    seed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    n_bits: usize,
    words: Vec<u64>,
}

impl Fingerprint {
    pub fn new(n_bits: usize) -> Self {
        Self { n_bits, words: vec![0; n_bits.div_ceil(64)] }
    }

    pub fn len(&self) -> usize {
        self.n_bits
    }

    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    pub fn set(&mut self, bit: usize) {
        self.words[bit / 64] |= 1 << (bit % 64);
    }

    pub fn get(&self, bit: usize) -> bool {
        self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// 0/1 vector, used as the clustering feature space.
    pub fn to_dense(&self) -> Vec<f64> {
        (0..self.n_bits).map(|i| if self.get(i) { 1.0 } else { 0.0 }).collect()
    }

    pub fn tanimoto(&self, other: &Fingerprint) -> f64 {
        let (mut both, mut either) = (0u32, 0u32);
        for (a, b) in self.words.iter().zip(&other.words) {
            both += (a & b).count_ones();
            either += (a | b).count_ones();
        }
        if either == 0 {
            0.0
        } else {
            both as f64 / either as f64
        }
    }
}

/// Fingerprint of an already parsed molecule.
pub fn morgan(mol: &Molecule, radius: usize, n_bits: usize) -> Fingerprint {
    let mut fp = Fingerprint::new(n_bits);
    if n_bits == 0 {
        return fp;
    }
    let in_ring = mol.ring_atoms();

    let mut invariants: Vec<u32> = (0..mol.atom_count())
        .map(|i| {
            let atom = &mol.atoms[i];
            hash_values(&[
                mol.degree(i) as u32,
                mol.total_valence(i) as u32,
                atom.atomic_number as u32,
                atom.isotope.unwrap_or(0) as u32,
                (atom.charge as i32 + 128) as u32,
                mol.hydrogen_count(i) as u32,
                u32::from(in_ring[i]),
            ])
        })
        .collect();

    for &inv in &invariants {
        fp.set(inv as usize % n_bits);
    }

    for iteration in 1..=radius {
        let next: Vec<u32> = (0..mol.atom_count())
            .map(|i| {
                let mut env: Vec<(u32, u32)> = mol
                    .neighbors(i)
                    .iter()
                    .map(|&(nbr, bond)| (mol.bonds[bond].order.code(), invariants[nbr]))
                    .collect();
                env.sort_unstable();

                let mut values = vec![iteration as u32, invariants[i]];
                for (order, inv) in env {
                    values.push(order);
                    values.push(inv);
                }
                hash_values(&values)
            })
            .collect();

        for &inv in &next {
            fp.set(inv as usize % n_bits);
        }
        invariants = next;
    }

    fp
}

/// Parses SMILES and computes a radius-2, 1024-bit fingerprint.
pub fn smiles_fingerprint(smiles: &str) -> Result<Fingerprint> {
    let mol = Molecule::parse(smiles)?;
    Ok(morgan(&mol, DEFAULT_RADIUS, DEFAULT_BITS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = smiles_fingerprint("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let b = smiles_fingerprint("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1024);
        assert!(a.count_ones() > 0);
    }

    #[test]
    fn test_atom_order_independent() {
        let a = smiles_fingerprint("CCO").unwrap();
        let b = smiles_fingerprint("OCC").unwrap();
        assert_eq!(a, b);
        assert!((a.tanimoto(&b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_molecules_differ() {
        let ethanol = smiles_fingerprint("CCO").unwrap();
        let benzene = smiles_fingerprint("c1ccccc1").unwrap();
        assert_ne!(ethanol, benzene);
        assert!(ethanol.tanimoto(&benzene) < 0.5);
    }

    #[test]
    fn test_dense_vector_matches_bits() {
        let fp = smiles_fingerprint("CCN").unwrap();
        let dense = fp.to_dense();
        assert_eq!(dense.len(), 1024);
        assert_eq!(dense.iter().sum::<f64>() as u32, fp.count_ones());
    }

    #[test]
    fn test_invalid_smiles_propagates() {
        assert!(smiles_fingerprint("C1CC").is_err());
    }
}
