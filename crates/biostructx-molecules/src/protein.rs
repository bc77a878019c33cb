//! Protein sequence descriptors with ProtParam semantics.
//!
//! - **Molecular weight**: average masses of free amino acids minus one water per peptide bond
//! - **Aromaticity**: relative frequency of F + W + Y
//! - **Instability index**: Guruprasad dipeptide instability weights
//! - **Isoelectric point**: Bjellqvist pK set, bisection on net charge
//! - **GRAVY**: mean Kyte-Doolittle hydropathy
//! - **Extinction coefficient**: at 280 nm, with and without cystines

use serde::{Deserialize, Serialize};

use crate::error::{MoleculeError, Result};

/// The 20 standard residues in index order.
pub const AMINO_ACIDS: [u8; 20] = *b"ACDEFGHIKLMNPQRSTVWY";

/// Map amino acid byte to index 0–19. Returns None for non-standard residues.
fn aa_index(aa: u8) -> Option<usize> {
    match aa {
        b'A' => Some(0),
        b'C' => Some(1),
        b'D' => Some(2),
        b'E' => Some(3),
        b'F' => Some(4),
        b'G' => Some(5),
        b'H' => Some(6),
        b'I' => Some(7),
        b'K' => Some(8),
        b'L' => Some(9),
        b'M' => Some(10),
        b'N' => Some(11),
        b'P' => Some(12),
        b'Q' => Some(13),
        b'R' => Some(14),
        b'S' => Some(15),
        b'T' => Some(16),
        b'V' => Some(17),
        b'W' => Some(18),
        b'Y' => Some(19),
        _ => None,
    }
}

/// Average masses of the free amino acids (Da), index order.
const RESIDUE_MASS: [f64; 20] = [
    89.0932, 121.1582, 133.1027, 147.1293, 165.1891, 75.0666, 155.1546, 131.1729, 146.1876, 131.1729,
    149.2113, 132.1179, 115.1305, 146.1445, 174.201, 105.0926, 119.1192, 117.1463, 204.2252, 181.1885,
];

const WATER_MASS: f64 = 18.0153;

/// Kyte-Doolittle hydropathy, index order.
const KYTE_DOOLITTLE: [f64; 20] = [
    1.8, 2.5, -3.5, -3.5, 2.8, -0.4, -3.2, 4.5, -3.9, 3.8,
    1.9, -3.5, -1.6, -3.5, -4.5, -0.8, -0.7, 4.2, -0.9, -1.3,
];

/// Dipeptide instability weight values, `DIWV[first][second]`, index order.
#[rustfmt::skip]
const DIWV: [[f64; 20]; 20] = [
    /* A */ [  1.00,  44.94,  -7.49,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00],
    /* C */ [  1.00,   1.00,  20.26,   1.00,   1.00,   1.00,  33.60,   1.00,   1.00,  20.26,  33.60,   1.00,  20.26,  -6.54,   1.00,   1.00,  33.60,  -6.54,  24.68,   1.00],
    /* D */ [  1.00,   1.00,   1.00,   1.00,  -6.54,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00,  -6.54,  20.26, -14.03,   1.00,   1.00,   1.00],
    /* E */ [  1.00,  44.94,  20.26,  33.60,   1.00,   1.00,  -6.54,  20.26,   1.00,   1.00,   1.00,   1.00,  20.26,  20.26,   1.00,  20.26,   1.00,   1.00, -14.03,   1.00],
    /* F */ [  1.00,   1.00,  13.34,   1.00,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  33.60],
    /* G */ [ -7.49,   1.00,   1.00,  -6.54,   1.00,  13.34,   1.00,  -7.49,  -7.49,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,  13.34,  -7.49],
    /* H */ [  1.00,   1.00,   1.00,   1.00,  -9.37,  -9.37,   1.00,  44.94,  24.68,   1.00,   1.00,  24.68,  -1.88,   1.00,   1.00,   1.00,  -6.54,   1.00,  -1.88,  44.94],
    /* I */ [  1.00,   1.00,   1.00,  44.94,   1.00,   1.00,  13.34,   1.00,  -7.49,  20.26,   1.00,   1.00,  -1.88,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00],
    /* K */ [  1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,  -7.49,   1.00,  -7.49,  33.60,   1.00,  -6.54,  24.64,  33.60,   1.00,   1.00,  -7.49,   1.00,   1.00],
    /* L */ [  1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,  20.26,  33.60,  20.26,   1.00,   1.00,   1.00,  24.68,   1.00],
    /* M */ [ 13.34,   1.00,   1.00,   1.00,   1.00,   1.00,  58.28,   1.00,   1.00,   1.00,  -1.88,   1.00,  44.94,  -6.54,  -6.54,  44.94,  -1.88,   1.00,   1.00,  24.68],
    /* N */ [  1.00,  -1.88,   1.00,   1.00, -14.03, -14.03,   1.00,  44.94,  24.68,   1.00,   1.00,   1.00,  -1.88,  -6.54,   1.00,   1.00,  -7.49,   1.00,  -9.37,   1.00],
    /* P */ [ 20.26,  -6.54,  -6.54,  18.38,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,  -6.54,   1.00,  20.26,  20.26,  -6.54,  20.26,   1.00,  20.26,  -1.88,   1.00],
    /* Q */ [  1.00,  -6.54,  20.26,  20.26,  -6.54,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  20.26,  20.26,   1.00,  44.94,   1.00,  -6.54,   1.00,  -6.54],
    /* R */ [  1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,  20.26,   1.00,   1.00,   1.00,   1.00,  13.34,  20.26,  20.26,  58.28,  44.94,   1.00,   1.00,  58.28,  -6.54],
    /* S */ [  1.00,  33.60,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  44.94,  20.26,  20.26,  20.26,   1.00,   1.00,   1.00,   1.00],
    /* T */ [  1.00,   1.00,   1.00,  20.26,  13.34,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00,  -6.54,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00],
    /* V */ [  1.00,   1.00, -14.03,   1.00,   1.00,  -7.49,   1.00,   1.00,  -1.88,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,  -6.54],
    /* W */ [-14.03,   1.00,   1.00,   1.00,   1.00,  -9.37,  24.68,   1.00,   1.00,  13.34,  24.68,  13.34,   1.00,   1.00,   1.00,   1.00, -14.03,  -7.49,   1.00,   1.00],
    /* Y */ [ 24.68,   1.00,  24.68,  -6.54,   1.00,  -7.49,  13.34,   1.00,   1.00,   1.00,  44.94,   1.00,  13.34,   1.00, -15.91,   1.00,  -7.49,   1.00,  -9.37,  13.34],
];

/// Ordered protein descriptor: MolWt, Aromaticity, InstabilityIndex, pI, GRAVY.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProteinDescriptor {
    pub molecular_weight: f64,
    pub aromaticity: f64,
    pub instability_index: f64,
    pub isoelectric_point: f64,
    pub gravy: f64,
}

impl ProteinDescriptor {
    pub const LEN: usize = 5;
    pub const NAMES: [&'static str; 5] =
        ["MolWt", "Aromaticity", "InstabilityIndex", "IsoelectricPoint", "GRAVY"];

    pub fn to_array(&self) -> [f64; 5] {
        [
            self.molecular_weight,
            self.aromaticity,
            self.instability_index,
            self.isoelectric_point,
            self.gravy,
        ]
    }
}

/// Molar extinction coefficient at 280 nm (M⁻¹ cm⁻¹).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtinctionCoefficient {
    pub reduced: u64,
    pub cystines: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueShare {
    pub residue: char,
    pub count: usize,
    pub percent: f64,
}

/// Everything the characterization page shows for one sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProteinProfile {
    pub length: usize,
    pub descriptor: ProteinDescriptor,
    pub extinction: ExtinctionCoefficient,
    /// All 20 standard residues in alphabetical order.
    pub composition: Vec<ResidueShare>,
}

impl ProteinProfile {
    /// The `n` most frequent residues; ties keep alphabetical order.
    pub fn top_composition(&self, n: usize) -> Vec<ResidueShare> {
        let mut shares = self.composition.clone();
        shares.sort_by(|a, b| b.count.cmp(&a.count));
        shares.truncate(n);
        shares
    }
}

/// Upper-cases and validates a sequence against the 20 standard residues.
pub fn normalize_sequence(seq: &str) -> Result<Vec<u8>> {
    if seq.is_empty() {
        return Err(MoleculeError::EmptySequence);
    }
    seq.chars()
        .enumerate()
        .map(|(i, c)| {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii() && aa_index(upper as u8).is_some() {
                Ok(upper as u8)
            } else {
                Err(MoleculeError::InvalidResidue { residue: c, position: i + 1 })
            }
        })
        .collect()
}

fn counts(seq: &[u8]) -> [usize; 20] {
    let mut counts = [0usize; 20];
    for &aa in seq {
        if let Some(i) = aa_index(aa) {
            counts[i] += 1;
        }
    }
    counts
}

fn molecular_weight(counts: &[usize; 20], len: usize) -> f64 {
    let total: f64 = counts.iter().zip(RESIDUE_MASS).map(|(&n, m)| n as f64 * m).sum();
    total - (len.saturating_sub(1)) as f64 * WATER_MASS
}

fn aromaticity(counts: &[usize; 20], len: usize) -> f64 {
    let aromatic = counts[4] + counts[18] + counts[19];
    aromatic as f64 / len as f64
}

fn instability_index(seq: &[u8]) -> f64 {
    let score: f64 = seq
        .windows(2)
        .filter_map(|w| Some(DIWV[aa_index(w[0])?][aa_index(w[1])?]))
        .sum();
    10.0 / seq.len() as f64 * score
}

fn gravy(counts: &[usize; 20], len: usize) -> f64 {
    let total: f64 = counts.iter().zip(KYTE_DOOLITTLE).map(|(&n, h)| n as f64 * h).sum();
    total / len as f64
}

// Bjellqvist pK values
const PK_NTERM: f64 = 7.5;
const PK_CTERM: f64 = 3.55;
const PK_POSITIVE: [(u8, f64); 3] = [(b'K', 10.0), (b'R', 12.0), (b'H', 5.98)];
const PK_NEGATIVE: [(u8, f64); 4] = [(b'D', 4.05), (b'E', 4.45), (b'C', 9.0), (b'Y', 10.0)];

fn n_terminal_pk(first: u8) -> f64 {
    match first {
        b'A' => 7.59,
        b'M' => 7.0,
        b'S' => 6.93,
        b'P' => 8.36,
        b'T' => 6.82,
        b'V' => 7.44,
        b'E' => 7.7,
        _ => PK_NTERM,
    }
}

fn c_terminal_pk(last: u8) -> f64 {
    match last {
        b'D' => 4.55,
        b'E' => 4.75,
        _ => PK_CTERM,
    }
}

fn charge_at_ph(counts: &[usize; 20], pk_n: f64, pk_c: f64, ph: f64) -> f64 {
    let count = |aa: u8| aa_index(aa).map(|i| counts[i]).unwrap_or(0) as f64;

    let mut positive = 1.0 / (10f64.powf(ph - pk_n) + 1.0);
    for (aa, pk) in PK_POSITIVE {
        positive += count(aa) / (10f64.powf(ph - pk) + 1.0);
    }

    let mut negative = 1.0 / (10f64.powf(pk_c - ph) + 1.0);
    for (aa, pk) in PK_NEGATIVE {
        negative += count(aa) / (10f64.powf(pk - ph) + 1.0);
    }

    positive - negative
}

fn isoelectric_point(seq: &[u8], counts: &[usize; 20]) -> f64 {
    let pk_n = n_terminal_pk(seq[0]);
    let pk_c = c_terminal_pk(seq[seq.len() - 1]);

    let (mut low, mut high) = (4.05, 12.0);
    let mut ph = 7.775;
    while high - low > 1e-4 {
        if charge_at_ph(counts, pk_n, pk_c, ph) > 0.0 {
            low = ph;
        } else {
            high = ph;
        }
        ph = (low + high) / 2.0;
    }
    ph
}

fn descriptor_from(seq: &[u8], counts: &[usize; 20]) -> ProteinDescriptor {
    let len = seq.len();
    ProteinDescriptor {
        molecular_weight: molecular_weight(counts, len),
        aromaticity: aromaticity(counts, len),
        instability_index: instability_index(seq),
        isoelectric_point: isoelectric_point(seq, counts),
        gravy: gravy(counts, len),
    }
}

/// Computes the five-element protein descriptor.
pub fn descriptors(seq: &str) -> Result<ProteinDescriptor> {
    let seq = normalize_sequence(seq)?;
    let counts = counts(&seq);
    Ok(descriptor_from(&seq, &counts))
}

/// Computes the full profile for the characterization page.
pub fn profile(seq: &str) -> Result<ProteinProfile> {
    let seq = normalize_sequence(seq)?;
    let counts = counts(&seq);
    let len = seq.len();

    let reduced = counts[18] as u64 * 5500 + counts[19] as u64 * 1490;
    let extinction = ExtinctionCoefficient {
        reduced,
        cystines: reduced + (counts[1] as u64 / 2) * 125,
    };

    let composition = AMINO_ACIDS
        .iter()
        .zip(counts)
        .map(|(&aa, n)| ResidueShare {
            residue: aa as char,
            count: n,
            percent: n as f64 * 100.0 / len as f64,
        })
        .collect();

    Ok(ProteinProfile {
        length: len,
        descriptor: descriptor_from(&seq, &counts),
        extinction,
        composition,
    })
}
