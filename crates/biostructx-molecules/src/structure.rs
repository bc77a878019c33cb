//! Summaries of PDB text for the structure viewer.
//!
//! Secondary structure comes from the HELIX and SHEET records over the Cα
//! residues of the first model. Files without those records (most predicted
//! models) report every residue as coil and `annotated = false`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryStructureComposition {
    pub helix: f64,
    pub strand: f64,
    pub coil: f64,
    pub residues: usize,
    /// Whether the file carried any HELIX/SHEET records.
    pub annotated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResidueId {
    chain: char,
    seq: i32,
    insertion: char,
}

struct Segment {
    chain: char,
    start: i32,
    end: i32,
}

impl Segment {
    fn contains(&self, res: &ResidueId) -> bool {
        res.chain == self.chain && res.seq >= self.start && res.seq <= self.end
    }
}

/// Fixed-column field, 0-based half-open, tolerant of short lines.
fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn column(line: &str, idx: usize) -> char {
    line.get(idx..idx + 1).and_then(|s| s.chars().next()).unwrap_or(' ')
}

fn parse_segment(line: &str, chain_col: usize, start: (usize, usize), end: (usize, usize)) -> Option<Segment> {
    Some(Segment {
        chain: column(line, chain_col),
        start: field(line, start.0, start.1).parse().ok()?,
        end: field(line, end.0, end.1).parse().ok()?,
    })
}

/// Cα residues of the first model, in file order, without duplicates from
/// alternate locations.
fn ca_residues(pdb: &str) -> Vec<ResidueId> {
    let mut seen = HashSet::new();
    let mut residues = Vec::new();
    for line in pdb.lines() {
        if line.starts_with("ENDMDL") {
            break;
        }
        if !line.starts_with("ATOM") || field(line, 12, 16) != "CA" {
            continue;
        }
        let Ok(seq) = field(line, 22, 26).parse::<i32>() else { continue };
        let id = ResidueId { chain: column(line, 21), seq, insertion: column(line, 26) };
        if seen.insert(id.clone()) {
            residues.push(id);
        }
    }
    residues
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Helix / strand / coil percentages over Cα residues, rounded to 2 decimals.
pub fn secondary_structure(pdb: &str) -> SecondaryStructureComposition {
    let mut helices = Vec::new();
    let mut sheets = Vec::new();
    for line in pdb.lines() {
        if line.starts_with("HELIX") {
            helices.extend(parse_segment(line, 19, (21, 25), (33, 37)));
        } else if line.starts_with("SHEET") {
            sheets.extend(parse_segment(line, 21, (22, 26), (33, 37)));
        }
    }

    let residues = ca_residues(pdb);
    let total = residues.len();
    let annotated = !helices.is_empty() || !sheets.is_empty();
    if total == 0 {
        return SecondaryStructureComposition { helix: 0.0, strand: 0.0, coil: 0.0, residues: 0, annotated };
    }

    let (mut h, mut e) = (0usize, 0usize);
    for res in &residues {
        if helices.iter().any(|s| s.contains(res)) {
            h += 1;
        } else if sheets.iter().any(|s| s.contains(res)) {
            e += 1;
        }
    }
    let c = total - h - e;
    let pct = |n: usize| round2(n as f64 * 100.0 / total as f64);

    SecondaryStructureComposition { helix: pct(h), strand: pct(e), coil: pct(c), residues: total, annotated }
}

/// Lines mentioning a DOMAIN or REGION annotation.
pub fn annotation_lines(pdb: &str) -> Vec<String> {
    pdb.lines()
        .filter(|l| l.contains("DOMAIN") || l.contains("REGION"))
        .map(|l| l.trim_end().to_string())
        .collect()
}

/// Number of Cα residues in the first model.
pub fn residue_count(pdb: &str) -> usize {
    ca_residues(pdb).len()
}
