//! SMILES parsing into a molecular graph.
//!
//! Supports the organic subset, bracket atoms (isotope, chirality marks,
//! hydrogen count, charge, atom class), branches, ring closures including
//! `%NN`, explicit bond symbols, aromatic lowercase atoms and `.` separated
//! components. Stereo marks are accepted and ignored. The graph is heavy-atom
//! only; hydrogens are counted per atom.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{MoleculeError, Result};

/// Element symbols, atomic number = index + 1.
const ELEMENTS: [&str; 86] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn",
];

fn atomic_number(symbol: &str) -> Option<u8> {
    ELEMENTS.iter().position(|&s| s == symbol).map(|i| i as u8 + 1)
}

/// Upper bound on a bracket atom's hydrogen count.
const MAX_BRACKET_HYDROGENS: u32 = 9;

/// Normal valences of organic-subset atoms, used for implicit hydrogens.
fn default_valences(symbol: &str) -> &'static [u16] {
    match symbol {
        "B" => &[3],
        "C" => &[4],
        "N" => &[3, 5],
        "O" => &[2],
        "P" => &[3, 5],
        "S" => &[2, 4, 6],
        "F" | "Cl" | "Br" | "I" => &[1],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution; aromatic bonds count 1, the shared pi bond is
    /// added per atom by `Molecule::pi_bond`.
    fn valence(self) -> u16 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    pub atomic_number: u8,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Explicit hydrogen count of a bracket atom; `None` for organic-subset atoms.
    pub bracket_hydrogens: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// Per atom: (neighbour atom, bond index).
    adjacency: Vec<Vec<(usize, usize)>>,
    hydrogens: Vec<u16>,
}

impl Molecule {
    pub fn parse(smiles: &str) -> Result<Self> {
        Parser::new(smiles).run()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Implicit plus bracket hydrogens on an atom.
    pub fn hydrogen_count(&self, atom: usize) -> u16 {
        self.hydrogens[atom]
    }

    /// Bond valence plus hydrogens.
    pub fn total_valence(&self, atom: usize) -> u16 {
        self.bond_valence(atom) + self.hydrogens[atom]
    }

    fn bond_valence(&self, atom: usize) -> u16 {
        let bonds: u16 = self.adjacency[atom]
            .iter()
            .map(|&(_, b)| self.bonds[b].order.valence())
            .sum();
        bonds + u16::from(self.pi_bond(atom))
    }

    /// Whether an aromatic atom carries the ring's extra pi bond.
    ///
    /// Carbon and boron always do unless an exocyclic double bond takes its
    /// place. Nitrogen and phosphorus only do with two connections
    /// (pyridine-like); a third substituent or an explicit H makes them
    /// pyrrole-like lone-pair donors. Oxygen, sulfur and the rest donate a
    /// lone pair and never do.
    fn pi_bond(&self, atom: usize) -> bool {
        let a = &self.atoms[atom];
        if !a.aromatic {
            return false;
        }
        let exocyclic_double = self.adjacency[atom]
            .iter()
            .any(|&(_, b)| matches!(self.bonds[b].order, BondOrder::Double | BondOrder::Triple));
        if exocyclic_double {
            return false;
        }
        match a.symbol.as_str() {
            "C" | "B" => true,
            "N" | "P" => {
                let connections = self.adjacency[atom].len() + usize::from(a.bracket_hydrogens.unwrap_or(0));
                connections == 2
            }
            _ => false,
        }
    }

    /// Flags each bond that lies on a cycle: a bond is in a ring when its two
    /// atoms stay connected without it.
    pub fn ring_bonds(&self) -> Vec<bool> {
        (0..self.bonds.len())
            .map(|skip| {
                let Bond { a, b, .. } = self.bonds[skip];
                let mut seen = vec![false; self.atoms.len()];
                let mut stack = vec![a];
                seen[a] = true;
                while let Some(u) = stack.pop() {
                    for &(v, bond) in &self.adjacency[u] {
                        if bond != skip && !seen[v] {
                            if v == b {
                                return true;
                            }
                            seen[v] = true;
                            stack.push(v);
                        }
                    }
                }
                false
            })
            .collect()
    }

    pub fn ring_atoms(&self) -> Vec<bool> {
        let ring_bonds = self.ring_bonds();
        let mut in_ring = vec![false; self.atoms.len()];
        for (bond, &ring) in self.bonds.iter().zip(&ring_bonds) {
            if ring {
                in_ring[bond.a] = true;
                in_ring[bond.b] = true;
            }
        }
        in_ring
    }
}

pub fn is_valid_smiles(smiles: &str) -> bool {
    Molecule::parse(smiles).is_ok()
}

fn err(offset: usize, message: impl Into<String>) -> MoleculeError {
    MoleculeError::Smiles { offset, message: message.into() }
}

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    mol: Molecule,
    current: Option<usize>,
    pending_bond: Option<(usize, BondOrder)>,
    branches: Vec<(usize, Option<usize>)>,
    rings: HashMap<u32, (usize, usize, Option<BondOrder>)>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            mol: Molecule::default(),
            current: None,
            pending_bond: None,
            branches: Vec::new(),
            rings: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<Molecule> {
        if self.text.trim().is_empty() {
            return Err(err(0, "empty SMILES"));
        }

        while let Some((pos, ch)) = self.chars.next() {
            match ch {
                '-' => self.set_bond(pos, BondOrder::Single)?,
                '=' => self.set_bond(pos, BondOrder::Double)?,
                '#' => self.set_bond(pos, BondOrder::Triple)?,
                ':' => self.set_bond(pos, BondOrder::Aromatic)?,
                // stereo bonds only matter for geometry
                '/' | '\\' => self.set_bond(pos, BondOrder::Single)?,
                '(' => {
                    if self.current.is_none() {
                        return Err(err(pos, "branch without a preceding atom"));
                    }
                    self.branches.push((pos, self.current));
                }
                ')' => {
                    let (_, atom) = self.branches.pop().ok_or_else(|| err(pos, "unmatched ')'"))?;
                    if let Some((bond_pos, _)) = self.pending_bond {
                        return Err(err(bond_pos, "bond symbol before ')'"));
                    }
                    self.current = atom;
                }
                '.' => {
                    if let Some((bond_pos, _)) = self.pending_bond {
                        return Err(err(bond_pos, "bond symbol before '.'"));
                    }
                    self.current = None;
                }
                '%' => {
                    let d1 = self.digit(pos)?;
                    let d2 = self.digit(pos)?;
                    self.ring_closure(pos, d1 * 10 + d2)?;
                }
                '0'..='9' => self.ring_closure(pos, ch as u32 - '0' as u32)?,
                '[' => {
                    let atom = self.bracket_atom(pos)?;
                    self.add_atom(atom);
                }
                _ => {
                    let atom = self.organic_atom(pos, ch)?;
                    self.add_atom(atom);
                }
            }
        }

        if let Some((pos, _)) = self.pending_bond {
            return Err(err(pos, "dangling bond"));
        }
        if let Some(&(pos, _)) = self.branches.last() {
            return Err(err(pos, "unclosed '('"));
        }
        if let Some((&ring, _)) = self.rings.iter().next() {
            return Err(err(self.text.len(), format!("unclosed ring {}", ring)));
        }

        self.assign_hydrogens()?;
        Ok(self.mol)
    }

    fn set_bond(&mut self, pos: usize, order: BondOrder) -> Result<()> {
        if self.current.is_none() {
            return Err(err(pos, "bond without a preceding atom"));
        }
        if self.pending_bond.is_some() {
            return Err(err(pos, "two consecutive bond symbols"));
        }
        self.pending_bond = Some((pos, order));
        Ok(())
    }

    fn digit(&mut self, pos: usize) -> Result<u32> {
        match self.chars.next() {
            Some((_, c)) if c.is_ascii_digit() => Ok(c as u32 - '0' as u32),
            _ => Err(err(pos, "'%' must be followed by two digits")),
        }
    }

    fn implicit_order(&self, a: usize, b: usize) -> BondOrder {
        if self.mol.atoms[a].aromatic && self.mol.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn connect(&mut self, pos: usize, a: usize, b: usize, order: BondOrder) -> Result<()> {
        if a == b {
            return Err(err(pos, "atom bonded to itself"));
        }
        if self.mol.adjacency[a].iter().any(|&(n, _)| n == b) {
            return Err(err(pos, "duplicate bond"));
        }
        let idx = self.mol.bonds.len();
        self.mol.bonds.push(Bond { a, b, order });
        self.mol.adjacency[a].push((b, idx));
        self.mol.adjacency[b].push((a, idx));
        Ok(())
    }

    fn add_atom(&mut self, atom: Atom) {
        let idx = self.mol.atoms.len();
        self.mol.atoms.push(atom);
        self.mol.adjacency.push(Vec::new());

        if let Some(prev) = self.current {
            let order = match self.pending_bond.take() {
                Some((_, order)) => order,
                None => self.implicit_order(prev, idx),
            };
            let bond = self.mol.bonds.len();
            self.mol.bonds.push(Bond { a: prev, b: idx, order });
            self.mol.adjacency[prev].push((idx, bond));
            self.mol.adjacency[idx].push((prev, bond));
        }
        self.current = Some(idx);
    }

    fn ring_closure(&mut self, pos: usize, ring: u32) -> Result<()> {
        let atom = self.current.ok_or_else(|| err(pos, "ring closure without an atom"))?;
        let bond = self.pending_bond.take().map(|(_, order)| order);

        match self.rings.remove(&ring) {
            Some((_, other, open_bond)) => {
                let order = match (open_bond, bond) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(err(pos, format!("conflicting bond orders on ring {}", ring)));
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => self.implicit_order(other, atom),
                };
                self.connect(pos, other, atom, order)
            }
            None => {
                self.rings.insert(ring, (pos, atom, bond));
                Ok(())
            }
        }
    }

    fn organic_atom(&mut self, pos: usize, ch: char) -> Result<Atom> {
        let (symbol, aromatic) = match ch {
            'C' if self.next_is('l') => ("Cl", false),
            'B' if self.next_is('r') => ("Br", false),
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => (&self.text[pos..pos + 1], false),
            'b' => ("B", true),
            'c' => ("C", true),
            'n' => ("N", true),
            'o' => ("O", true),
            'p' => ("P", true),
            's' => ("S", true),
            _ => return Err(err(pos, format!("unrecognized character '{}'", ch))),
        };
        Ok(Atom {
            symbol: symbol.to_string(),
            atomic_number: atomic_number(symbol).unwrap_or(0),
            aromatic,
            charge: 0,
            isotope: None,
            bracket_hydrogens: None,
        })
    }

    /// Consumes the next char when it equals `expected`.
    fn next_is(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(&(_, c)) = self.chars.peek() {
            let Some(d) = c.to_digit(10) else { break };
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.chars.next();
        }
        value
    }

    /// `[isotope? symbol chirality? hcount? charge? class?]`
    fn bracket_atom(&mut self, open: usize) -> Result<Atom> {
        let isotope = self.number().map(|n| n.min(u16::MAX as u32) as u16);

        let (start, first) = self.chars.next().ok_or_else(|| err(open, "unclosed '['"))?;
        let (symbol, aromatic) = if first.is_ascii_uppercase() {
            let two = self
                .chars
                .peek()
                .filter(|&&(_, c)| c.is_ascii_lowercase())
                .map(|&(_, c)| format!("{}{}", first, c));
            match two {
                Some(sym) if atomic_number(&sym).is_some() => {
                    self.chars.next();
                    (sym, false)
                }
                _ => (first.to_string(), false),
            }
        } else {
            let two = self.chars.peek().map(|&(_, c)| format!("{}{}", first, c));
            match two.as_deref() {
                Some("se") | Some("as") => {
                    self.chars.next();
                    (capitalize(two.as_deref().unwrap_or_default()), true)
                }
                _ if matches!(first, 'b' | 'c' | 'n' | 'o' | 'p' | 's') => (capitalize(&first.to_string()), true),
                _ => return Err(err(start, format!("invalid bracket atom symbol '{}'", first))),
            }
        };
        let number = atomic_number(&symbol)
            .ok_or_else(|| err(start, format!("unknown element '{}'", symbol)))?;

        while self.next_is('@') {}

        let mut hydrogens = 0u8;
        if self.next_is('H') {
            let count = self.number().unwrap_or(1);
            if count > MAX_BRACKET_HYDROGENS {
                return Err(err(open, format!("hydrogen count {} is above {}", count, MAX_BRACKET_HYDROGENS)));
            }
            hydrogens = count as u8;
        }

        let mut charge: i32 = 0;
        loop {
            let sign = if self.next_is('+') {
                1
            } else if self.next_is('-') {
                -1
            } else {
                break;
            };
            charge += sign * self.number().unwrap_or(1) as i32;
        }

        if self.next_is(':') && self.number().is_none() {
            return Err(err(open, "atom class must be a number"));
        }

        if !self.next_is(']') {
            return Err(err(open, "unclosed '['"));
        }

        Ok(Atom {
            symbol,
            atomic_number: number,
            aromatic,
            charge: charge.clamp(i8::MIN as i32, i8::MAX as i32) as i8,
            isotope,
            bracket_hydrogens: Some(hydrogens),
        })
    }

    fn assign_hydrogens(&mut self) -> Result<()> {
        let mut hydrogens = Vec::with_capacity(self.mol.atoms.len());

        for (i, atom) in self.mol.atoms.iter().enumerate() {
            if let Some(h) = atom.bracket_hydrogens {
                hydrogens.push(u16::from(h));
                continue;
            }
            let used = self.mol.bond_valence(i);
            let valences = default_valences(&atom.symbol);
            match valences.iter().find(|&&v| v >= used) {
                Some(&v) => hydrogens.push(v - used),
                None => {
                    return Err(err(
                        self.text.len(),
                        format!("atom {} ({}) exceeds its allowed valence", i + 1, atom.symbol),
                    ));
                }
            }
        }
        self.mol.hydrogens = hydrogens;
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethanol() {
        let mol = Molecule::parse("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bonds.len(), 2);
        assert_eq!(mol.hydrogen_count(0), 3);
        assert_eq!(mol.hydrogen_count(1), 2);
        assert_eq!(mol.hydrogen_count(2), 1);
    }

    #[test]
    fn test_benzene_ring_closure() {
        let mol = Molecule::parse("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bonds.len(), 6);
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert!((0..6).all(|i| mol.hydrogen_count(i) == 1));
        assert!(mol.ring_atoms().iter().all(|&r| r));
    }

    #[test]
    fn test_branches_and_double_bonds() {
        // aspirin
        let mol = Molecule::parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 13);
        assert_eq!(mol.bonds.len(), 13);
        assert_eq!(mol.degree(1), 3);
        let ring = mol.ring_bonds();
        assert_eq!(ring.iter().filter(|&&r| r).count(), 6);
    }

    #[test]
    fn test_two_letter_halogens() {
        let mol = Molecule::parse("ClCBr").unwrap();
        let symbols: Vec<&str> = mol.atoms.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Cl", "C", "Br"]);
        assert_eq!(mol.hydrogen_count(1), 2);
    }

    #[test]
    fn test_bracket_atoms() {
        let mol = Molecule::parse("[13CH4]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.hydrogen_count(0), 4);

        let mol = Molecule::parse("[NH4+].[Cl-]").unwrap();
        assert_eq!(mol.atoms[0].charge, 1);
        assert_eq!(mol.atoms[1].charge, -1);
        assert_eq!(mol.bonds.len(), 0);

        let mol = Molecule::parse("c1cc[nH]c1").unwrap();
        assert!(mol.atoms[3].aromatic);
        assert_eq!(mol.hydrogen_count(3), 1);

        let mol = Molecule::parse("[Fe+2]").unwrap();
        assert_eq!(mol.atoms[0].atomic_number, 26);
        assert_eq!(mol.atoms[0].charge, 2);

        assert!(Molecule::parse("N[C@@H](C)C(=O)O").is_ok());
    }

    #[test]
    fn test_lone_pair_heteroatoms() {
        let furan = Molecule::parse("c1ccoc1").unwrap();
        let h: Vec<u16> = (0..5).map(|i| furan.hydrogen_count(i)).collect();
        assert_eq!(h, vec![1, 1, 1, 0, 1]);
        assert_eq!(furan.total_valence(3), 2);
        assert_eq!(furan.total_valence(0), 4);

        let thiophene = Molecule::parse("c1ccsc1").unwrap();
        let h: Vec<u16> = (0..5).map(|i| thiophene.hydrogen_count(i)).collect();
        assert_eq!(h, vec![1, 1, 1, 0, 1]);

        let methylpyrrole = Molecule::parse("Cn1cccc1").unwrap();
        let h: Vec<u16> = (0..6).map(|i| methylpyrrole.hydrogen_count(i)).collect();
        assert_eq!(h, vec![3, 0, 1, 1, 1, 1]);
        assert_eq!(methylpyrrole.total_valence(1), 3);

        let pyridine = Molecule::parse("c1ccncc1").unwrap();
        assert_eq!(pyridine.hydrogen_count(3), 0);
        assert_eq!(pyridine.total_valence(3), 3);

        let pyrrole = Molecule::parse("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.total_valence(3), 3);
    }

    #[test]
    fn test_furan_containing_ligand() {
        let mol = Molecule::parse("O=C(O)c1ccc(o1)C").unwrap();
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.hydrogen_count(8), 3);
        assert!(is_valid_smiles("O=c1cccc[nH]1"));
    }

    #[test]
    fn test_bracket_hydrogen_bound() {
        assert!(is_valid_smiles("[CH4]"));
        match Molecule::parse("[CH255]C") {
            Err(MoleculeError::Smiles { message, .. }) => assert!(message.contains("hydrogen count 255")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_percent_ring_closure() {
        let mol = Molecule::parse("C%10CCCCC%10").unwrap();
        assert_eq!(mol.bonds.len(), 6);
    }

    #[test]
    fn test_chloroquine_like_amine() {
        assert!(is_valid_smiles("CCN(CC)CCCC(C)NC1=C2C=CC(=CC2=NC=C1)Cl"));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(!is_valid_smiles(""));
        assert!(!is_valid_smiles("not-a-smiles"));
        assert!(!is_valid_smiles("C1CC"));
        assert!(!is_valid_smiles("C(C"));
        assert!(!is_valid_smiles("CC)"));
        assert!(!is_valid_smiles("CC="));
        assert!(!is_valid_smiles("[Xx]"));
        assert!(!is_valid_smiles("C(C)(C)(C)(C)C"));
    }

    #[test]
    fn test_error_reports_offset() {
        match Molecule::parse("CCZ") {
            Err(MoleculeError::Smiles { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
