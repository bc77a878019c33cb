use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoleculeError {
    #[error("protein sequence is empty")]
    EmptySequence,

    #[error("non-standard residue '{residue}' at position {position}")]
    InvalidResidue { residue: char, position: usize },

    #[error("invalid SMILES at offset {offset}: {message}")]
    Smiles { offset: usize, message: String },

    #[error("at least {required} valid ligands are needed, got {found}")]
    TooFewLigands { required: usize, found: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MoleculeError>;
