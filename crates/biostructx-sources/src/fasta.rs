//! FASTA text handling shared by the UniProt client, the normalizer and the
//! alignment summary.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaRecord {
    /// Header line without the leading `>`.
    pub header: String,
    pub sequence: String,
}

impl FastaRecord {
    /// First whitespace-delimited token of the header, or the `|ACC|` field of
    /// a UniProt-style header when present.
    pub fn id(&self) -> &str {
        let token = self.header.split_whitespace().next().unwrap_or("");
        let mut parts = token.split('|');
        match (parts.next(), parts.next()) {
            (Some(_), Some(acc)) if !acc.is_empty() => acc,
            _ => token,
        }
    }
}

/// Parses a FASTA block into records. Sequence lines are concatenated with
/// whitespace removed. Text before the first header becomes a record with an
/// empty header so raw sequences are not lost.
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some(rec) = current.take() {
                records.push(rec);
            }
            current = Some(FastaRecord { header: header.trim().to_string(), sequence: String::new() });
        } else {
            let rec = current.get_or_insert_with(|| FastaRecord {
                header: String::new(),
                sequence: String::new(),
            });
            rec.sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }
    if let Some(rec) = current {
        records.push(rec);
    }
    records
}

/// Reduces raw or FASTA text to a bare sequence: a leading `>` header line is
/// dropped and the remaining lines are joined without whitespace.
pub fn clean_sequence(text: &str) -> String {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if lines.peek().is_some_and(|l| l.starts_with('>')) {
        lines.next();
    }
    lines.flat_map(|l| l.chars()).filter(|c| !c.is_whitespace()).collect()
}

/// Extracts the accession from the first `>…|ACC|` header in the text.
pub fn header_accession(text: &str) -> Option<String> {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r">[^\n|]*\|(\w+)\|").unwrap());
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
