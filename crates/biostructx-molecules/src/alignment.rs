//! Pairwise percent identity over a multiple sequence alignment.

fn is_gap(c: u8) -> bool {
    c == b'-' || c == b'.'
}

/// Identical residues over columns where neither sequence has a gap, as a
/// percentage. Two sequences with no shared residue columns score 0.
pub fn percent_identity(a: &str, b: &str) -> f64 {
    let (mut same, mut compared) = (0usize, 0usize);
    for (x, y) in a.bytes().zip(b.bytes()) {
        if is_gap(x) || is_gap(y) {
            continue;
        }
        compared += 1;
        if x.eq_ignore_ascii_case(&y) {
            same += 1;
        }
    }
    if compared == 0 {
        0.0
    } else {
        same as f64 * 100.0 / compared as f64
    }
}

/// Symmetric matrix of pairwise identities, rounded to one decimal.
pub fn identity_matrix(aligned: &[&str]) -> Vec<Vec<f64>> {
    let n = aligned.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let v = (percent_identity(aligned[i], aligned[j]) * 10.0).round() / 10.0;
            matrix[i][j] = v;
            matrix[j][i] = v;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_gap_columns() {
        assert_eq!(percent_identity("MK-T", "MKAT"), 100.0);
        assert_eq!(percent_identity("MKAT", "MKGT"), 75.0);
        assert_eq!(percent_identity("----", "MKAT"), 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_full_diagonal() {
        let m = identity_matrix(&["MKAT", "MKGT", "MRGS"]);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m[i][i], 100.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert_eq!(m[0][2], 25.0);
        assert_eq!(m[1][2], 50.0);
    }
}
