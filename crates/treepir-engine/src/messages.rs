//! Values exchanged between client and server

use crate::lwe::{round_to_plaintext, Matrix, Seed};

/// Client key material the server needs before preprocessing
///
/// Carries the seed of the client's public matrix; the server expands it to
/// compute that client's hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationKey {
    pub seed: Seed,
}

/// Server hint: database matrix times the client's public matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint(pub Matrix);

/// Encrypted column selector, one coefficient per database column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(pub Vec<u32>);

/// Encrypted column, one coefficient per database row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(pub Vec<u32>);

/// Decrypted but not yet rounded column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext(pub Vec<u32>);

/// Size in bytes when sent over a wire
pub trait CommunicationCost {
    fn size_bytes(&self) -> usize;
}

impl CommunicationCost for EvaluationKey {
    fn size_bytes(&self) -> usize {
        self.seed.len()
    }
}

impl CommunicationCost for Hint {
    fn size_bytes(&self) -> usize {
        self.0.rows() * self.0.cols() * 4
    }
}

impl CommunicationCost for Query {
    fn size_bytes(&self) -> usize {
        self.0.len() * 4
    }
}

impl CommunicationCost for Reply {
    fn size_bytes(&self) -> usize {
        self.0.len() * 4
    }
}

/// Round every coefficient back to its byte
///
/// Byte `offset * item_size + j` of the output is byte `j` of the item in
/// group `offset` of the queried column.
pub fn plaintext_to_bytes(plaintext: &Plaintext) -> Vec<u8> {
    plaintext.0.iter().map(|&c| round_to_plaintext(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::encode_plaintext;

    #[test]
    fn test_plaintext_to_bytes() {
        let plaintext = Plaintext(vec![
            encode_plaintext(3),
            encode_plaintext(200).wrapping_add(41),
            encode_plaintext(0).wrapping_sub(17),
        ]);
        assert_eq!(plaintext_to_bytes(&plaintext), vec![3, 200, 0]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Query(vec![0; 10]).size_bytes(), 40);
        assert_eq!(Reply(vec![0; 3]).size_bytes(), 12);
        assert_eq!(EvaluationKey { seed: [0; 32] }.size_bytes(), 32);
        assert_eq!(Hint(Matrix::zeros(4, 8)).size_bytes(), 128);
    }
}
