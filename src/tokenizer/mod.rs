//! # Review Encoder
//!
//! Turns free text into the fixed-length integer sequence both models were
//! trained on:
//!
//! | id            | meaning                         |
//! |---------------|---------------------------------|
//! | `0`           | padding                         |
//! | `1`           | start marker (never emitted)    |
//! | `2`           | unknown word                    |
//! | `3..=10002`   | vocabulary rank + 3             |

mod utilities;

pub use utilities::normalize;

use crate::vocabulary::Vocabulary;

/// Length of every encoded sequence
pub const SEQUENCE_LENGTH: usize = 500;
/// Only ranks below this are encodable
pub const VOCABULARY_CAP: u32 = 10_000;
/// Padding id
pub const PAD: u32 = 0;
/// Reserved start marker
pub const START: u32 = 1;
/// Unknown-word id
pub const UNKNOWN: u32 = 2;
/// Offset added to vocabulary ranks
pub const INDEX_OFFSET: u32 = 3;

/// A model input: token ids, right-padded with [`PAD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    tokens: Vec<u32>,
}

impl EncodedSequence {
    /// Wraps raw ids as-is. [`encode`] is the only producer that guarantees
    /// [`SEQUENCE_LENGTH`]; scorers check the length themselves.
    pub fn from_tokens(tokens: Vec<u32>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of ids before the trailing padding run.
    pub fn content_len(&self) -> usize {
        self.tokens.iter().rposition(|&t| t != PAD).map_or(0, |i| i + 1)
    }
}

/// Maps one token to its model id.
///
/// Words ranked at or past [`VOCABULARY_CAP`] yield `None` and are dropped
/// from the sequence instead of becoming [`UNKNOWN`].
fn token_id(vocabulary: &Vocabulary, word: &str) -> Option<u32> {
    match vocabulary.lookup(word) {
        Some(rank) if rank < VOCABULARY_CAP => Some(rank + INDEX_OFFSET),
        Some(_) => None,
        None => Some(UNKNOWN),
    }
}

/// Encodes review text into exactly [`SEQUENCE_LENGTH`] ids.
///
/// Empty tokens never reach the vocabulary: splitting uses runs of
/// whitespace, so leading/trailing whitespace and all-punctuation input
/// contribute nothing.
pub fn encode(vocabulary: &Vocabulary, text: &str) -> EncodedSequence {
    let normalized = normalize(text);

    let mut tokens: Vec<u32> = normalized
        .split_whitespace()
        .filter_map(|word| token_id(vocabulary, word))
        .take(SEQUENCE_LENGTH)
        .collect();

    tokens.resize(SEQUENCE_LENGTH, PAD);

    EncodedSequence { tokens }
}
