//! Fixed-length input assembly for the token-classification model.

use invox_core::NormalizedBox;

/// A tokenized word sequence with parallel per-token layout boxes.
///
/// Invariant: every vector has the same length; after [`TokenSequence::fit`]
/// that length is exactly the requested `max_len`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TokenSequence {
    pub input_ids: Vec<i64>,
    pub type_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    /// One `[x0, y0, x1, y1]` box per token; a word's box is repeated across
    /// all of its sub-tokens, special positions carry the zero box.
    pub boxes: Vec<[i64; 4]>,
    /// Originating word index per token; `None` for special/pad positions.
    pub word_ids: Vec<Option<usize>>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Truncate to the first `max_len` positions, then right-pad with
    /// `pad_id`, attention 0, the zero box, and no word index.
    pub fn fit(mut self, max_len: usize, pad_id: i64) -> Self {
        self.input_ids.truncate(max_len);
        self.type_ids.truncate(max_len);
        self.attention_mask.truncate(max_len);
        self.boxes.truncate(max_len);
        self.word_ids.truncate(max_len);

        while self.input_ids.len() < max_len {
            self.input_ids.push(pad_id);
            self.type_ids.push(0);
            self.attention_mask.push(0);
            self.boxes.push(NormalizedBox::ZERO.to_array());
            self.word_ids.push(None);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize) -> TokenSequence {
        TokenSequence {
            input_ids: (0..n as i64).collect(),
            type_ids: vec![0; n],
            attention_mask: vec![1; n],
            boxes: vec![[1, 2, 3, 4]; n],
            word_ids: (0..n).map(Some).collect(),
        }
    }

    #[test]
    fn fit_pads_short_sequences() {
        let fitted = seq(3).fit(8, 0);
        assert_eq!(fitted.len(), 8);
        assert_eq!(fitted.input_ids[3..], [0, 0, 0, 0, 0]);
        assert_eq!(fitted.attention_mask, vec![1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(fitted.boxes[7], [0, 0, 0, 0]);
        assert_eq!(fitted.word_ids[7], None);
    }

    #[test]
    fn fit_truncates_long_sequences() {
        let fitted = seq(10).fit(4, 0);
        assert_eq!(fitted.len(), 4);
        assert_eq!(fitted.input_ids, vec![0, 1, 2, 3]);
        assert_eq!(fitted.attention_mask, vec![1; 4]);
        assert_eq!(fitted.word_ids[3], Some(3));
    }

    #[test]
    fn fit_keeps_all_vectors_aligned() {
        for n in [0, 1, 4, 9] {
            let fitted = seq(n).fit(6, 99);
            assert_eq!(fitted.input_ids.len(), 6);
            assert_eq!(fitted.type_ids.len(), 6);
            assert_eq!(fitted.attention_mask.len(), 6);
            assert_eq!(fitted.boxes.len(), 6);
            assert_eq!(fitted.word_ids.len(), 6);
        }
    }

    #[test]
    fn fit_uses_given_pad_id() {
        let fitted = seq(1).fit(3, 7);
        assert_eq!(fitted.input_ids, vec![0, 7, 7]);
    }

    #[test]
    fn fit_exact_length_is_identity() {
        let original = seq(5);
        assert_eq!(original.clone().fit(5, 0), original);
    }
}
