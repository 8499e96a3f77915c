//! Word-label reduction into field strings.

use invox_core::{strip_tag_prefix, FieldMap, OUTSIDE};

/// Collapse per-word labels into a field map.
///
/// Words are visited in detection order. `O` words are skipped, one leading
/// `B-`/`I-` prefix is stripped, and words sharing a field key concatenate
/// with a single space. When labels and words differ in length (the tagger
/// truncated an overlong sequence) the extra tail on either side is ignored.
///
/// Non-adjacent runs of the same key merge into one value. With a
/// well-behaved tagger each field appears as one contiguous span, so the
/// distinction rarely matters in practice.
pub fn aggregate(words: &[String], labels: &[String]) -> FieldMap {
    let mut fields = FieldMap::new();
    for (word, label) in words.iter().zip(labels) {
        if label == OUTSIDE {
            continue;
        }
        let key = strip_tag_prefix(label);
        match fields.get_mut(key) {
            Some(value) => {
                value.push(' ');
                value.push_str(word);
            }
            None => {
                fields.insert(key.to_string(), word.clone());
            }
        }
    }
    fields
}
