use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Folds a tag for comparison: decomposes, drops accents, lowercases.
///
/// `"Crème Brûlée"` and `"creme brulee"` fold to the same string.
pub fn fold_tag(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[inline]
pub fn tags_match(a: &str, b: &str) -> bool {
    fold_tag(a) == fold_tag(b)
}
