//! URL slug derivation from display names.

/// Derive a URL slug from a display name.
///
/// Lowercases the input, strips combining diacritics (so accented product
/// names slugify to plain ASCII), folds every other non-alphanumeric run
/// into a single dash, and trims leading/trailing dashes.
///
/// Callers append the entity id (`"{slug}-{id}"`) to make the stored slug
/// unique; this function itself makes no uniqueness promise.
///
/// # Examples
///
/// ```
/// use orchard_core::slug::slugify;
///
/// assert_eq!(slugify("Cold Brew  Coffee"), "cold-brew-coffee");
/// assert_eq!(slugify("Crème Brûlée!"), "creme-brulee");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    // Unicode-lowercase first so uppercase accented letters hit the fold
    // table ('È' -> 'è' -> 'e')
    for c in name.to_lowercase().chars().map(fold_char) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Map an accented Latin character to its base letter; pass everything
/// else through unchanged. Covers the Latin-1/Latin Extended-A letters
/// that show up in product and category names.
const fn fold_char(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'ĭ' | 'į' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' => 's',
        'ť' => 't',
        'ù'..='ü' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_name() {
        assert_eq!(slugify("Espresso Machine"), "espresso-machine");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("A  --  B"), "a-b");
        assert_eq!(slugify("one_two.three/four"), "one-two-three-four");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("  Hello World!  "), "hello-world");
        assert_eq!(slugify("---x---"), "x");
    }

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Jalapeño"), "jalapeno");
        assert_eq!(slugify("CRÈME"), "creme");
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(slugify("iPhone 15 Pro"), "iphone-15-pro");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
