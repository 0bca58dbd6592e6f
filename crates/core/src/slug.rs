//! Slug generation: display name → URL-safe identifier.

/// Derive a URL-safe slug from a display name.
///
/// - Latin letters with diacritics are folded to ASCII (`"Crème Brûlée"` → `"creme-brulee"`).
/// - Whitespace and the separators `· / _ , : ; -` become a single `-`.
/// - Anything else outside `[a-z0-9]` is dropped.
/// - The result never starts or ends with `-` and never contains `--`.
///
/// The function is pure and idempotent: `generate_slug(&generate_slug(s)) == generate_slug(s)`.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if is_separator(ch) {
            pending_dash = true;
            continue;
        }

        let keep = ch.is_ascii_alphanumeric();
        let folded = if keep { None } else { fold(ch) };
        if !keep && folded.is_none() {
            continue;
        }

        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;

        match folded {
            Some(ascii) => slug.push_str(ascii),
            None => slug.push(ch),
        }
    }

    slug
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '·' | '/' | '_' | ',' | ':' | ';')
}

/// ASCII replacement for a lowercase Latin letter with diacritics.
fn fold(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'á' | 'ä' | 'â' | 'à' | 'ã' | 'å' | 'ā' | 'ą' => "a",
        'č' | 'ç' | 'ć' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'é' | 'ě' | 'ë' | 'è' | 'ê' | 'ẽ' | 'ĕ' | 'ȇ' | 'ē' | 'ę' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ň' | 'ñ' | 'ń' => "n",
        'ó' | 'ö' | 'ò' | 'ô' | 'õ' | 'ø' | 'ő' | 'ō' => "o",
        'ř' | 'ŕ' => "r",
        'š' | 'ś' => "s",
        'ť' => "t",
        'ú' | 'ů' | 'ü' | 'ù' | 'û' | 'ű' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ž' | 'ź' | 'ż' => "z",
        'þ' => "b",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(generate_slug("Red Shoes"), "red-shoes");
    }

    #[test]
    fn collapses_separator_runs_and_trims_edges() {
        assert_eq!(generate_slug("  Men's  /  Running__Shoes --  "), "mens-running-shoes");
    }

    #[test]
    fn folds_latin_diacritics() {
        assert_eq!(generate_slug("Crème Brûlée"), "creme-brulee");
        assert_eq!(generate_slug("Straße"), "strasse");
    }

    #[test]
    fn drops_symbols_entirely() {
        assert_eq!(generate_slug("100% Cotton T-Shirt!"), "100-cotton-t-shirt");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn empty_name_gives_empty_slug() {
        assert_eq!(generate_slug(""), "");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn output_is_url_safe(name in "\\PC{0,64}") {
                let slug = generate_slug(&name);
                prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            #[test]
            fn generation_is_idempotent(name in "\\PC{0,64}") {
                let once = generate_slug(&name);
                prop_assert_eq!(generate_slug(&once), once.clone());
            }

            #[test]
            fn generation_is_deterministic(name in "[A-Za-z0-9 ]{0,32}") {
                prop_assert_eq!(generate_slug(&name), generate_slug(&name));
            }
        }
    }
}
