use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks left behind by canonical decomposition.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// URL slug of a title: NFD-decomposed, marks dropped, lowercase ASCII words joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    let folded = title.nfd().filter(|c| !is_combining_mark(*c));
    for c in folded.flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Guía de Contratación IT"), "guia-de-contratacion-it");
    }

    #[test]
    fn test_trims_and_collapses_separators() {
        assert_eq!(slugify("  ¿Qué es un Tech Recruiter?  "), "que-es-un-tech-recruiter");
        assert_eq!(slugify("C++ & Rust -- 2024"), "c-rust-2024");
    }

    #[test]
    fn test_spanish_letters() {
        assert_eq!(slugify("Año Pingüino Niño"), "ano-pinguino-nino");
    }

    #[test]
    fn test_decomposed_input_matches_precomposed() {
        assert_eq!(slugify("Re\u{301}sume\u{301} te\u{301}cnico"), "resume-tecnico");
        assert_eq!(slugify("Résumé técnico"), "resume-tecnico");
    }

    #[test]
    fn test_letters_with_stacked_marks() {
        assert_eq!(slugify("Nguyễn Ǎ"), "nguyen-a");
        assert_eq!(slugify("Łódź"), "odz");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
