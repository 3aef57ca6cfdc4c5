//! Slug generation.
//!
//! Slugs are derived from note titles: lowercase ASCII, words joined with
//! hyphens, Cyrillic letters transliterated and everything else dropped.

/// Maximum length of a slug, in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

/// Appended to a slug that is already in use.
pub const SLUG_TAKEN_WARNING: &str = " — already exists, choose a different one";

/// Derives a URL-safe slug from `title`.
///
/// The result is deterministic, at most [`MAX_SLUG_LENGTH`] characters long and
/// may be empty when the title has nothing transliterable in it. Uniqueness is
/// the caller's concern.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    let lowered = title.to_lowercase().replace('&', " and ");
    for c in lowered.chars() {
        if c.is_whitespace() || c == '-' {
            pending_separator = true;
            continue;
        }

        let piece = match transliterate(c) {
            Some(piece) => piece,
            None if c.is_ascii_alphanumeric() || c == '_' => {
                push_piece(&mut slug, &mut pending_separator, c.encode_utf8(&mut [0; 4]));
                continue;
            }
            None => continue,
        };
        if !piece.is_empty() {
            push_piece(&mut slug, &mut pending_separator, piece);
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}

fn push_piece(slug: &mut String, pending_separator: &mut bool, piece: &str) {
    if *pending_separator && !slug.is_empty() {
        slug.push('-');
    }
    *pending_separator = false;
    slug.push_str(piece);
}

/// Latin spelling of a lowercase Cyrillic letter.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        _ => return None,
    };
    Some(latin)
}

/// Whether `slug` only contains letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Message attached to the slug field when `slug` is already taken.
pub fn slug_taken_message(slug: &str) -> String {
    format!("{}{}", slug, SLUG_TAKEN_WARNING)
}
