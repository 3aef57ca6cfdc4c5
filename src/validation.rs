//! Pure validation of submitted note forms.
use crate::{
    is_valid_slug, slugify, FormField, NoteForm, NotesError, Result, MAX_SLUG_LENGTH,
    MAX_TITLE_LENGTH,
};

/// Form data that passed validation; the slug is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNote {
    pub title: String,
    pub text: String,
    pub slug: String,
}

/// Checks a creation form and resolves its slug.
///
/// Slug uniqueness is not checked here: it needs the store and is enforced
/// when the note is inserted.
pub fn validate_note_form(form: NoteForm) -> Result<ValidatedNote> {
    let title = validate_title(form.title)?;

    let slug = match form.slug.filter(|s| !s.trim().is_empty()) {
        Some(slug) => {
            let slug = slug.trim().to_string();
            check_slug_length(&slug)?;
            if !is_valid_slug(&slug) {
                return Err(NotesError::validation(
                    FormField::Slug,
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                ));
            }
            slug
        }
        None => {
            let slug = slugify(&title);
            if slug.is_empty() {
                return Err(NotesError::validation(
                    FormField::Slug,
                    "Could not derive a slug from the title, enter one explicitly.",
                ));
            }
            slug
        }
    };

    Ok(ValidatedNote {
        title,
        text: form.text,
        slug,
    })
}

/// Checks a title submitted on its own, as the edit form does.
pub fn validate_title(title: String) -> Result<String> {
    if title.trim().is_empty() {
        return Err(NotesError::validation(
            FormField::Title,
            "This field is required.",
        ));
    }
    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(NotesError::validation(
            FormField::Title,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_TITLE_LENGTH, length
            ),
        ));
    }
    Ok(title)
}

fn check_slug_length(slug: &str) -> Result<()> {
    let length = slug.chars().count();
    if length > MAX_SLUG_LENGTH {
        return Err(NotesError::validation(
            FormField::Slug,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_SLUG_LENGTH, length
            ),
        ));
    }
    Ok(())
}
