//! Title, author and content validation for book and chapter input.

use std::fmt;

use thiserror::Error;

pub const MIN_TITLE_LEN: usize = 3;
pub const CHAPTER_TITLE_MAX: usize = 200;
pub const BOOK_TITLE_MAX: usize = 300;
pub const CONTENT_MAX: usize = 100_000;
pub const AUTHOR_LEN: std::ops::RangeInclusive<usize> = 3..=100;

/// Which input a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
    Author,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Content => "content",
            Field::Author => "author",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(Field),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
}

/// Trim, collapse whitespace runs to one space and strip angle brackets.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['<', '>'], "")
}

pub fn validate_title(title: &str, max_len: usize) -> Result<String, ValidationError> {
    let normalized = normalize_text(title);
    let len = normalized.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty(Field::Title));
    }
    if len < MIN_TITLE_LEN {
        return Err(ValidationError::TooShort {
            field: Field::Title,
            min: MIN_TITLE_LEN,
        });
    }
    if len > max_len {
        return Err(ValidationError::TooLong {
            field: Field::Title,
            max: max_len,
        });
    }
    Ok(normalized)
}

/// Content is only trimmed; markup is left to the sanitizer.
pub fn validate_content(content: &str, max_len: usize) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(Field::Content));
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: Field::Content,
            max: max_len,
        });
    }
    Ok(trimmed.to_string())
}

pub fn validate_author(author: &str) -> Result<String, ValidationError> {
    let normalized = normalize_text(author);
    let len = normalized.chars().count();
    if len < *AUTHOR_LEN.start() {
        return Err(ValidationError::TooShort {
            field: Field::Author,
            min: *AUTHOR_LEN.start(),
        });
    }
    if len > *AUTHOR_LEN.end() {
        return Err(ValidationError::TooLong {
            field: Field::Author,
            max: *AUTHOR_LEN.end(),
        });
    }
    Ok(normalized)
}

/// A chapter whose title and content both passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidChapter {
    pub title: String,
    pub content: String,
}

/// Validate one chapter, reporting every problem at once.
///
/// `index` is zero-based; messages use the one-based chapter number.
pub fn validate_chapter(
    index: usize,
    title: &str,
    content: &str,
) -> Result<ValidChapter, Vec<String>> {
    let title = validate_title(title, CHAPTER_TITLE_MAX);
    let content = validate_content(content, CONTENT_MAX);

    match (title, content) {
        (Ok(title), Ok(content)) => Ok(ValidChapter { title, content }),
        (title, content) => Err([title.err(), content.err()]
            .into_iter()
            .flatten()
            .map(|e| format!("Chapter {}: {e}", index + 1))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \n\t b  "), "a b");
        assert_eq!(normalize_text("<b>Title</b>"), "bTitle/b");
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(validate_title("  My   Book ", 300), Ok("My Book".into()));
        assert_eq!(validate_title("   ", 300), Err(ValidationError::Empty(Field::Title)));
        assert!(matches!(
            validate_title("ab", 300),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert!(matches!(
            validate_title(&"x".repeat(201), CHAPTER_TITLE_MAX),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_content_rules() {
        assert_eq!(validate_content(" <p>x</p> ", CONTENT_MAX), Ok("<p>x</p>".into()));
        assert!(validate_content("\n", CONTENT_MAX).is_err());
        assert!(validate_content("abcd", 3).is_err());
    }

    #[test]
    fn test_author_length() {
        assert!(validate_author("Al").is_err());
        assert_eq!(validate_author(" Ana  Lima "), Ok("Ana Lima".into()));
        assert!(validate_author(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_chapter_collects_all_errors() {
        let errors = validate_chapter(1, "x", "  ").unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Chapter 2: title must be at least 3 characters",
                "Chapter 2: content must not be empty",
            ]
        );
        let ok = validate_chapter(0, "Intro", "<p>hi</p>").unwrap();
        assert_eq!(ok.title, "Intro");
    }
}
