//! Internal helpers for input validation and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation reports field errors the same way.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, FieldError, ResultEngine};

/// Collapse runs of whitespace and trim. Returns `None` for blank input.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Uniqueness key for names and titles: case, spacing and diacritics are
/// ignored, so "Crème  Brûlée" and "creme brulee" collide.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        out.extend(ch.to_lowercase());
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Escape `LIKE` wildcards in user text; the pattern uses `\` as escape.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Accumulates field errors so a request reports every problem at once.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Non-blank text, normalized for display.
    pub(crate) fn text(&mut self, field: &str, value: &str) -> String {
        match normalize_display(value) {
            Some(value) => value,
            None => {
                self.fail(field, format!("{field} is required"));
                String::new()
            }
        }
    }

    /// Text that must be present when given (partial updates).
    pub(crate) fn optional_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        value.map(|value| self.text(field, value))
    }

    pub(crate) fn id(&mut self, field: &str, value: Option<i32>) -> i32 {
        match value {
            Some(id) if id > 0 => id,
            Some(_) => {
                self.fail(field, format!("{field} must be a positive id"));
                0
            }
            None => {
                self.fail(field, format!("{field} is required"));
                0
            }
        }
    }

    pub(crate) fn non_negative(&mut self, field: &str, value: Option<i32>) -> i32 {
        match value {
            Some(n) if n >= 0 => n,
            Some(_) => {
                self.fail(field, format!("{field} must not be negative"));
                0
            }
            None => {
                self.fail(field, format!("{field} is required"));
                0
            }
        }
    }

    pub(crate) fn positive(&mut self, field: &str, value: Option<i32>) -> i32 {
        match value {
            Some(n) if n > 0 => n,
            Some(_) => {
                self.fail(field, format!("{field} must be greater than zero"));
                0
            }
            None => {
                self.fail(field, format!("{field} is required"));
                0
            }
        }
    }

    pub(crate) fn email(&mut self, value: &str) -> String {
        let email = normalize_email(value);
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            self.fail("email", "email must be a valid address");
        }
        email
    }

    pub(crate) fn password(&mut self, field: &str, value: &str) {
        if value.chars().count() < 8 {
            self.fail(field, format!("{field} must be at least 8 characters"));
        }
    }

    pub(crate) fn finish(self) -> ResultEngine<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self.errors))
        }
    }
}
