//! Request field validation.
//!
//! Everything is rejected here, before reaching the queue.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldError;

/// Tags are restricted to what the build scripts can safely interpolate into
/// a command line.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("tag regex"));

/// Compose variants with a checked-in docker-compose file.
pub const SUPPORTED_COMPOSE_TYPES: &[&str] = &["default"];

pub fn branch_tag(value: &str, errors: &mut Vec<FieldError>) {
    tag("branch_tag", value, errors);
}

pub fn image_tag(value: &str, errors: &mut Vec<FieldError>) {
    tag("image_tag", value, errors);
}

pub fn compose_type(value: &str, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError {
            field: "compose_type",
            message: "must not be empty".to_string(),
        });
    } else if !SUPPORTED_COMPOSE_TYPES.contains(&value) {
        errors.push(FieldError {
            field: "compose_type",
            message: format!("\"{value}\" is not supported"),
        });
    }
}

fn tag(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError {
            field,
            message: "must not be empty".to_string(),
        });
    } else if !TAG_RE.is_match(value) {
        errors.push(FieldError {
            field,
            message: "may only contain alphanumerics, dots, underscores, and dashes".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_tags() {
        let mut errors = Vec::new();
        branch_tag("feature-42.rc_1", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_rejects_empty_and_shell_hostile_tags() {
        let mut errors = Vec::new();
        branch_tag("", &mut errors);
        branch_tag("a;rm -rf /", &mut errors);
        branch_tag("$(whoami)", &mut errors);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_rejects_unknown_compose_type() {
        let mut errors = Vec::new();
        compose_type("default", &mut errors);
        assert!(errors.is_empty());

        compose_type("exotic", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "compose_type");
    }
}
