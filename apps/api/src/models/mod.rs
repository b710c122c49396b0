pub mod account;
pub mod jd;
pub mod post;
pub mod postulation;

/// True when a required text field is missing or blank.
pub(crate) fn blank(value: &str) -> bool {
    value.trim().is_empty()
}
