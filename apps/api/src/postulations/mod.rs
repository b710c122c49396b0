pub mod fields;
pub mod handlers;
