pub mod build;
pub mod schema;
pub mod validate;
