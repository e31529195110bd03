//! Model description: JSON document, programmatic builder, file loader.

pub mod builder;
pub mod document;
pub mod loader;
