//! Built-in schemas.

mod bread;
mod recipe;

pub use bread::bread_schema;
pub use recipe::recipe_schema;
