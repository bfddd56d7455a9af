pub mod data;
pub mod error;
pub mod id;
pub mod text;

mod log;

pub use data::recipe::{Recipe, RecipeFields};
pub use id::RecipeId;
pub use log::{logging_stdout, logging_stdout_with};
