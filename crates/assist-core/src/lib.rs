pub mod assistant;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod paths;
pub mod recipe;

pub use error::{AssistError, Result};
