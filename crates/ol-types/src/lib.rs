pub mod market;
pub mod errors;
pub mod config;

pub use market::*;
pub use errors::*;
pub use config::*;
