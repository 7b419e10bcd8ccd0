pub mod analysis;
pub mod gateway;
pub mod loaders;
pub mod scanner;

pub use analysis::*;
pub use gateway::*;
pub use loaders::*;
pub use scanner::*;
