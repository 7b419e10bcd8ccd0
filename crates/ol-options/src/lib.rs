pub mod candidates;
pub mod chain;
pub mod contract;
pub mod moneyness;
pub mod payoff;
pub mod premium;
pub mod scenario;
pub mod volatility;

pub use candidates::*;
pub use chain::*;
pub use contract::*;
pub use moneyness::*;
pub use payoff::*;
pub use premium::*;
pub use scenario::*;
pub use volatility::*;
