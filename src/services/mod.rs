pub mod gas_price_oracle;
pub mod migration_service;
pub mod position_poller;
pub mod rate_calculator;
pub mod transaction_service;

pub use gas_price_oracle::*;
pub use migration_service::*;
pub use position_poller::*;
pub use rate_calculator::*;
pub use transaction_service::*;
