pub mod contract_handle;
pub mod ethereum_client;
pub mod wallet;

pub use contract_handle::ContractHandle;
pub use ethereum_client::{EthereumClient, EthereumError};
pub use wallet::{WalletEvent, WalletSession};
