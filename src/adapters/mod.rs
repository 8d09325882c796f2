pub mod compound;
pub mod erc20;
pub mod makerdao;
pub mod one_hop;
pub mod traits;

pub use compound::CompoundAdapter;
pub use erc20::Erc20Adapter;
pub use makerdao::MakerDaoAdapter;
pub use one_hop::OneHopAdapter;
pub use traits::*;
