pub mod gas;
pub mod position;
pub mod rates;
pub mod token;

pub use gas::*;
pub use position::*;
pub use rates::*;
pub use token::*;
