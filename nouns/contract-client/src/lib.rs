mod abi;
mod client;
mod error;
mod rpc;
mod traits;
mod transaction;

pub use {abi::*, client::*, error::*, rpc::*, traits::*, transaction::*};
