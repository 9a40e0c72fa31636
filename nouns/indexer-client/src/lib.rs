mod client;
mod error;
mod normalize;
mod types;

pub use {client::*, error::*, normalize::*, types::*};
