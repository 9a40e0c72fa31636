mod chain;
mod wallet;

pub use {chain::*, wallet::*};
