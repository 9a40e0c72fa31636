mod creator;
mod error;
mod filter;
mod service;
mod session;
mod source;
mod stats;

pub use {creator::*, error::*, filter::*, service::*, session::*, source::*, stats::*};
