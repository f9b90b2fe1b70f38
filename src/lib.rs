pub mod config;
pub mod delay;
pub mod error;
pub mod fetch;
pub mod histogram;
pub mod model;
pub mod output;
pub mod parser;
pub mod punctuality;
pub mod stations;
pub mod stats;

pub use error::{Error, Result};
