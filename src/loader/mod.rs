pub mod aggregator;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod registrar;

pub use error::{LoaderError, Result};
