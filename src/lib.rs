//! Core library for the shipment-loader command line application.
//!
//! A load run reads two CSV inputs into SQLite. The product stage registers
//! every product name in a deduplicated catalog and indexes which products
//! belong to which shipment; the shipment stage collapses that index into
//! per-product quantities for each shipment row. Store and CSV adapters live
//! under [`loader::io`], the shared types in [`loader::model`], the stage
//! handlers in [`loader::registrar`] and [`loader::aggregator`], and the run
//! orchestration in [`loader::pipeline`].

pub mod loader;

pub use loader::{
    LoaderError, Result, aggregator, config, error, io, model, pipeline, registrar,
};
