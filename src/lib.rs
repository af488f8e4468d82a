//! Pajak Engine library crate.
//!
//! This crate exposes a fixed-point Indonesian tax engine: PPh 21/26
//! on employment income, PPh 22 withholding, PPN and PPnBM.  Every
//! computation returns the tax due together with a breakdown ledger
//! that explains it row by row.  External applications may depend on
//! the `pajak_engine` crate and call `engine::compute` directly, use a
//! calculator from `tax`, or embed the API via `api::build_router`.

pub mod api;
pub mod breakdown;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod money;
pub mod rates;
pub mod tax;

pub use breakdown::{Breakdown, BreakdownRow, RowVariant, TaxResult, ValueKind};
pub use error::TaxError;
pub use models::TaxInput;
pub use money::Money;
