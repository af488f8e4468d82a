//! Tax computation engine.
//!
//! The `engine` module turns a tagged [`TaxInput`] into a [`TaxResult`]
//! by dispatching to the matching [`TaxCalculator`].  Every failure is
//! also recorded in a per-thread last-error slot so callers that only
//! see "no result" can still ask what went wrong.

use crate::breakdown::TaxResult;
use crate::error::TaxError;
use crate::models::TaxInput;
use crate::tax::{Pph21Calculator, Pph22Calculator, PpnCalculator, PpnbmCalculator, TaxCalculator};
use std::cell::RefCell;

/// Build identifier reported by bindings.
pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

const NO_ERROR: &str = "No error";

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Message of the most recent failure on this thread.
pub fn last_error() -> String {
    LAST_ERROR.with(|slot| slot.borrow().clone().unwrap_or_else(|| NO_ERROR.to_string()))
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().take());
}

fn set_last_error(err: &TaxError) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.to_string()));
}

/// Runs one computation.
///
/// `None` stands for a binding that received no input at all and fails
/// with [`TaxError::MissingInput`].  A successful call leaves the
/// last-error slot untouched.
pub fn compute(input: Option<&TaxInput>) -> Result<TaxResult, TaxError> {
    let outcome = match input {
        Some(TaxInput::Pph21(input)) => run(&Pph21Calculator, Some(input)),
        Some(TaxInput::Pph22(input)) => run(&Pph22Calculator, Some(input)),
        Some(TaxInput::Ppn(input)) => run(&PpnCalculator, Some(input)),
        Some(TaxInput::Ppnbm(input)) => run(&PpnbmCalculator, Some(input)),
        None => {
            tracing::warn!("computation requested without input");
            Err(TaxError::MissingInput)
        }
    };

    if let Err(err) = &outcome {
        set_last_error(err);
    }
    outcome
}

fn run<C: TaxCalculator>(calculator: &C, input: Option<&C::Input>) -> Result<TaxResult, TaxError> {
    match calculator.calculate_opt(input) {
        Ok(result) => {
            tracing::info!(
                tax = C::NAME,
                total = %result.total_tax(),
                rows = result.row_count(),
                "tax computed"
            );
            Ok(result)
        }
        Err(err) => {
            tracing::error!(tax = C::NAME, code = err.code(), error = %err, "tax computation failed");
            Err(err)
        }
    }
}
