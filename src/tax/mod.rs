//! Tax calculators.
//!
//! The `tax` module defines the [`TaxCalculator`] trait, which every tax
//! type implements, and one submodule per tax.  A calculator is a pure
//! function from its input to a [`TaxResult`]: it appends its working to
//! the breakdown in a fixed order and sets the total last.

pub mod pph21;
pub mod pph22;
pub mod ppn;
pub mod ppnbm;

pub use pph21::Pph21Calculator;
pub use pph22::Pph22Calculator;
pub use ppn::PpnCalculator;
pub use ppnbm::PpnbmCalculator;

use crate::breakdown::TaxResult;
use crate::error::TaxError;

/// A calculator turns one kind of input into a [`TaxResult`].
///
/// Calculators hold no state, so they are `Send + Sync` and may be
/// shared freely.
pub trait TaxCalculator: Send + Sync {
    type Input;

    /// Short name used in logs, e.g. `"pph21"`.
    const NAME: &'static str;

    fn calculate(&self, input: &Self::Input) -> Result<TaxResult, TaxError>;

    /// Entry point for bindings that may have no input to pass.
    fn calculate_opt(&self, input: Option<&Self::Input>) -> Result<TaxResult, TaxError> {
        match input {
            Some(input) => self.calculate(input),
            None => {
                tracing::warn!(tax = Self::NAME, "calculation requested without input");
                Err(TaxError::MissingInput)
            }
        }
    }
}
