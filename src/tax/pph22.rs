//! PPh 22: withholding on a tax base at a single rate.

use super::TaxCalculator;
use crate::breakdown::TaxResult;
use crate::error::TaxError;
use crate::models::Pph22Input;

pub struct Pph22Calculator;

impl TaxCalculator for Pph22Calculator {
    type Input = Pph22Input;

    const NAME: &'static str = "pph22";

    fn calculate(&self, input: &Pph22Input) -> Result<TaxResult, TaxError> {
        let mut result = TaxResult::new()?;
        let tax = input.dpp.mul(input.rate);

        let rows = result.breakdown_mut();
        rows.add_section("PPh 22")?;
        rows.add_currency("DPP", input.dpp, None)?;
        rows.add_percent("Tarif", input.rate, None)?;
        rows.add_total("PPh 22", tax)?;

        result.set_total_tax(tax);
        tracing::debug!(total = %tax, "pph22 computed");
        Ok(result)
    }
}
