//! PPnBM: luxury-goods sales tax levied alongside PPN on the same base.

use super::TaxCalculator;
use crate::breakdown::TaxResult;
use crate::error::TaxError;
use crate::models::PpnbmInput;

pub struct PpnbmCalculator;

impl TaxCalculator for PpnbmCalculator {
    type Input = PpnbmInput;

    const NAME: &'static str = "ppnbm";

    fn calculate(&self, input: &PpnbmInput) -> Result<TaxResult, TaxError> {
        let mut result = TaxResult::new()?;
        let ppn = input.dpp.mul(input.ppn_rate);
        let ppnbm = input.dpp.mul(input.ppnbm_rate);
        let total = ppn + ppnbm;

        let rows = result.breakdown_mut();
        rows.add_section("PPN dan PPnBM")?;
        rows.add_currency("DPP", input.dpp, None)?;
        rows.add_percent("Tarif PPN", input.ppn_rate, None)?;
        rows.add_currency("PPN", ppn, None)?;
        rows.add_percent("Tarif PPnBM", input.ppnbm_rate, None)?;
        rows.add_currency("PPnBM", ppnbm, None)?;
        rows.add_total("Total PPN + PPnBM", total)?;

        result.set_total_tax(total);
        tracing::debug!(%ppn, %ppnbm, "ppnbm computed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::ValueKind;
    use crate::money::Money;

    #[test]
    fn reports_both_taxes_and_their_sum() {
        let input = PpnbmInput {
            dpp: Money::from_whole(100_000_000),
            ppn_rate: Money::from_raw(1_100),
            ppnbm_rate: Money::from_raw(2_000),
        };
        let result = PpnbmCalculator.calculate(&input).unwrap();
        assert_eq!(result.row_count(), 7);
        assert_eq!(result.value(3), Money::from_whole(11_000_000));
        assert_eq!(result.value(5), Money::from_whole(20_000_000));
        assert_eq!(result.kind(4), ValueKind::Percent);
        assert_eq!(result.total_tax(), Money::from_whole(31_000_000));
        assert_eq!(result.value(6), result.total_tax());
    }

    #[test]
    fn zero_luxury_rate_leaves_only_vat() {
        let input = PpnbmInput {
            dpp: Money::from_whole(1_000),
            ppn_rate: Money::from_raw(1_200),
            ppnbm_rate: Money::ZERO,
        };
        let result = PpnbmCalculator.calculate(&input).unwrap();
        assert_eq!(result.total_tax(), Money::from_whole(120));
    }
}
