//! PPN (VAT), exclusive or inclusive of the price.

use super::TaxCalculator;
use crate::breakdown::TaxResult;
use crate::error::TaxError;
use crate::models::{PpnInput, PpnMode};
use crate::money::{Money, SCALE};

pub struct PpnCalculator;

impl TaxCalculator for PpnCalculator {
    type Input = PpnInput;

    const NAME: &'static str = "ppn";

    fn calculate(&self, input: &PpnInput) -> Result<TaxResult, TaxError> {
        let (dpp, ppn) = match input.mode {
            PpnMode::Exclusive => (input.dpp, input.dpp.mul(input.rate)),
            PpnMode::Inclusive => {
                let dpp = dpp_from_inclusive(input.dpp, input.rate).ok_or_else(|| {
                    TaxError::InvalidInput(format!(
                        "PPN rate {} cannot be extracted from an inclusive price",
                        input.rate.to_percent_string()
                    ))
                })?;
                (dpp, input.dpp - dpp)
            }
        };

        let mut result = TaxResult::new()?;
        let rows = result.breakdown_mut();
        rows.add_section("PPN")?;
        if input.mode == PpnMode::Inclusive {
            rows.add_currency("Harga termasuk PPN", input.dpp, None)?;
        }
        rows.add_currency("DPP", dpp, None)?;
        rows.add_percent("Tarif PPN", input.rate, None)?;
        rows.add_total("PPN", ppn)?;

        result.set_total_tax(ppn);
        tracing::debug!(mode = ?input.mode, total = %ppn, "ppn computed");
        Ok(result)
    }
}

/// Extracts the base from a VAT-inclusive price: `price × SCALE /
/// (SCALE + rate)`.  `None` when the rate is -100% or lower.
pub fn dpp_from_inclusive(price: Money, rate: Money) -> Option<Money> {
    let divisor = SCALE + rate.raw();
    (divisor > 0).then(|| price.percent(SCALE, divisor))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELEVEN_PERCENT: Money = Money::from_raw(1_100);

    #[test]
    fn exclusive_adds_rate_on_top() {
        let input = PpnInput {
            dpp: Money::from_whole(100),
            rate: ELEVEN_PERCENT,
            mode: PpnMode::Exclusive,
        };
        let result = PpnCalculator.calculate(&input).unwrap();
        assert_eq!(result.total_tax(), Money::from_whole(11));
        assert_eq!(result.row_count(), 4);
        assert_eq!(result.label(1), "DPP");
        assert_eq!(result.value(1), Money::from_whole(100));
    }

    #[test]
    fn inclusive_extracts_base() {
        let input = PpnInput {
            dpp: Money::from_whole(111),
            rate: ELEVEN_PERCENT,
            mode: PpnMode::Inclusive,
        };
        let result = PpnCalculator.calculate(&input).unwrap();
        assert_eq!(result.total_tax(), Money::from_whole(11));
        assert_eq!(result.row_count(), 5);
        assert_eq!(result.value(1), Money::from_whole(111));
        assert_eq!(result.label(2), "DPP");
        assert_eq!(result.value(2), Money::from_whole(100));
    }

    #[test]
    fn inclusive_truncates_the_base() {
        // 100 / 1.11 = 90.0900(90...) -> DPP 90.0900, PPN 9.9100
        let input = PpnInput {
            dpp: Money::from_whole(100),
            rate: ELEVEN_PERCENT,
            mode: PpnMode::Inclusive,
        };
        let result = PpnCalculator.calculate(&input).unwrap();
        assert_eq!(result.value(2), Money::from_raw(900_900));
        assert_eq!(result.total_tax(), Money::from_raw(99_100));
        assert_eq!(result.value(2) + result.total_tax(), Money::from_whole(100));
    }

    #[test]
    fn inclusive_rejects_rates_at_or_below_minus_one_hundred_percent() {
        let input = PpnInput {
            dpp: Money::from_whole(100),
            rate: Money::from_raw(-SCALE),
            mode: PpnMode::Inclusive,
        };
        assert!(matches!(
            PpnCalculator.calculate(&input),
            Err(TaxError::InvalidInput(_))
        ));
        assert_eq!(dpp_from_inclusive(Money::from_whole(1), Money::from_raw(-SCALE)), None);
    }

    #[test]
    fn base_helper_matches_calculator() {
        assert_eq!(
            dpp_from_inclusive(Money::from_whole(111), ELEVEN_PERCENT),
            Some(Money::from_whole(100))
        );
    }
}
