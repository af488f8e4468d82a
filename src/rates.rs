//! Statutory rate tables.
//!
//! Three kinds of static data live here:
//!
//! - **PTKP**: the annual tax-exempt threshold per filing status.
//! - **Pasal 17**: progressive brackets.  Each bracket stores its
//!   *width*, not a cumulative ceiling.
//! - **TER**: effective monthly and daily withholding rates, stored as
//!   ascending ceilings.  The last ceiling is [`Money::MAX`] so a lookup
//!   always finds an entry.
//!
//! Rates are [`Money`] fractions: `rate(500)` is 5%.

use crate::models::{PtkpStatus, TerCategory};
use crate::money::Money;
use serde::Serialize;

/// One row of a ceiling-indexed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
    /// Highest amount (inclusive) this rate applies to.
    pub ceiling: Money,
    pub rate: Money,
}

/// One progressive bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    /// Amount of income taxed at `rate` before moving to the next bracket.
    pub width: Money,
    pub rate: Money,
}

/// Tax attributed to a single Pasal 17 bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerTax {
    pub rate: Money,
    /// Portion of the taxable amount that fell in this bracket.
    pub taxable: Money,
    pub tax: Money,
}

const fn rupiah(whole: i64) -> Money {
    Money::from_whole(whole)
}

const fn rate(raw: i64) -> Money {
    Money::from_raw(raw)
}

const fn entry(ceiling_rupiah: i64, rate_raw: i64) -> RateEntry {
    RateEntry {
        ceiling: rupiah(ceiling_rupiah),
        rate: rate(rate_raw),
    }
}

const fn last(rate_raw: i64) -> RateEntry {
    RateEntry {
        ceiling: Money::MAX,
        rate: rate(rate_raw),
    }
}

// ---------------------------------------------------------------------------
// PTKP
// ---------------------------------------------------------------------------

/// Annual PTKP amount for a filing status.
pub const fn ptkp(status: PtkpStatus) -> Money {
    match status {
        PtkpStatus::Tk0 => rupiah(54_000_000),
        PtkpStatus::Tk1 => rupiah(58_500_000),
        PtkpStatus::Tk2 => rupiah(63_000_000),
        PtkpStatus::Tk3 => rupiah(67_500_000),
        PtkpStatus::K0 => rupiah(58_500_000),
        PtkpStatus::K1 => rupiah(63_000_000),
        PtkpStatus::K2 => rupiah(67_500_000),
        PtkpStatus::K3 => rupiah(72_000_000),
    }
}

// ---------------------------------------------------------------------------
// Pasal 17
// ---------------------------------------------------------------------------

pub static PASAL17_BRACKETS: [Bracket; 5] = [
    Bracket { width: rupiah(60_000_000), rate: rate(500) },
    Bracket { width: rupiah(190_000_000), rate: rate(1_500) },
    Bracket { width: rupiah(250_000_000), rate: rate(2_500) },
    Bracket { width: rupiah(4_500_000_000), rate: rate(3_000) },
    Bracket { width: Money::MAX, rate: rate(3_500) },
];

/// Splits `pkp` across the Pasal 17 brackets.  Only brackets that
/// receive a non-zero slice are returned.
pub fn pasal17_layers(pkp: Money) -> Vec<LayerTax> {
    let mut layers = Vec::with_capacity(PASAL17_BRACKETS.len());
    let mut remaining = pkp;
    for bracket in &PASAL17_BRACKETS {
        if remaining <= Money::ZERO {
            break;
        }
        let taxable = remaining.min(bracket.width);
        layers.push(LayerTax {
            rate: bracket.rate,
            taxable,
            tax: taxable.mul(bracket.rate),
        });
        remaining = remaining - taxable;
    }
    layers
}

/// Progressive tax on a taxable amount.
pub fn pasal17(pkp: Money) -> Money {
    let mut tax = Money::ZERO;
    let mut remaining = pkp;
    for bracket in &PASAL17_BRACKETS {
        if remaining <= Money::ZERO {
            break;
        }
        let taxable = remaining.min(bracket.width);
        tax = tax + taxable.mul(bracket.rate);
        remaining = remaining - taxable;
    }
    tax
}

// ---------------------------------------------------------------------------
// TER tables
// ---------------------------------------------------------------------------

static TER_MONTHLY_A: [RateEntry; 44] = [
    entry(5_400_000, 0),
    entry(5_650_000, 25),
    entry(5_950_000, 50),
    entry(6_300_000, 75),
    entry(6_750_000, 100),
    entry(7_500_000, 125),
    entry(8_550_000, 150),
    entry(9_650_000, 175),
    entry(10_050_000, 200),
    entry(10_350_000, 225),
    entry(10_700_000, 250),
    entry(11_050_000, 300),
    entry(11_600_000, 350),
    entry(12_500_000, 400),
    entry(13_750_000, 500),
    entry(15_100_000, 600),
    entry(16_950_000, 700),
    entry(19_750_000, 800),
    entry(24_150_000, 900),
    entry(26_450_000, 1_000),
    entry(28_000_000, 1_100),
    entry(30_050_000, 1_200),
    entry(32_400_000, 1_300),
    entry(35_400_000, 1_400),
    entry(39_100_000, 1_500),
    entry(43_850_000, 1_600),
    entry(47_800_000, 1_700),
    entry(51_400_000, 1_800),
    entry(56_300_000, 1_900),
    entry(62_200_000, 2_000),
    entry(68_600_000, 2_100),
    entry(77_500_000, 2_200),
    entry(89_000_000, 2_300),
    entry(103_000_000, 2_400),
    entry(125_000_000, 2_500),
    entry(157_000_000, 2_600),
    entry(206_000_000, 2_700),
    entry(337_000_000, 2_800),
    entry(454_000_000, 2_900),
    entry(550_000_000, 3_000),
    entry(695_000_000, 3_100),
    entry(910_000_000, 3_200),
    entry(1_400_000_000, 3_300),
    last(3_400),
];

static TER_MONTHLY_B: [RateEntry; 40] = [
    entry(6_200_000, 0),
    entry(6_500_000, 25),
    entry(6_850_000, 50),
    entry(7_300_000, 75),
    entry(9_200_000, 100),
    entry(10_750_000, 150),
    entry(11_250_000, 200),
    entry(11_600_000, 250),
    entry(12_600_000, 300),
    entry(13_600_000, 400),
    entry(14_950_000, 500),
    entry(16_400_000, 600),
    entry(18_450_000, 700),
    entry(21_850_000, 800),
    entry(26_000_000, 900),
    entry(27_700_000, 1_000),
    entry(29_350_000, 1_100),
    entry(31_450_000, 1_200),
    entry(33_950_000, 1_300),
    entry(37_100_000, 1_400),
    entry(41_100_000, 1_500),
    entry(45_800_000, 1_600),
    entry(49_500_000, 1_700),
    entry(53_800_000, 1_800),
    entry(58_500_000, 1_900),
    entry(64_000_000, 2_000),
    entry(71_000_000, 2_100),
    entry(80_000_000, 2_200),
    entry(93_000_000, 2_300),
    entry(109_000_000, 2_400),
    entry(129_000_000, 2_500),
    entry(163_000_000, 2_600),
    entry(211_000_000, 2_700),
    entry(374_000_000, 2_800),
    entry(459_000_000, 2_900),
    entry(555_000_000, 3_000),
    entry(704_000_000, 3_100),
    entry(957_000_000, 3_200),
    entry(1_405_000_000, 3_300),
    last(3_400),
];

static TER_MONTHLY_C: [RateEntry; 41] = [
    entry(6_600_000, 0),
    entry(6_950_000, 25),
    entry(7_350_000, 50),
    entry(7_800_000, 75),
    entry(8_850_000, 100),
    entry(9_800_000, 125),
    entry(10_950_000, 150),
    entry(11_200_000, 175),
    entry(12_050_000, 200),
    entry(12_950_000, 300),
    entry(14_150_000, 400),
    entry(15_550_000, 500),
    entry(17_050_000, 600),
    entry(19_500_000, 700),
    entry(22_700_000, 800),
    entry(26_600_000, 900),
    entry(28_100_000, 1_000),
    entry(30_100_000, 1_100),
    entry(32_600_000, 1_200),
    entry(35_400_000, 1_300),
    entry(38_900_000, 1_400),
    entry(43_000_000, 1_500),
    entry(47_400_000, 1_600),
    entry(51_200_000, 1_700),
    entry(55_800_000, 1_800),
    entry(60_400_000, 1_900),
    entry(66_700_000, 2_000),
    entry(74_500_000, 2_100),
    entry(83_200_000, 2_200),
    entry(95_600_000, 2_300),
    entry(110_000_000, 2_400),
    entry(134_000_000, 2_500),
    entry(169_000_000, 2_600),
    entry(221_000_000, 2_700),
    entry(390_000_000, 2_800),
    entry(463_000_000, 2_900),
    entry(561_000_000, 3_000),
    entry(709_000_000, 3_100),
    entry(965_000_000, 3_200),
    entry(1_419_000_000, 3_300),
    last(3_400),
];

static TER_DAILY_A: [RateEntry; 3] = [entry(750_000, 25), entry(2_500_000, 150), last(200)];
static TER_DAILY_B: [RateEntry; 3] = [entry(750_000, 25), entry(2_500_000, 125), last(175)];
static TER_DAILY_C: [RateEntry; 3] = [entry(750_000, 25), entry(2_500_000, 100), last(150)];

pub fn ter_monthly_table(category: TerCategory) -> &'static [RateEntry] {
    match category {
        TerCategory::A => &TER_MONTHLY_A,
        TerCategory::B => &TER_MONTHLY_B,
        TerCategory::C => &TER_MONTHLY_C,
    }
}

pub fn ter_daily_table(category: TerCategory) -> &'static [RateEntry] {
    match category {
        TerCategory::A => &TER_DAILY_A,
        TerCategory::B => &TER_DAILY_B,
        TerCategory::C => &TER_DAILY_C,
    }
}

/// First entry whose ceiling is at least `amount` wins, so an amount equal
/// to a ceiling takes that entry's rate.  Falls back to the last rate if
/// nothing matches, and to zero for an empty table.
pub fn lookup_rate(table: &[RateEntry], amount: Money) -> Money {
    table
        .iter()
        .find(|entry| amount <= entry.ceiling)
        .or_else(|| table.last())
        .map_or(Money::ZERO, |entry| entry.rate)
}

/// Monthly TER rate for a gross monthly income.
pub fn ter_monthly_rate(category: TerCategory, gross: Money) -> Money {
    lookup_rate(ter_monthly_table(category), gross)
}

/// Daily TER rate for a gross daily (per payment) income.
pub fn ter_daily_rate(category: TerCategory, gross: Money) -> Money {
    lookup_rate(ter_daily_table(category), gross)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_ascending(table: &[RateEntry]) {
        assert!(table.windows(2).all(|w| w[0].ceiling < w[1].ceiling));
        assert_eq!(table.last().map(|e| e.ceiling), Some(Money::MAX));
    }

    #[test]
    fn tables_are_ascending_and_terminated() {
        for category in [TerCategory::A, TerCategory::B, TerCategory::C] {
            assert_ascending(ter_monthly_table(category));
            assert_ascending(ter_daily_table(category));
        }
        assert_eq!(ter_monthly_table(TerCategory::A).len(), 44);
        assert_eq!(ter_monthly_table(TerCategory::B).len(), 40);
        assert_eq!(ter_monthly_table(TerCategory::C).len(), 41);
    }

    #[rstest]
    #[case(PtkpStatus::Tk0, 54_000_000)]
    #[case(PtkpStatus::Tk3, 67_500_000)]
    #[case(PtkpStatus::K0, 58_500_000)]
    #[case(PtkpStatus::K3, 72_000_000)]
    fn ptkp_amounts(#[case] status: PtkpStatus, #[case] rupiah: i64) {
        assert_eq!(ptkp(status), Money::from_whole(rupiah));
    }

    #[test]
    fn out_of_range_ptkp_code_uses_first_entry() {
        assert_eq!(ptkp(PtkpStatus::from_code(42)), Money::from_whole(54_000_000));
    }

    // An amount equal to a ceiling belongs to that entry, one unit more
    // moves to the next.
    #[rstest]
    #[case(TerCategory::A, 5_400_000, 0, 25)]
    #[case(TerCategory::A, 10_050_000, 200, 225)]
    #[case(TerCategory::B, 6_200_000, 0, 25)]
    #[case(TerCategory::B, 9_200_000, 100, 150)]
    #[case(TerCategory::C, 12_050_000, 200, 300)]
    #[case(TerCategory::C, 1_419_000_000, 3_300, 3_400)]
    fn monthly_ceiling_is_inclusive(
        #[case] category: TerCategory,
        #[case] ceiling: i64,
        #[case] at: i64,
        #[case] above: i64,
    ) {
        let ceiling = Money::from_whole(ceiling);
        assert_eq!(ter_monthly_rate(category, ceiling), Money::from_raw(at));
        assert_eq!(
            ter_monthly_rate(category, ceiling + Money::from_raw(1)),
            Money::from_raw(above)
        );
    }

    #[test]
    fn every_ceiling_returns_its_own_rate() {
        for category in [TerCategory::A, TerCategory::B, TerCategory::C] {
            for entry in ter_monthly_table(category) {
                assert_eq!(ter_monthly_rate(category, entry.ceiling), entry.rate);
            }
        }
    }

    #[test]
    fn daily_rates() {
        assert_eq!(ter_daily_rate(TerCategory::A, Money::from_whole(750_000)), Money::from_raw(25));
        assert_eq!(ter_daily_rate(TerCategory::B, Money::from_whole(1_000_000)), Money::from_raw(125));
        assert_eq!(ter_daily_rate(TerCategory::C, Money::from_whole(3_000_000)), Money::from_raw(150));
    }

    #[test]
    fn lookup_falls_back_to_last_rate() {
        let table = [entry(100, 10), entry(200, 20)];
        assert_eq!(lookup_rate(&table, Money::from_whole(500)), Money::from_raw(20));
        assert_eq!(lookup_rate(&[], Money::from_whole(500)), Money::ZERO);
    }

    #[test]
    fn pasal17_below_first_bracket() {
        let pkp = Money::from_whole(50_000_000);
        assert_eq!(pasal17(pkp), Money::from_whole(2_500_000));
        let layers = pasal17_layers(pkp);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].rate, Money::from_raw(500));
    }

    #[test]
    fn pasal17_at_boundary_is_full_lower_brackets() {
        assert_eq!(pasal17(Money::from_whole(60_000_000)), Money::from_whole(3_000_000));
        // 3M + 190M * 15%
        assert_eq!(pasal17(Money::from_whole(250_000_000)), Money::from_whole(31_500_000));
    }

    #[test]
    fn pasal17_spanning_three_brackets() {
        let pkp = Money::from_whole(300_000_000);
        let layers = pasal17_layers(pkp);
        assert_eq!(layers.len(), 3);
        assert!(layers.iter().all(|l| l.tax > Money::ZERO));
        assert_eq!(layers[2].taxable, Money::from_whole(50_000_000));
        // 3M + 28.5M + 12.5M
        assert_eq!(pasal17(pkp), Money::from_whole(44_000_000));
        assert_eq!(layers.iter().map(|l| l.tax).sum::<Money>(), pasal17(pkp));
    }

    #[test]
    fn pasal17_top_bracket_consumes_everything() {
        // 3M + 28.5M + 62.5M + 1.35B + 5B * 35%
        assert_eq!(
            pasal17(Money::from_whole(10_000_000_000)),
            Money::from_whole(3_194_000_000)
        );
    }

    #[test]
    fn pasal17_zero_and_negative() {
        assert_eq!(pasal17(Money::ZERO), Money::ZERO);
        assert_eq!(pasal17(Money::from_whole(-5)), Money::ZERO);
        assert!(pasal17_layers(Money::ZERO).is_empty());
    }
}
