//! Data models for the Pajak Engine.
//!
//! The `models` module defines the serialisable inputs of every tax
//! computation together with the small enumerations they are keyed by
//! (filing status, scheme, TER category).  These types derive
//! `Serialize` and `Deserialize` so that bindings can pass them around
//! as JSON.  Amounts are [`Money`] values, i.e. scaled integers.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who receives the income taxed under PPh 21/26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    /// Permanent employee (pegawai tetap).
    PegawaiTetap,
    /// Retiree receiving a periodic pension (pensiunan).
    Pensiunan,
    /// Non-permanent or daily worker (pegawai tidak tetap).
    PegawaiTidakTetap,
    /// Non-employee service provider (bukan pegawai).
    BukanPegawai,
    /// Activity participant (peserta kegiatan).
    PesertaKegiatan,
    /// Lump-sum pension programme withdrawal (program pensiun).
    ProgramPensiun,
    /// Former employee (mantan pegawai).
    MantanPegawai,
    /// Foreign tax subject, taxed under PPh 26.
    Wpln,
}

impl SubjectType {
    /// Subjects taxed on an annual, PTKP-based pipeline.  Everyone else is
    /// taxed payment by payment.
    pub const fn is_annual(self) -> bool {
        matches!(self, SubjectType::PegawaiTetap | SubjectType::Pensiunan)
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubjectType::PegawaiTetap => "Pegawai tetap",
            SubjectType::Pensiunan => "Pensiunan",
            SubjectType::PegawaiTidakTetap => "Pegawai tidak tetap",
            SubjectType::BukanPegawai => "Bukan pegawai",
            SubjectType::PesertaKegiatan => "Peserta kegiatan",
            SubjectType::ProgramPensiun => "Program pensiun",
            SubjectType::MantanPegawai => "Mantan pegawai",
            SubjectType::Wpln => "WPLN (PPh 26)",
        };
        f.write_str(name)
    }
}

/// PTKP filing status: marital status and number of dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PtkpStatus {
    #[serde(rename = "TK/0")]
    Tk0,
    #[serde(rename = "TK/1")]
    Tk1,
    #[serde(rename = "TK/2")]
    Tk2,
    #[serde(rename = "TK/3")]
    Tk3,
    #[serde(rename = "K/0")]
    K0,
    #[serde(rename = "K/1")]
    K1,
    #[serde(rename = "K/2")]
    K2,
    #[serde(rename = "K/3")]
    K3,
}

impl PtkpStatus {
    pub const ALL: [PtkpStatus; 8] = [
        PtkpStatus::Tk0,
        PtkpStatus::Tk1,
        PtkpStatus::Tk2,
        PtkpStatus::Tk3,
        PtkpStatus::K0,
        PtkpStatus::K1,
        PtkpStatus::K2,
        PtkpStatus::K3,
    ];

    /// Converts a binding's integer code (0 = TK/0 … 7 = K/3).  Codes out
    /// of range fall back to TK/0.
    pub fn from_code(code: i64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_else(|| {
                tracing::warn!(code, "unknown PTKP status code, using TK/0");
                PtkpStatus::Tk0
            })
    }

    /// TER category a status belongs to under PP 58/2023.
    pub const fn ter_category(self) -> TerCategory {
        match self {
            PtkpStatus::Tk0 | PtkpStatus::Tk1 | PtkpStatus::K0 => TerCategory::A,
            PtkpStatus::Tk2 | PtkpStatus::Tk3 | PtkpStatus::K1 => TerCategory::B,
            PtkpStatus::K2 | PtkpStatus::K3 => TerCategory::C,
        }
    }
}

impl fmt::Display for PtkpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PtkpStatus::Tk0 => "TK/0",
            PtkpStatus::Tk1 => "TK/1",
            PtkpStatus::Tk2 => "TK/2",
            PtkpStatus::Tk3 => "TK/3",
            PtkpStatus::K0 => "K/0",
            PtkpStatus::K1 => "K/1",
            PtkpStatus::K2 => "K/2",
            PtkpStatus::K3 => "K/3",
        };
        f.write_str(name)
    }
}

/// Which PPh 21 method applies to permanent employees and pensioners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pph21Scheme {
    /// Annual progressive computation (skema lama).
    Pasal17,
    /// Monthly effective rates with a final-period true-up.
    Ter,
}

/// TER rate table selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerCategory {
    A,
    B,
    C,
}

impl TerCategory {
    /// Converts a binding's integer code (0 = A, 1 = B, 2 = C).  Codes out
    /// of range fall back to A.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => TerCategory::A,
            1 => TerCategory::B,
            2 => TerCategory::C,
            _ => {
                tracing::warn!(code, "unknown TER category code, using A");
                TerCategory::A
            }
        }
    }
}

impl fmt::Display for TerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerCategory::A => f.write_str("A"),
            TerCategory::B => f.write_str("B"),
            TerCategory::C => f.write_str("C"),
        }
    }
}

/// A one-off payment on top of the regular salary (THR, annual bonus…).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pph21Bonus {
    /// Month the bonus is paid, 1–12.
    pub month: u8,
    pub amount: Money,
    /// Free-text name shown in the breakdown.
    #[serde(default)]
    pub name: String,
}

/// Input to the PPh 21/26 calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pph21Input {
    pub subject_type: SubjectType,
    /// Gross pay per month (or per payment for subjects taxed payment by
    /// payment).
    pub bruto_monthly: Money,
    /// Months paid in the tax year, 1–12.  For payment-by-payment
    /// subjects this is the number of payments.
    pub months_paid: u8,
    /// Monthly pension contribution borne by the employee.
    #[serde(default)]
    pub pension_contribution: Money,
    /// Zakat or mandatory donation paid through the employer over the
    /// whole period.
    #[serde(default)]
    pub zakat_or_donation: Money,
    pub ptkp_status: PtkpStatus,
    pub scheme: Pph21Scheme,
    pub ter_category: TerCategory,
    /// Bonuses in payment order.  `None` and an empty list both mean no
    /// bonuses.
    #[serde(default)]
    pub bonuses: Option<Vec<Pph21Bonus>>,
}

impl Pph21Input {
    /// A permanent employee paid for twelve months, TK/0, Pasal 17.
    pub fn new(bruto_monthly: Money) -> Self {
        Pph21Input {
            subject_type: SubjectType::PegawaiTetap,
            bruto_monthly,
            months_paid: 12,
            pension_contribution: Money::ZERO,
            zakat_or_donation: Money::ZERO,
            ptkp_status: PtkpStatus::Tk0,
            scheme: Pph21Scheme::Pasal17,
            ter_category: TerCategory::A,
            bonuses: None,
        }
    }

    pub fn with_subject_type(mut self, subject_type: SubjectType) -> Self {
        self.subject_type = subject_type;
        self
    }

    pub fn with_months_paid(mut self, months: u8) -> Self {
        self.months_paid = months;
        self
    }

    pub fn with_ptkp_status(mut self, status: PtkpStatus) -> Self {
        self.ptkp_status = status;
        self
    }

    pub fn with_scheme(mut self, scheme: Pph21Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_ter_category(mut self, category: TerCategory) -> Self {
        self.ter_category = category;
        self
    }

    pub fn with_pension_contribution(mut self, amount: Money) -> Self {
        self.pension_contribution = amount;
        self
    }

    pub fn with_zakat_or_donation(mut self, amount: Money) -> Self {
        self.zakat_or_donation = amount;
        self
    }

    pub fn with_bonus(mut self, month: u8, amount: Money, name: impl Into<String>) -> Self {
        self.bonuses.get_or_insert_with(Vec::new).push(Pph21Bonus {
            month,
            amount,
            name: name.into(),
        });
        self
    }

    /// Bonuses in supplied order; empty when none were given.
    pub fn bonuses(&self) -> &[Pph21Bonus] {
        self.bonuses.as_deref().unwrap_or_default()
    }
}

/// Input to the PPh 22 calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pph22Input {
    pub dpp: Money,
    pub rate: Money,
}

/// Whether a PPN amount is on top of the price or already inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PpnMode {
    /// `dpp` is the tax base; VAT is added on top.
    #[default]
    Exclusive,
    /// `dpp` is a VAT-inclusive price; the base is extracted from it.
    Inclusive,
}

/// Input to the PPN calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpnInput {
    /// Tax base, or the tax-inclusive price in [`PpnMode::Inclusive`].
    pub dpp: Money,
    pub rate: Money,
    #[serde(default)]
    pub mode: PpnMode,
}

/// Input to the PPnBM calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpnbmInput {
    pub dpp: Money,
    pub ppn_rate: Money,
    pub ppnbm_rate: Money,
}

/// Any computation the engine can run, tagged by tax type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tax", rename_all = "lowercase")]
pub enum TaxInput {
    Pph21(Pph21Input),
    Pph22(Pph22Input),
    Ppn(PpnInput),
    Ppnbm(PpnbmInput),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, PtkpStatus::Tk0)]
    #[case(3, PtkpStatus::Tk3)]
    #[case(7, PtkpStatus::K3)]
    #[case(8, PtkpStatus::Tk0)]
    #[case(-1, PtkpStatus::Tk0)]
    fn ptkp_codes_fall_back_to_tk0(#[case] code: i64, #[case] expected: PtkpStatus) {
        assert_eq!(PtkpStatus::from_code(code), expected);
    }

    #[rstest]
    #[case(1, TerCategory::B)]
    #[case(2, TerCategory::C)]
    #[case(3, TerCategory::A)]
    #[case(-5, TerCategory::A)]
    fn ter_codes_fall_back_to_a(#[case] code: i64, #[case] expected: TerCategory) {
        assert_eq!(TerCategory::from_code(code), expected);
    }

    #[test]
    fn ter_category_by_status() {
        assert_eq!(PtkpStatus::K0.ter_category(), TerCategory::A);
        assert_eq!(PtkpStatus::K1.ter_category(), TerCategory::B);
        assert_eq!(PtkpStatus::Tk3.ter_category(), TerCategory::B);
        assert_eq!(PtkpStatus::K2.ter_category(), TerCategory::C);
    }

    #[test]
    fn null_bonuses_mean_none() {
        let input: Pph21Input = serde_json::from_value(json!({
            "subject_type": "pegawai_tetap",
            "bruto_monthly": 100_000_000_000i64,
            "months_paid": 12,
            "ptkp_status": "K/1",
            "scheme": "ter",
            "ter_category": "B",
            "bonuses": null
        }))
        .unwrap();
        assert!(input.bonuses().is_empty());
        assert_eq!(input.ptkp_status, PtkpStatus::K1);
        assert_eq!(input.pension_contribution, Money::ZERO);
    }

    #[test]
    fn tagged_input_round_trips() {
        let input = TaxInput::Ppn(PpnInput {
            dpp: Money::from_whole(100),
            rate: Money::from_raw(1_100),
            mode: PpnMode::Inclusive,
        });
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["tax"], "ppn");
        assert_eq!(value["mode"], "inclusive");
        let back: TaxInput = serde_json::from_value(value).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn builder_keeps_bonus_order() {
        let input = Pph21Input::new(Money::from_whole(1))
            .with_bonus(4, Money::from_whole(10), "THR")
            .with_bonus(12, Money::from_whole(5), "Bonus tahunan");
        let names: Vec<&str> = input.bonuses().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["THR", "Bonus tahunan"]);
    }
}
