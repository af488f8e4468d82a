//! PPh 21/26: income tax withheld on employment and service income.
//!
//! Two families of subjects are handled differently:
//!
//! - **Permanent employees and pensioners** are taxed on an annual
//!   pipeline: gross income less occupational cost, pension
//!   contributions and zakat gives net income; net income less PTKP,
//!   rounded down to the thousand, gives PKP; Pasal 17 applies to PKP.
//!   Under the Pasal 17 scheme each bonus is shown with the extra tax it
//!   causes.  Under the TER scheme every month but the last withholds
//!   at the monthly effective rate, and the last month settles the
//!   difference to the annual Pasal 17 figure.
//! - **Everyone else** is taxed payment by payment: each regular
//!   payment and each bonus goes through its own rate pass.

use super::TaxCalculator;
use crate::breakdown::{Breakdown, TaxResult};
use crate::error::TaxError;
use crate::models::{Pph21Bonus, Pph21Input, Pph21Scheme, SubjectType};
use crate::money::Money;
use crate::rates;

/// Occupational (or pension) cost deduction, 5% of gross.
const OCCUPATIONAL_COST_RATE: Money = Money::from_raw(500);
const EMPLOYEE_COST_CAP_MONTHLY: Money = Money::from_whole(500_000);
const PENSIONER_COST_CAP_MONTHLY: Money = Money::from_whole(200_000);
const PPH26_RATE: Money = Money::from_raw(2_000);
const MAX_MONTHS: u8 = 12;

pub struct Pph21Calculator;

impl TaxCalculator for Pph21Calculator {
    type Input = Pph21Input;

    const NAME: &'static str = "pph21";

    fn calculate(&self, input: &Pph21Input) -> Result<TaxResult, TaxError> {
        if !(1..=MAX_MONTHS).contains(&input.months_paid) {
            return Err(TaxError::InvalidInput(format!(
                "months_paid must be between 1 and {MAX_MONTHS}, got {}",
                input.months_paid
            )));
        }
        check_range(input)?;

        let mut result = TaxResult::new()?;
        let rows = result.breakdown_mut();
        let total = if input.subject_type.is_annual() {
            match input.scheme {
                Pph21Scheme::Pasal17 => progressive(input, rows)?,
                Pph21Scheme::Ter => effective_rate(input, rows)?,
            }
        } else {
            per_payment(input, rows)?
        };

        result.set_total_tax(total);
        tracing::debug!(
            subject = %input.subject_type,
            scheme = ?input.scheme,
            bonuses = input.bonuses().len(),
            total = %total,
            "pph21 computed"
        );
        Ok(result)
    }
}

/// Year figures for subjects on the annual pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualFigures {
    pub bruto: Money,
    /// Occupational cost (biaya jabatan) or pension cost (biaya pensiun).
    pub cost: Money,
    pub pension: Money,
    pub zakat: Money,
    pub neto: Money,
    pub ptkp: Money,
    pub pkp: Money,
    pub tax: Money,
}

impl AnnualFigures {
    /// Runs the annual pipeline on a given gross income.
    pub fn compute(input: &Pph21Input, bruto: Money) -> Self {
        let months = i64::from(input.months_paid);
        let (_, cap_monthly) = cost_deduction(input.subject_type);
        let cost = bruto.mul(OCCUPATIONAL_COST_RATE).min(cap_monthly.mul_int(months));
        let pension = input.pension_contribution.mul_int(months);
        let zakat = input.zakat_or_donation;
        let neto = (bruto - cost - pension - zakat).max(Money::ZERO);
        let ptkp = rates::ptkp(input.ptkp_status);
        let pkp = (neto - ptkp).max(Money::ZERO).round_down_thousand();
        AnnualFigures {
            bruto,
            cost,
            pension,
            zakat,
            neto,
            ptkp,
            pkp,
            tax: rates::pasal17(pkp),
        }
    }
}

/// Period totals must fit in the fixed-point range before any rows are
/// computed from them.
fn check_range(input: &Pph21Input) -> Result<(), TaxError> {
    let months = i64::from(input.months_paid);
    let bruto = input.bruto_monthly.checked_mul_int(months).and_then(|salary| {
        input
            .bonuses()
            .iter()
            .try_fold(salary, |total, bonus| total.checked_add(bonus.amount))
    });
    let pension = input.pension_contribution.checked_mul_int(months);
    match (bruto, pension) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(TaxError::InvalidInput(
            "income over the period exceeds the supported amount range".to_string(),
        )),
    }
}

fn cost_deduction(subject: SubjectType) -> (&'static str, Money) {
    match subject {
        SubjectType::Pensiunan => ("Biaya pensiun", PENSIONER_COST_CAP_MONTHLY),
        _ => ("Biaya jabatan", EMPLOYEE_COST_CAP_MONTHLY),
    }
}

fn salary_bruto(input: &Pph21Input) -> Money {
    input.bruto_monthly.mul_int(i64::from(input.months_paid))
}

fn bonus_total(input: &Pph21Input) -> Money {
    input.bonuses().iter().map(|bonus| bonus.amount).sum()
}

fn bonus_label(bonus: &Pph21Bonus) -> &str {
    if bonus.name.trim().is_empty() {
        "Bonus"
    } else {
        &bonus.name
    }
}

fn bonus_note(bonus: &Pph21Bonus) -> Option<String> {
    Some(format!("Bulan {}", bonus.month))
}

fn layer_rows(rows: &mut Breakdown, pkp: Money) -> Result<(), TaxError> {
    for layer in rates::pasal17_layers(pkp) {
        let percent = layer.rate.to_percent_string();
        let note = format!("{percent} x {}", layer.taxable.to_id_string());
        rows.add_currency(format!("Lapisan {percent}"), layer.tax, Some(note))?;
    }
    Ok(())
}

/// Gross income, deductions, PKP and the Pasal 17 layers of `annual`.
fn annual_rows(rows: &mut Breakdown, input: &Pph21Input, annual: &AnnualFigures) -> Result<(), TaxError> {
    let months = input.months_paid;

    rows.add_section("Penghasilan Bruto")?;
    rows.add_currency(
        "Gaji bruto sebulan",
        input.bruto_monthly,
        Some(format!("x {months} bulan")),
    )?;
    rows.add_currency("Gaji bruto", salary_bruto(input), None)?;
    for bonus in input.bonuses() {
        rows.add_currency(bonus_label(bonus), bonus.amount, bonus_note(bonus))?;
    }
    rows.add_subtotal("Total penghasilan bruto", annual.bruto)?;
    rows.add_spacer()?;

    let (cost_label, cap) = cost_deduction(input.subject_type);
    rows.add_section("Pengurang")?;
    rows.add_currency(
        cost_label,
        annual.cost,
        Some(format!("5%, maks. {} sebulan", cap.to_id_string())),
    )?;
    rows.add_currency(
        "Iuran pensiun",
        annual.pension,
        Some(format!("{} x {months} bulan", input.pension_contribution.to_id_string())),
    )?;
    rows.add_currency("Zakat/sumbangan wajib", annual.zakat, None)?;
    rows.add_subtotal("Penghasilan neto", annual.neto)?;
    rows.add_spacer()?;

    rows.add_section("Penghasilan Kena Pajak")?;
    rows.add_currency("PTKP", annual.ptkp, Some(input.ptkp_status.to_string()))?;
    rows.add_subtotal("PKP (dibulatkan ke bawah ribuan)", annual.pkp)?;
    rows.add_spacer()?;

    rows.add_section("PPh 21 Pasal 17")?;
    layer_rows(rows, annual.pkp)?;
    rows.add_subtotal("PPh 21 setahun", annual.tax)
}

/// Pasal 17 scheme.  Salary is taxed first; each bonus then adds the
/// tax difference it causes, in the order supplied.
fn progressive(input: &Pph21Input, rows: &mut Breakdown) -> Result<Money, TaxError> {
    let salary = salary_bruto(input);
    let annual = AnnualFigures::compute(input, salary + bonus_total(input));
    annual_rows(rows, input, &annual)?;

    if !input.bonuses().is_empty() {
        rows.add_spacer()?;
        rows.add_section("Alokasi PPh 21")?;
        let mut bruto = salary;
        let mut previous = AnnualFigures::compute(input, bruto).tax;
        rows.add_currency("PPh 21 atas gaji", previous, None)?;
        for bonus in input.bonuses() {
            bruto = bruto + bonus.amount;
            let with_bonus = AnnualFigures::compute(input, bruto).tax;
            rows.add_currency(
                format!("PPh 21 atas {}", bonus_label(bonus)),
                with_bonus - previous,
                bonus_note(bonus),
            )?;
            previous = with_bonus;
        }
    }

    rows.add_spacer()?;
    rows.add_currency(
        "PPh 21 rata-rata sebulan",
        annual.tax.div(i64::from(input.months_paid)),
        None,
    )?;
    rows.add_total("PPh 21 terutang", annual.tax)?;
    Ok(annual.tax)
}

/// TER scheme.  Months before the last withhold `gross × TER rate`, where
/// gross includes bonuses paid that month.  Bonuses dated in the last
/// month or outside the paid months fall into the final settlement.
fn effective_rate(input: &Pph21Input, rows: &mut Breakdown) -> Result<Money, TaxError> {
    let months = input.months_paid;
    let category = input.ter_category;
    let mut withheld = Money::ZERO;

    if months > 1 {
        rows.add_section(format!("PPh 21 TER bulanan (kategori {category})"))?;
        for month in 1..months {
            let bonus: Money = input
                .bonuses()
                .iter()
                .filter(|bonus| bonus.month == month)
                .map(|bonus| bonus.amount)
                .sum();
            let gross = input.bruto_monthly + bonus;
            let rate = rates::ter_monthly_rate(category, gross);
            let tax = gross.mul(rate);
            rows.add_currency(
                format!("Masa {month}"),
                tax,
                Some(format!("{} x {}", rate.to_percent_string(), gross.to_id_string())),
            )?;
            withheld = withheld + tax;
        }
        rows.add_subtotal(format!("PPh 21 dipotong masa 1-{}", months - 1), withheld)?;
        rows.add_spacer()?;
    }

    let annual = AnnualFigures::compute(input, salary_bruto(input) + bonus_total(input));
    annual_rows(rows, input, &annual)?;
    rows.add_spacer()?;

    let settlement = annual.tax - withheld;
    rows.add_section(format!("Masa {months} (masa terakhir)"))?;
    rows.add_currency("PPh 21 setahun", annual.tax, None)?;
    rows.add_currency("Dipotong masa sebelumnya", withheld, None)?;
    let settlement_label = if settlement.is_negative() {
        "PPh 21 lebih dipotong"
    } else {
        "PPh 21 masa terakhir"
    };
    rows.add_subtotal(settlement_label, settlement)?;
    rows.add_total("PPh 21 terutang", annual.tax)?;
    Ok(annual.tax)
}

/// How one payment to a payment-by-payment subject is taxed.
struct PaymentTax {
    base_label: &'static str,
    base: Money,
    /// Flat rate, or `None` when Pasal 17 layers apply to `base`.
    rate: Option<(&'static str, Money)>,
    tax: Money,
}

impl PaymentTax {
    fn compute(input: &Pph21Input, gross: Money) -> Self {
        match input.subject_type {
            SubjectType::PegawaiTidakTetap => {
                let rate = rates::ter_daily_rate(input.ter_category, gross);
                PaymentTax {
                    base_label: "Dasar pemotongan",
                    base: gross,
                    rate: Some(("Tarif TER harian", rate)),
                    tax: gross.mul(rate),
                }
            }
            SubjectType::BukanPegawai => {
                let base = gross.percent(50, 100);
                PaymentTax {
                    base_label: "DPP (50% bruto)",
                    base,
                    rate: None,
                    tax: rates::pasal17(base),
                }
            }
            SubjectType::Wpln => PaymentTax {
                base_label: "Dasar pemotongan",
                base: gross,
                rate: Some(("Tarif PPh 26", PPH26_RATE)),
                tax: gross.mul(PPH26_RATE),
            },
            SubjectType::PesertaKegiatan
            | SubjectType::ProgramPensiun
            | SubjectType::MantanPegawai
            | SubjectType::PegawaiTetap
            | SubjectType::Pensiunan => PaymentTax {
                base_label: "DPP",
                base: gross,
                rate: None,
                tax: rates::pasal17(gross),
            },
        }
    }

    fn push_rows(&self, rows: &mut Breakdown) -> Result<(), TaxError> {
        rows.add_currency(self.base_label, self.base, None)?;
        match self.rate {
            Some((label, rate)) => rows.add_percent(label, rate, None)?,
            None => layer_rows(rows, self.base)?,
        }
        rows.add_currency("PPh per pembayaran", self.tax, None)
    }
}

fn per_payment(input: &Pph21Input, rows: &mut Breakdown) -> Result<Money, TaxError> {
    let payments = input.months_paid;
    let (heading, total_label) = match input.subject_type {
        SubjectType::Wpln => ("PPh 26".to_string(), "PPh 26 terutang"),
        subject => (format!("PPh 21 {}", subject.to_string().to_lowercase()), "PPh 21 terutang"),
    };

    rows.add_section(heading)?;
    rows.add_currency(
        "Penghasilan bruto per pembayaran",
        input.bruto_monthly,
        Some(format!("{payments} pembayaran")),
    )?;
    let regular = PaymentTax::compute(input, input.bruto_monthly);
    regular.push_rows(rows)?;
    let mut total = regular.tax.mul_int(i64::from(payments));
    rows.add_subtotal(format!("PPh atas {payments} pembayaran"), total)?;

    for bonus in input.bonuses() {
        rows.add_spacer()?;
        rows.add_currency(bonus_label(bonus), bonus.amount, bonus_note(bonus))?;
        let payment = PaymentTax::compute(input, bonus.amount);
        payment.push_rows(rows)?;
        rows.add_subtotal(format!("PPh atas {}", bonus_label(bonus)), payment.tax)?;
        total = total + payment.tax;
    }

    rows.add_spacer()?;
    rows.add_total(total_label, total)?;
    Ok(total)
}
