use chrono::{Months, NaiveDate};
use log::{trace, warn};
use std::fmt;

use crate::error::{CostError, Result};
use crate::{round, DEC_PLACES};

/// Credit tier a borrower falls into. Each tier carries a fixed annual rate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreditScore {
    DeepSubPrime,
    SubPrime,
    NearPrime,
    Prime,
    SuperPrime,
}

struct Tier {
    low: u16,
    high: u16,
    rate: f64, // annual percentage
}

// indexed by tier ordinal
const TIERS: [Tier; 5] = [
    Tier { low: 300, high: 500, rate: 13.42 },
    Tier { low: 501, high: 600, rate: 10.79 },
    Tier { low: 601, high: 660, rate: 8.12 },
    Tier { low: 661, high: 780, rate: 5.82 },
    Tier { low: 781, high: 850, rate: 4.75 },
];

impl CreditScore {
    pub const ALL: [CreditScore; 5] = [
        CreditScore::DeepSubPrime,
        CreditScore::SubPrime,
        CreditScore::NearPrime,
        CreditScore::Prime,
        CreditScore::SuperPrime,
    ];

    fn tier(&self) -> &'static Tier {
        &TIERS[*self as usize]
    }

    /// Annual interest rate as a percentage (i.e., 5.82, 13.42).
    pub fn rate(&self) -> f64 {
        self.tier().rate
    }

    /// Display range of scores covered by the tier, e.g. "661-780".
    pub fn range(&self) -> String {
        let tier = self.tier();
        format!("{}-{}", tier.low, tier.high)
    }

    /// Tier for a numeric score. Scores outside 300-850 clamp to the end tiers.
    pub fn from_score(score: u16) -> Self {
        CreditScore::ALL
            .into_iter()
            .find(|tier| score <= tier.tier().high)
            .unwrap_or(CreditScore::SuperPrime)
    }
}

impl fmt::Display for CreditScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range())
    }
}

/// Financing for one purchase.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanTerms {
    pub down_payment: f64,
    pub annual_rate: f64, // percentage, not decimal
    pub term_months: u32,
    pub first_pmt_date: Option<NaiveDate>,
}

impl LoanTerms {
    pub fn new(down_payment: f64, annual_rate: f64, term_months: u32) -> Self {
        Self {
            down_payment,
            annual_rate,
            term_months,
            first_pmt_date: None,
        }
    }

    pub fn from_credit_score(down_payment: f64, credit_score: CreditScore, term_months: u32) -> Self {
        Self::new(down_payment, credit_score.rate(), term_months)
    }

    pub fn with_first_payment(mut self, first_pmt_date: NaiveDate) -> Self {
        self.first_pmt_date = Some(first_pmt_date);
        self
    }

    /// Date of the last monthly payment, if the first payment date is known.
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        let first = self.first_pmt_date?;
        let remaining = self.term_months.checked_sub(1)?;
        first.checked_add_months(Months::new(remaining))
    }

    /// Monthly payment for a vehicle at the given price.
    pub fn payment_for(&self, price: f64) -> Result<f64> {
        loan_payment(price, self.down_payment, self.annual_rate, self.term_months)
    }
}

/// Amount financed. A down payment above the price pays the vehicle off.
pub fn loan_amount(price: f64, down_payment: f64) -> f64 {
    (price - down_payment).max(0.)
}

/// Monthly loan payment using simple interest over the whole term.
///
/// Interest is `rate/12 * loan amount * term`, so it grows linearly with the
/// term rather than amortizing against a falling balance.
pub fn loan_payment(
    price: f64,
    down_payment: f64,
    annual_rate: f64, // annual interest rate as percentage (i.e., 5.82)
    term_months: u32,
) -> Result<f64> {
    if term_months == 0 {
        return Err(CostError::InvalidTerm(term_months));
    }
    let term = f64::from(term_months);
    if down_payment > price {
        warn!(
            "down payment ${:.2} exceeds price ${:.2}, treating as full payoff",
            down_payment, price
        );
    }

    let amount = loan_amount(price, down_payment);
    let total_interest = (annual_rate / 100. / 12.) * amount * term;
    let total_pmts = total_interest + amount;
    trace!(
        "loan amount {}, total interest {}, total payments {}",
        amount,
        total_interest,
        total_pmts
    );

    Ok(round(total_pmts / term, DEC_PLACES))
}

#[cfg(test)]
mod tests {
    use super::{loan_amount, loan_payment, CreditScore, LoanTerms};
    use crate::error::CostError;
    use chrono::NaiveDate;
    use test_log::test;

    #[test]
    fn test_loan_payment() {
        assert_eq!(loan_payment(30000., 0., 5.82, 60).unwrap(), 645.5);
        assert_eq!(loan_payment(30000., 5000., 5.82, 60).unwrap(), 537.92);
        assert_eq!(loan_payment(24000., 0., 0., 48).unwrap(), 500.);
        assert_eq!(loan_payment(24000., 0., 13.42, 72).unwrap(), 601.73);
    }

    #[test]
    fn test_interest_scales_with_term() {
        // interest per month is constant, so only the principal share moves
        let short = loan_payment(36000., 0., 12., 36).unwrap();
        let long = loan_payment(36000., 0., 12., 72).unwrap();
        assert_eq!(short, 1360.);
        assert_eq!(long, 860.);
    }

    #[test]
    fn test_paid_off_loan() {
        assert_eq!(loan_amount(20000., 25000.), 0.);
        assert_eq!(loan_payment(20000., 20000., 8.12, 60).unwrap(), 0.);
        assert_eq!(loan_payment(20000., 25000., 8.12, 60).unwrap(), 0.);
    }

    #[test]
    fn test_loan_amount() {
        assert_eq!(loan_amount(30000., 5000.), 25000.);
        assert_eq!(loan_amount(30000., 30000.), 0.);
        assert_eq!(loan_amount(30000., 0.), 30000.);
    }

    #[test]
    fn test_zero_term() {
        assert!(matches!(
            loan_payment(30000., 0., 5.82, 0),
            Err(CostError::InvalidTerm(0))
        ));
    }

    #[test]
    fn test_credit_score_table() {
        let expected = [
            (CreditScore::DeepSubPrime, 13.42, "300-500"),
            (CreditScore::SubPrime, 10.79, "501-600"),
            (CreditScore::NearPrime, 8.12, "601-660"),
            (CreditScore::Prime, 5.82, "661-780"),
            (CreditScore::SuperPrime, 4.75, "781-850"),
        ];
        for (tier, rate, range) in expected {
            assert_eq!(tier.rate(), rate);
            assert_eq!(tier.range(), range);
            assert_eq!(tier.to_string(), range);
        }
    }

    #[test]
    fn test_from_score() {
        assert_eq!(CreditScore::from_score(250), CreditScore::DeepSubPrime);
        assert_eq!(CreditScore::from_score(500), CreditScore::DeepSubPrime);
        assert_eq!(CreditScore::from_score(501), CreditScore::SubPrime);
        assert_eq!(CreditScore::from_score(660), CreditScore::NearPrime);
        assert_eq!(CreditScore::from_score(700), CreditScore::Prime);
        assert_eq!(CreditScore::from_score(781), CreditScore::SuperPrime);
        assert_eq!(CreditScore::from_score(900), CreditScore::SuperPrime);
    }

    #[test]
    fn test_loan_terms() {
        let loan = LoanTerms::from_credit_score(0., CreditScore::Prime, 60);
        assert_eq!(loan.annual_rate, 5.82);
        assert_eq!(loan.payment_for(30000.).unwrap(), 645.5);
        assert_eq!(loan.payoff_date(), None);
    }

    #[test]
    fn test_payoff_date() {
        let loan = LoanTerms::new(0., 5.82, 60)
            .with_first_payment(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(
            loan.payoff_date(),
            NaiveDate::from_ymd_opt(2029, 3, 1)
        );

        let loan = LoanTerms::new(0., 5.82, 1)
            .with_first_payment(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(loan.payoff_date(), NaiveDate::from_ymd_opt(2024, 1, 31));

        // end of month clamps
        let loan = LoanTerms::new(0., 5.82, 2)
            .with_first_payment(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(loan.payoff_date(), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
