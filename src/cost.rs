use log::{info, trace};
use std::fmt;

use crate::error::{CostError, Result};
use crate::loan::{loan_payment, LoanTerms};
use crate::maintenance::{maintenance_cost, MaintenanceRates};
use crate::vehicle::{UserProfile, VehicleSpec};
use crate::{round, DEC_PLACES};

/// Weeks counted as one month when converting weekly driving.
pub const WEEKS_PER_MONTH: f64 = 4.;

/// Monthly cost of one vehicle. Components are rounded to cents and the total
/// is their exact sum.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostBreakdown {
    fuel: f64,
    loan_payment: f64,
    maintenance: f64,
    total: f64,
}

impl CostBreakdown {
    pub fn new(fuel: f64, loan_payment: f64, maintenance: f64) -> Self {
        Self {
            fuel,
            loan_payment,
            maintenance,
            total: fuel + loan_payment + maintenance,
        }
    }

    pub fn get_fuel(&self) -> f64 {
        self.fuel
    }

    pub fn get_loan_payment(&self) -> f64 {
        self.loan_payment
    }

    pub fn get_maintenance(&self) -> f64 {
        self.maintenance
    }

    pub fn get_total(&self) -> f64 {
        self.total
    }

    /// Cost of ownership across the whole term.
    pub fn over_term(&self, term_months: u32) -> f64 {
        round(self.total * f64::from(term_months), DEC_PLACES)
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fuel ${:.2}, loan payment ${:.2}, maintenance ${:.2}, total ${:.2}",
            self.fuel, self.loan_payment, self.maintenance, self.total
        )
    }
}

/// Monthly fuel spend, counting four weeks to the month.
pub fn fuel_cost(weekly_distance: f64, fuel_efficiency: f64, fuel_price: f64) -> Result<f64> {
    if !(fuel_efficiency > 0.) {
        return Err(CostError::NonPositiveEfficiency(fuel_efficiency));
    }
    let monthly = (weekly_distance / fuel_efficiency) * fuel_price * WEEKS_PER_MONTH;
    trace!("unrounded monthly fuel cost {}", monthly);

    Ok(round(monthly, DEC_PLACES))
}

/// Sum of the three monthly components.
pub fn total(breakdown: &CostBreakdown) -> f64 {
    breakdown.get_fuel() + breakdown.get_loan_payment() + breakdown.get_maintenance()
}

/// Computes every monthly component for one vehicle. Nothing is returned
/// unless all three succeed.
pub fn compute_breakdown(
    vehicle: &VehicleSpec,
    user: &UserProfile,
    loan: &LoanTerms,
    rates: &MaintenanceRates,
) -> Result<CostBreakdown> {
    if loan.term_months == 0 {
        return Err(CostError::InvalidTerm(loan.term_months));
    }
    let maintenance = maintenance_cost(&vehicle.make, loan.term_months, rates)?;
    let fuel = fuel_cost(user.weekly_distance, vehicle.fuel_efficiency, user.fuel_price)?;
    let payment = loan_payment(
        vehicle.price,
        loan.down_payment,
        loan.annual_rate,
        loan.term_months,
    )?;

    let breakdown = CostBreakdown::new(fuel, payment, maintenance);
    info!("{}: {}", vehicle.make, breakdown);
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::{compute_breakdown, fuel_cost, total, CostBreakdown};
    use crate::error::CostError;
    use crate::loan::{CreditScore, LoanTerms};
    use crate::maintenance::{MaintenanceRate, MaintenanceRates};
    use crate::vehicle::{UserProfile, VehicleSpec};
    use test_log::test;

    fn rates() -> MaintenanceRates {
        let mut rates = MaintenanceRates::new();
        rates.insert("TOYOTA", MaintenanceRate::new(1200., 2400.));
        rates.insert("FORD", MaintenanceRate::new(4980., 9640.));
        rates
    }

    #[test]
    fn test_fuel_cost() {
        assert_eq!(fuel_cost(192., 40., 3.365).unwrap(), 64.61);
        assert_eq!(fuel_cost(0., 40., 3.365).unwrap(), 0.);
        assert_eq!(fuel_cost(200., 25., 0.).unwrap(), 0.);
    }

    #[test]
    fn test_fuel_cost_scaling() {
        let base = fuel_cost(100., 25., 3.).unwrap();
        assert_eq!(base, 48.);
        assert_eq!(fuel_cost(200., 25., 3.).unwrap(), 2. * base);
        assert_eq!(fuel_cost(100., 25., 6.).unwrap(), 2. * base);
        assert_eq!(fuel_cost(100., 50., 3.).unwrap(), base / 2.);
    }

    #[test]
    fn test_fuel_cost_rejects_efficiency() {
        for efficiency in [0., -12., f64::NAN] {
            assert!(matches!(
                fuel_cost(192., efficiency, 3.365),
                Err(CostError::NonPositiveEfficiency(_))
            ));
        }
    }

    #[test]
    fn test_breakdown_total() {
        let breakdown = CostBreakdown::new(64.61, 645.5, 20.);
        assert_eq!(breakdown.get_total(), 64.61 + 645.5 + 20.);
        assert_eq!(breakdown.get_total(), total(&breakdown));
        assert_eq!(
            breakdown.to_string(),
            "fuel $64.61, loan payment $645.50, maintenance $20.00, total $730.11"
        );
    }

    #[test]
    fn test_over_term() {
        let breakdown = CostBreakdown::new(50., 500., 25.);
        assert_eq!(breakdown.over_term(60), 34500.);
    }

    #[test]
    fn test_compute_breakdown() {
        let car = VehicleSpec::new("Toyota", 30000., 40.);
        let user = UserProfile::new(192., 3.365);
        let loan = LoanTerms::from_credit_score(0., CreditScore::Prime, 60);

        let breakdown = compute_breakdown(&car, &user, &loan, &rates()).unwrap();
        assert_eq!(breakdown.get_fuel(), 64.61);
        assert_eq!(breakdown.get_loan_payment(), 645.5);
        assert_eq!(breakdown.get_maintenance(), 20.);
        assert_eq!(breakdown.get_total(), total(&breakdown));
        assert!((breakdown.get_total() - 730.11).abs() < 1e-9);
    }

    #[test]
    fn test_compute_breakdown_long_term() {
        let car = VehicleSpec::new("TOYOTA", 30000., 40.);
        let user = UserProfile::new(192., 3.365);
        let loan = LoanTerms::new(30000., 5.82, 90);

        let breakdown = compute_breakdown(&car, &user, &loan, &rates()).unwrap();
        assert_eq!(breakdown.get_loan_payment(), 0.);
        assert_eq!(breakdown.get_maintenance(), 26.67);
    }

    #[test]
    fn test_compute_breakdown_failures() {
        let user = UserProfile::new(192., 3.365);
        let loan = LoanTerms::new(0., 5.82, 60);

        let unknown = VehicleSpec::new("Yugo", 9000., 30.);
        assert!(matches!(
            compute_breakdown(&unknown, &user, &loan, &rates()),
            Err(CostError::UnknownMake(_))
        ));

        let stalled = VehicleSpec::new("FORD", 28000., 0.);
        assert!(matches!(
            compute_breakdown(&stalled, &user, &loan, &rates()),
            Err(CostError::NonPositiveEfficiency(_))
        ));

        let car = VehicleSpec::new("FORD", 28000., 25.);
        let no_term = LoanTerms::new(0., 5.82, 0);
        assert!(matches!(
            compute_breakdown(&car, &user, &no_term, &rates()),
            Err(CostError::InvalidTerm(0))
        ));
    }
}
