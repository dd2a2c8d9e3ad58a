use std::path::PathBuf;

use car_cost::compare::{compare_and_explain, Comparison};
use car_cost::cost::{compute_breakdown, CostBreakdown};
use car_cost::loan::{loan_amount, CreditScore, LoanTerms};
use car_cost::maintenance::MaintenanceRates;
use car_cost::vehicle::{UserProfile, VehicleSpec};
use car_cost::{CostError, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const MAX_VEHICLES: usize = 2;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("error: failed to initialise logging: {error}");
        std::process::exit(1);
    }

    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let rates = MaintenanceRates::from_path(&cli.rates)?;

    if cli.list_makes {
        print_catalog(&rates);
        return Ok(());
    }

    let evaluation = evaluate(&cli, &rates)?;
    for (car, breakdown) in cli.vehicles.iter().zip(&evaluation.breakdowns) {
        print_breakdown(car, &evaluation.loan, breakdown);
    }

    if let Some(comparison) = &evaluation.comparison {
        match &comparison.winner_label {
            Some(label) => println!("Recommendation: {label}"),
            None => println!("Recommendation: either vehicle, monthly totals are equal"),
        }
        for reason in &comparison.reasons {
            println!("  - {reason}");
        }
    }

    Ok(())
}

/// Everything computed for one run, before it is printed.
struct Evaluation {
    loan: LoanTerms,
    breakdowns: Vec<CostBreakdown>,
    comparison: Option<Comparison>,
}

fn evaluate(cli: &Cli, rates: &MaintenanceRates) -> Result<Evaluation> {
    if cli.vehicles.len() > MAX_VEHICLES {
        return Err(CostError::TooManyVehicles(cli.vehicles.len()));
    }
    // reject unknown makes before doing any arithmetic
    if let Some(car) = cli.vehicles.iter().find(|car| !rates.contains(&car.make)) {
        return Err(CostError::UnknownMake(car.make.clone()));
    }

    let weekly_distance = cli
        .weekly_distance
        .ok_or(CostError::MissingArgument("--weekly-distance"))?;
    let fuel_price = cli
        .fuel_price
        .ok_or(CostError::MissingArgument("--fuel-price"))?;
    let user = UserProfile::new(weekly_distance, fuel_price);

    let mut loan = LoanTerms::from_credit_score(cli.down_payment, cli.credit_score.into(), cli.term);
    if let Some(date) = cli.first_payment {
        loan = loan.with_first_payment(date);
    }

    let breakdowns = cli
        .vehicles
        .iter()
        .map(|car| compute_breakdown(car, &user, &loan, rates))
        .collect::<Result<Vec<_>>>()?;

    let comparison = match (cli.vehicles.as_slice(), breakdowns.as_slice()) {
        ([car_a, car_b], [cost_a, cost_b]) => {
            let label_a = format!("Vehicle 1 ({})", car_a.make);
            let label_b = format!("Vehicle 2 ({})", car_b.make);
            Some(compare_and_explain(cost_a, cost_b, &label_a, &label_b))
        }
        _ => None,
    };

    Ok(Evaluation {
        loan,
        breakdowns,
        comparison,
    })
}

fn print_breakdown(car: &VehicleSpec, loan: &LoanTerms, breakdown: &CostBreakdown) {
    println!("{car}");
    println!(
        "  financed ${:.2} at {:.2}% over {} months",
        loan_amount(car.price, loan.down_payment),
        loan.annual_rate,
        loan.term_months
    );
    if let Some(payoff) = loan.payoff_date() {
        println!("  final payment on {payoff}");
    }
    println!("  {:<14}{:>12}", "Category", "Monthly");
    println!("  {:<14}{:>12.2}", "Fuel", breakdown.get_fuel());
    println!("  {:<14}{:>12.2}", "Loan payment", breakdown.get_loan_payment());
    println!("  {:<14}{:>12.2}", "Maintenance", breakdown.get_maintenance());
    println!("  {:<14}{:>12.2}", "Total", breakdown.get_total());
    println!(
        "  {:<14}{:>12.2}",
        "Over term",
        breakdown.over_term(loan.term_months)
    );
    println!();
}

fn print_catalog(rates: &MaintenanceRates) {
    println!("Makes with maintenance costs on file:");
    for make in rates.makes() {
        println!("  {make}");
    }
    println!("Credit score tiers:");
    for tier in CreditScore::ALL {
        println!("  {:<8} {:>6.2}%", tier.range(), tier.rate());
    }
}

fn parse_term(s: &str) -> std::result::Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err(CostError::InvalidTerm(0).to_string()),
        Ok(term) => Ok(term),
        Err(error) => Err(error.to_string()),
    }
}

fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(amount) if amount >= 0. => Ok(amount),
        Ok(amount) => Err(format!("{amount} must not be negative")),
        Err(error) => Err(error.to_string()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Estimate and compare the monthly cost of owning a vehicle."
)]
struct Cli {
    /// Vehicle as MAKE,PRICE,EFFICIENCY. Give two to compare them.
    #[arg(long = "vehicle", required_unless_present = "list_makes")]
    vehicles: Vec<VehicleSpec>,

    /// Distance driven per week.
    #[arg(long, required_unless_present = "list_makes", value_parser = parse_amount)]
    weekly_distance: Option<f64>,

    /// Price per unit of fuel.
    #[arg(long, required_unless_present = "list_makes", value_parser = parse_amount)]
    fuel_price: Option<f64>,

    /// Down payment applied to each vehicle.
    #[arg(long, default_value_t = 0., value_parser = parse_amount)]
    down_payment: f64,

    /// Credit score tier used to pick the interest rate.
    #[arg(long, value_enum, default_value_t = CreditTier::Prime)]
    credit_score: CreditTier,

    /// Loan term in months.
    #[arg(long, default_value_t = 60, value_parser = parse_term)]
    term: u32,

    /// Date of the first loan payment (YYYY-MM-DD).
    #[arg(long)]
    first_payment: Option<NaiveDate>,

    /// Maintenance cost table with rows of make,cost_1_to_60,cost_61_to_120.
    #[arg(long, env = "CAR_COST_RATES", default_value = "data/maintenance_costs.csv")]
    rates: PathBuf,

    /// Print known makes and credit tiers, then exit.
    #[arg(long)]
    list_makes: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CreditTier {
    /// 300-500
    DeepSubPrime,
    /// 501-600
    SubPrime,
    /// 601-660
    NearPrime,
    /// 661-780
    Prime,
    /// 781-850
    SuperPrime,
}

impl From<CreditTier> for CreditScore {
    fn from(tier: CreditTier) -> Self {
        match tier {
            CreditTier::DeepSubPrime => CreditScore::DeepSubPrime,
            CreditTier::SubPrime => CreditScore::SubPrime,
            CreditTier::NearPrime => CreditScore::NearPrime,
            CreditTier::Prime => CreditScore::Prime,
            CreditTier::SuperPrime => CreditScore::SuperPrime,
        }
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<CostBreakdown>();
    is_normal::<LoanTerms>();
    is_normal::<VehicleSpec>();
    is_normal::<MaintenanceRates>();
    is_normal::<CostError>();
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn parse_two_vehicles() {
    let cli = Cli::try_parse_from([
        "car-cost",
        "--vehicle",
        "toyota,30000,40",
        "--vehicle",
        "FORD,28000,25",
        "--weekly-distance",
        "192",
        "--fuel-price",
        "3.365",
        "--credit-score",
        "near-prime",
        "--term",
        "72",
    ])
    .unwrap();
    assert_eq!(cli.vehicles.len(), 2);
    assert_eq!(cli.vehicles[0].make, "TOYOTA");
    assert_eq!(CreditScore::from(cli.credit_score), CreditScore::NearPrime);
    assert_eq!(cli.term, 72);
    assert_eq!(cli.weekly_distance, Some(192.));
    assert_eq!(cli.fuel_price, Some(3.365));
}

#[test]
fn reject_zero_term() {
    assert!(Cli::try_parse_from([
        "car-cost",
        "--vehicle",
        "KIA,20000,30",
        "--weekly-distance",
        "100",
        "--fuel-price",
        "3",
        "--term",
        "0"
    ])
    .is_err());
}

#[test]
fn require_fuel_inputs() {
    let missing_price = Cli::try_parse_from([
        "car-cost",
        "--vehicle",
        "TOYOTA,30000,40",
        "--vehicle",
        "KIA,30000,10",
        "--weekly-distance",
        "192",
    ]);
    assert!(missing_price.is_err());

    let missing_distance = Cli::try_parse_from([
        "car-cost",
        "--vehicle",
        "TOYOTA,30000,40",
        "--fuel-price",
        "3.365",
    ]);
    assert!(missing_distance.is_err());

    let listing = Cli::try_parse_from(["car-cost", "--list-makes"]).unwrap();
    assert!(listing.list_makes);
    assert_eq!(listing.weekly_distance, None);
}

#[cfg(test)]
fn rates_file() -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "make,cost_1_to_60,cost_61_to_120").unwrap();
    writeln!(file, "TOYOTA,1200,2400").unwrap();
    writeln!(file, "HONDA,1200,2400").unwrap();
    writeln!(file, "KIA,4060,7850").unwrap();
    file
}

#[cfg(test)]
fn cli_for(rates: &std::path::Path, vehicles: &[&str]) -> Cli {
    let mut args = vec![
        "car-cost".to_string(),
        "--rates".to_string(),
        rates.display().to_string(),
        "--weekly-distance".to_string(),
        "192".to_string(),
        "--fuel-price".to_string(),
        "3.365".to_string(),
    ];
    for vehicle in vehicles {
        args.push("--vehicle".to_string());
        args.push(vehicle.to_string());
    }
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn run_rejects_three_vehicles() {
    let rates = rates_file();
    let cli = cli_for(
        rates.path(),
        &["TOYOTA,30000,40", "HONDA,28000,35", "KIA,22000,30"],
    );
    assert!(matches!(run(cli), Err(CostError::TooManyVehicles(3))));
}

#[test]
fn run_rejects_unknown_make() {
    let rates = rates_file();
    let cli = cli_for(rates.path(), &["TOYOTA,30000,40", "yugo,9000,30"]);
    match run(cli) {
        Err(CostError::UnknownMake(make)) => assert_eq!(make, "YUGO"),
        other => panic!("expected unknown make, got {:?}", other),
    }
}

#[test]
fn run_compares_two_vehicles() {
    let rates = rates_file();
    let cli = cli_for(rates.path(), &["TOYOTA,30000,40", "KIA,30000,10"]);
    assert!(run(cli).is_ok());

    let cli = cli_for(rates.path(), &["TOYOTA,30000,40", "KIA,30000,10"]);
    let evaluation = evaluate(&cli, &MaintenanceRates::from_path(rates.path()).unwrap()).unwrap();
    // the 10 mpg car burns four times the fuel
    assert_eq!(evaluation.breakdowns[0].get_fuel(), 64.61);
    assert_eq!(evaluation.breakdowns[1].get_fuel(), 258.43);
    let comparison = evaluation.comparison.unwrap();
    assert_eq!(comparison.winner_label.as_deref(), Some("Vehicle 1 (TOYOTA)"));
    assert!(comparison.reasons.last().unwrap().contains("overall"));
}

#[test]
fn equal_totals_have_no_winner() {
    let rates = rates_file();
    let cli = cli_for(rates.path(), &["TOYOTA,30000,40", "HONDA,30000,40"]);
    let evaluation = evaluate(&cli, &MaintenanceRates::from_path(rates.path()).unwrap()).unwrap();
    assert_eq!(evaluation.breakdowns[0], evaluation.breakdowns[1]);

    let comparison = evaluation.comparison.unwrap();
    assert_eq!(comparison.winner_label, None);
    assert!(comparison.reasons.iter().all(|reason| !reason.contains("overall")));
}
