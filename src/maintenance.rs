use log::{debug, trace};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::error::{CostError, Result};
use crate::{round, DEC_PLACES};

/// Months covered by each maintenance bucket.
pub const BUCKET_MONTHS: u32 = 60;

/// Flat maintenance cost for a make over its first and second 60 months.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaintenanceRate {
    pub cost_1_to_60: f64,
    pub cost_61_to_120: f64,
}

impl MaintenanceRate {
    pub fn new(cost_1_to_60: f64, cost_61_to_120: f64) -> Self {
        Self {
            cost_1_to_60,
            cost_61_to_120,
        }
    }
}

/// Maintenance rates keyed by uppercase make.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MaintenanceRates {
    rates: HashMap<String, MaintenanceRate>,
}

impl MaintenanceRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, make: &str, rate: MaintenanceRate) {
        self.rates.insert(make.trim().to_uppercase(), rate);
    }

    pub fn get(&self, make: &str) -> Result<&MaintenanceRate> {
        let make = make.trim().to_uppercase();
        self.rates
            .get(&make)
            .ok_or(CostError::UnknownMake(make))
    }

    pub fn contains(&self, make: &str) -> bool {
        self.rates.contains_key(&make.trim().to_uppercase())
    }

    /// Known makes, sorted.
    pub fn makes(&self) -> Vec<&str> {
        let mut makes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        makes.sort_unstable();
        makes
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let rates = Self::from_reader(File::open(path)?)?;
        debug!("loaded {} maintenance rates from {}", rates.len(), path.display());
        Ok(rates)
    }

    /// Reads rows of `make,cost_1_to_60,cost_61_to_120`.
    ///
    /// Blank lines and `#` comments are skipped, as is a header row if it is
    /// the first row and its cost columns are not numbers.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rates = Self::new();
        let mut first_row = true;

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let row = line.trim();
            if row.is_empty() || row.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            let [make, early, late] = fields.as_slice() else {
                return Err(CostError::MalformedRate {
                    line: line_no,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            };

            let is_header = first_row && early.parse::<f64>().is_err() && late.parse::<f64>().is_err();
            first_row = false;
            if is_header {
                trace!("skipping header row on line {}", line_no);
                continue;
            }

            if make.is_empty() {
                return Err(CostError::MalformedRate {
                    line: line_no,
                    reason: "missing make".to_string(),
                });
            }
            if rates.contains(make) {
                return Err(CostError::MalformedRate {
                    line: line_no,
                    reason: format!("duplicate make '{}'", make.to_uppercase()),
                });
            }
            let rate = MaintenanceRate::new(
                parse_cost(early, line_no)?,
                parse_cost(late, line_no)?,
            );
            rates.insert(make, rate);
        }

        Ok(rates)
    }
}

fn parse_cost(field: &str, line: usize) -> Result<f64> {
    let cost: f64 = field.parse().map_err(|_| CostError::MalformedRate {
        line,
        reason: format!("'{}' is not a number", field),
    })?;
    if !(cost >= 0.) {
        return Err(CostError::MalformedRate {
            line,
            reason: format!("cost {} is negative", cost),
        });
    }
    Ok(cost)
}

/// Average monthly maintenance over the term.
///
/// Each bucket's flat cost is spread evenly over its 60 months; months past
/// 60 are all charged at the second bucket's rate.
pub fn maintenance_cost(make: &str, term_months: u32, rates: &MaintenanceRates) -> Result<f64> {
    let rate = rates.get(make)?;
    if term_months == 0 {
        return Err(CostError::InvalidTerm(term_months));
    }

    let bucket = f64::from(BUCKET_MONTHS);
    let early = f64::from(term_months.min(BUCKET_MONTHS));
    let late = f64::from(term_months.saturating_sub(BUCKET_MONTHS));

    let cost_before = early * rate.cost_1_to_60 / bucket;
    let cost_after = late * rate.cost_61_to_120 / bucket;
    trace!(
        "{}: maintenance months 1-60 ${}, months 61+ ${}",
        make,
        cost_before,
        cost_after
    );

    Ok(round(
        (cost_before + cost_after) / f64::from(term_months),
        DEC_PLACES,
    ))
}
