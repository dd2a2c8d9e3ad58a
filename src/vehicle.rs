use std::{fmt, str::FromStr};

use crate::error::CostError;

/// A vehicle under consideration. The make is stored uppercase so it lines up
/// with the maintenance table keys.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSpec {
    pub make: String,
    pub price: f64,
    pub fuel_efficiency: f64, // distance per unit of fuel, e.g. mpg
}

impl VehicleSpec {
    pub fn new(make: &str, price: f64, fuel_efficiency: f64) -> Self {
        Self {
            make: make.trim().to_uppercase(),
            price,
            fuel_efficiency,
        }
    }
}

impl fmt::Display for VehicleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (${:.2}, {} per unit of fuel)",
            self.make, self.price, self.fuel_efficiency
        )
    }
}

// parses `MAKE,PRICE,EFFICIENCY`
impl FromStr for VehicleSpec {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CostError::InvalidVehicle(s.to_string());
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [make, price, efficiency] = fields.as_slice() else {
            return Err(invalid());
        };
        if make.is_empty() {
            return Err(invalid());
        }
        let price: f64 = price.parse().map_err(|_| invalid())?;
        let efficiency: f64 = efficiency.parse().map_err(|_| invalid())?;
        if !(price > 0. && price.is_finite()) {
            return Err(invalid());
        }

        Ok(VehicleSpec::new(make, price, efficiency))
    }
}

/// How much the owner drives and what they pay for fuel.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserProfile {
    pub weekly_distance: f64,
    pub fuel_price: f64,
}

impl UserProfile {
    pub fn new(weekly_distance: f64, fuel_price: f64) -> Self {
        Self {
            weekly_distance,
            fuel_price,
        }
    }
}
