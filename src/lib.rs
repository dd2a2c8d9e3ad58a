//! Monthly cost of owning a vehicle: fuel, loan payment and maintenance,
//! plus a side-by-side comparison of two vehicles.
//!
//! The arithmetic lives in [`loan`], [`maintenance`] and [`cost`]; ranking two
//! breakdowns lives in [`compare`]. Reading the maintenance table is the only
//! I/O the library does.

pub mod compare;
pub mod cost;
pub mod error;
pub mod loan;
pub mod maintenance;
pub mod vehicle;

pub use error::{CostError, Result};

/// Every monetary amount is rounded to cents at the point it is computed.
pub const DEC_PLACES: f64 = 2.;

pub(crate) fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}
