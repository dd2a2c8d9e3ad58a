use log::info;
use std::fmt;

use crate::cost::CostBreakdown;

/// Which of two vehicles costs less per month.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winner {
    A,
    B,
    Tie,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Fuel,
    LoanPayment,
    Maintenance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Fuel, Category::LoanPayment, Category::Maintenance];

    pub fn cost_of(&self, breakdown: &CostBreakdown) -> f64 {
        match self {
            Category::Fuel => breakdown.get_fuel(),
            Category::LoanPayment => breakdown.get_loan_payment(),
            Category::Maintenance => breakdown.get_maintenance(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Fuel => write!(f, "fuel cost"),
            Category::LoanPayment => write!(f, "loan payment"),
            Category::Maintenance => write!(f, "maintenance cost"),
        }
    }
}

/// One line of the explanation for a recommendation.
#[derive(Clone, PartialEq, Debug)]
pub enum Reason {
    Category {
        label: String,
        category: Category,
        lower: f64,
        higher: f64,
    },
    Overall {
        label: String,
        lower: f64,
        higher: f64,
    },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Category {
                label,
                category,
                lower,
                higher,
            } => write!(
                f,
                "{} has a lower monthly {} (${:.2} vs ${:.2})",
                label, category, lower, higher
            ),
            Reason::Overall {
                label,
                lower,
                higher,
            } => write!(
                f,
                "{} has a lower overall monthly total (${:.2} vs ${:.2})",
                label, lower, higher
            ),
        }
    }
}

/// Recommendation with its reasons, ready for display.
#[derive(Clone, PartialEq, Debug)]
pub struct Comparison {
    pub winner_label: Option<String>,
    pub reasons: Vec<String>,
}

/// Strictly lower total wins; equal totals tie.
pub fn recommend(a: &CostBreakdown, b: &CostBreakdown) -> Winner {
    if a.get_total() < b.get_total() {
        Winner::A
    } else if b.get_total() < a.get_total() {
        Winner::B
    } else {
        Winner::Tie
    }
}

/// Reasons backing `winner`, in category order followed by the overall total.
///
/// With a declared winner only the categories it is strictly cheaper in are
/// listed. On a tie every category where either vehicle is cheaper is listed
/// and there is no overall reason.
pub fn explain(
    a: &CostBreakdown,
    b: &CostBreakdown,
    winner: Winner,
    label_a: &str,
    label_b: &str,
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    for category in Category::ALL {
        let cost_a = category.cost_of(a);
        let cost_b = category.cost_of(b);
        let cheaper = if cost_a < cost_b {
            Winner::A
        } else if cost_b < cost_a {
            Winner::B
        } else {
            continue;
        };
        if winner != Winner::Tie && winner != cheaper {
            continue;
        }
        let (label, lower, higher) = match cheaper {
            Winner::A => (label_a, cost_a, cost_b),
            _ => (label_b, cost_b, cost_a),
        };
        reasons.push(Reason::Category {
            label: label.to_string(),
            category,
            lower,
            higher,
        });
    }

    match winner {
        Winner::A => reasons.push(Reason::Overall {
            label: label_a.to_string(),
            lower: a.get_total(),
            higher: b.get_total(),
        }),
        Winner::B => reasons.push(Reason::Overall {
            label: label_b.to_string(),
            lower: b.get_total(),
            higher: a.get_total(),
        }),
        Winner::Tie => {}
    }

    reasons
}

pub fn compare_and_explain(
    a: &CostBreakdown,
    b: &CostBreakdown,
    label_a: &str,
    label_b: &str,
) -> Comparison {
    let winner = recommend(a, b);
    let winner_label = match winner {
        Winner::A => Some(label_a.to_string()),
        Winner::B => Some(label_b.to_string()),
        Winner::Tie => None,
    };
    info!(
        "{} vs {}: {}",
        label_a,
        label_b,
        winner_label.as_deref().unwrap_or("tie")
    );

    Comparison {
        winner_label,
        reasons: explain(a, b, winner, label_a, label_b)
            .iter()
            .map(Reason::to_string)
            .collect(),
    }
}
