//! Ordering debts into a payoff plan.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, debt::Debt};

/// The order in which to pay off debts after making the minimum payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Pay the debt with the highest interest rate first.
    #[default]
    Avalanche,
    /// Pay the debt with the smallest balance first.
    Snowball,
}

impl PayoffStrategy {
    /// The value stored in the database and sent by HTML forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Snowball => "snowball",
        }
    }

    /// A human readable description of the strategy.
    pub fn label(&self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "Avalanche method (highest interest first)",
            PayoffStrategy::Snowball => "Snowball method (smallest balance first)",
        }
    }
}

impl FromStr for PayoffStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avalanche" => Ok(PayoffStrategy::Avalanche),
            "snowball" => Ok(PayoffStrategy::Snowball),
            other => Err(Error::InvalidChoice(other.to_owned())),
        }
    }
}

impl Display for PayoffStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A user's debts in the order they should be paid off, plus totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPlan {
    /// The debts in payoff order.
    pub debts: Vec<Debt>,
    /// The sum of the outstanding balances.
    pub total_balance: f64,
    /// The sum of the minimum monthly payments.
    pub total_minimum_payment: f64,
    /// The strategy used to order `debts`.
    pub strategy: PayoffStrategy,
}

impl PaymentPlan {
    /// The money left each month after fixed expenses and every minimum payment.
    ///
    /// May be negative, in which case the user cannot cover their minimums.
    pub fn monthly_surplus(&self, monthly_income: f64, fixed_expenses: f64) -> f64 {
        monthly_income - fixed_expenses - self.total_minimum_payment
    }
}

/// Order `debts` according to `strategy` and sum their balances and minimum payments.
///
/// The sort is stable, so debts that tie keep the order they were given in.
pub fn generate_plan(mut debts: Vec<Debt>, strategy: PayoffStrategy) -> PaymentPlan {
    match strategy {
        PayoffStrategy::Avalanche => {
            debts.sort_by(|a, b| b.annual_rate.total_cmp(&a.annual_rate));
        }
        PayoffStrategy::Snowball => {
            debts.sort_by(|a, b| a.balance.total_cmp(&b.balance));
        }
    }

    let total_balance = debts.iter().map(|debt| debt.balance).sum();
    let total_minimum_payment = debts.iter().map(|debt| debt.minimum_payment).sum();

    PaymentPlan {
        debts,
        total_balance,
        total_minimum_payment,
        strategy,
    }
}
