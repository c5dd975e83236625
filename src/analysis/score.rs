//! A heuristic credit score based on how much of the available credit is in use.

use charming::{Chart, element::Tooltip, series::Gauge};

use crate::debt::Debt;

/// The score given to a user with little credit in use.
pub const MAX_SCORE: u16 = 850;

/// The utilization of a user's credit and the score it earns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditAnalysis {
    /// The sum of the outstanding balances.
    pub total_debt: f64,
    /// The sum of the credit limits.
    pub total_limit: f64,
    /// The percentage of the credit limit in use, zero when there is no limit.
    pub utilization: f64,
    pub score: u16,
}

impl CreditAnalysis {
    pub fn new(debts: &[Debt]) -> Self {
        let total_debt: f64 = debts.iter().map(|debt| debt.balance).sum();
        let total_limit: f64 = debts.iter().map(|debt| debt.credit_limit).sum();

        let utilization = if total_limit > 0.0 {
            total_debt / total_limit * 100.0
        } else {
            0.0
        };

        let score = if utilization > 80.0 {
            600
        } else if utilization > 50.0 {
            700
        } else if utilization > 30.0 {
            800
        } else if total_debt == 0.0 && total_limit == 0.0 {
            0
        } else {
            MAX_SCORE
        };

        Self {
            total_debt,
            total_limit,
            utilization,
            score,
        }
    }

    pub fn rating(&self) -> ScoreRating {
        ScoreRating::from_score(self.score)
    }
}

/// A description of a credit score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRating {
    /// No debts and no credit limits have been registered.
    NoHistory,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreRating {
    pub fn from_score(score: u16) -> Self {
        match score {
            0 => ScoreRating::NoHistory,
            1..=649 => ScoreRating::Poor,
            650..=749 => ScoreRating::Fair,
            750..=824 => ScoreRating::Good,
            _ => ScoreRating::Excellent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreRating::NoHistory => "No credit history",
            ScoreRating::Poor => "Poor",
            ScoreRating::Fair => "Fair",
            ScoreRating::Good => "Good",
            ScoreRating::Excellent => "Excellent",
        }
    }

    /// Advice for improving or keeping the score.
    pub fn advice(&self) -> &'static str {
        match self {
            ScoreRating::NoHistory => {
                "Register your credit cards and loans on the dashboard to get your score."
            }
            ScoreRating::Poor => {
                "You are using more than 80% of your credit. Pay down your balances before \
                taking on new debt."
            }
            ScoreRating::Fair => {
                "You are using more than half of your credit. Try to bring your usage below 30%."
            }
            ScoreRating::Good => {
                "Your usage is moderate. Getting it below 30% will raise your score further."
            }
            ScoreRating::Excellent => "You keep your credit usage low. Keep it up!",
        }
    }

    /// The Tailwind text colour class used to show the rating.
    pub fn text_style(&self) -> &'static str {
        match self {
            ScoreRating::NoHistory => "text-gray-500",
            ScoreRating::Poor => "text-red-600",
            ScoreRating::Fair => "text-amber-600",
            ScoreRating::Good => "text-lime-600",
            ScoreRating::Excellent => "text-green-600",
        }
    }
}

/// A gauge showing `score` on the 0 to 850 scale.
pub fn score_gauge_chart(score: u16) -> Chart {
    Chart::new().tooltip(Tooltip::new()).series(
        Gauge::new()
            .name("Score")
            .min(0)
            .max(850)
            .data(vec![(f64::from(score), "Score")]),
    )
}
