//! Credit utilization and the estimated credit score.

mod analysis_page;
mod score;

pub use analysis_page::get_analysis_page;
pub use score::{CreditAnalysis, score_gauge_chart};
