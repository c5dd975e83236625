//! Summaries of a user's spending.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Tooltip, Trigger},
    series::Pie,
};

use crate::expense::{Expense, ExpenseCategory};

/// The sum of a user's expenses, overall and per category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpenseTotals {
    pub ant: f64,
    pub fixed: f64,
    pub variable: f64,
}

impl ExpenseTotals {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        expenses
            .iter()
            .fold(Self::default(), |mut totals, expense| {
                match expense.category {
                    ExpenseCategory::Ant => totals.ant += expense.amount,
                    ExpenseCategory::Fixed => totals.fixed += expense.amount,
                    ExpenseCategory::Variable => totals.variable += expense.amount,
                }

                totals
            })
    }

    /// The total of every expense.
    pub fn overall(&self) -> f64 {
        self.ant + self.fixed + self.variable
    }

    /// The total for `category`.
    pub fn for_category(&self, category: ExpenseCategory) -> f64 {
        match category {
            ExpenseCategory::Ant => self.ant,
            ExpenseCategory::Fixed => self.fixed,
            ExpenseCategory::Variable => self.variable,
        }
    }
}

/// A pie chart of how spending splits between the categories.
pub fn expenses_by_category_chart(totals: &ExpenseTotals) -> Chart {
    let data = ExpenseCategory::ALL
        .iter()
        .map(|category| (totals.for_category(*category), category.label()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by category"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

#[cfg(test)]
mod expense_totals_tests {
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        expense::{Expense, ExpenseCategory},
    };

    use super::{ExpenseTotals, expenses_by_category_chart};

    fn expense(amount: f64, category: ExpenseCategory) -> Expense {
        Expense {
            id: 1,
            user_id: UserID::new(1),
            description: "Test".to_owned(),
            amount,
            category,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn sums_each_category() {
        let expenses = [
            expense(25.5, ExpenseCategory::Ant),
            expense(60.0, ExpenseCategory::Ant),
            expense(8000.0, ExpenseCategory::Fixed),
            expense(1200.25, ExpenseCategory::Variable),
        ];

        let totals = ExpenseTotals::from_expenses(&expenses);

        assert_eq!(
            totals,
            ExpenseTotals {
                ant: 85.5,
                fixed: 8000.0,
                variable: 1200.25,
            }
        );
        assert_eq!(totals.overall(), 9285.75);
        assert_eq!(totals.for_category(ExpenseCategory::Ant), 85.5);
    }

    #[test]
    fn no_expenses_sum_to_zero() {
        let totals = ExpenseTotals::from_expenses(&[]);

        assert_eq!(totals.overall(), 0.0);
    }

    #[test]
    fn chart_labels_every_category() {
        let totals = ExpenseTotals {
            ant: 10.0,
            fixed: 20.0,
            variable: 30.0,
        };

        let options = expenses_by_category_chart(&totals).to_string();

        for category in ExpenseCategory::ALL {
            assert!(
                options.contains(category.label()),
                "chart options should contain {:?}",
                category.label()
            );
        }
    }
}
