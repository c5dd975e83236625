//! The form for recording an expense.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    endpoints,
    expense::{ExpenseCategory, NewExpense},
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, InputKind, form_input,
        submit_button,
    },
    validation::{
        INVALID_CHOICE_MESSAGE, length_between, number_in_range, parse_number, required,
    },
};

/// The raw data entered by the user in the expense form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
}

/// The error message for each field of an [ExpenseForm], if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFormErrors {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
}

impl ExpenseForm {
    /// Check every field and collect all of the errors at once.
    pub fn validate(&self) -> Result<NewExpense, ExpenseFormErrors> {
        let description = required(&self.description).and_then(|description| {
            length_between(description, 2, 100).map(|_| description.to_owned())
        });
        let amount =
            parse_number(&self.amount).and_then(|amount| number_in_range(amount, 0.1, None));
        let category = required(&self.category).and_then(|category| {
            category
                .parse::<ExpenseCategory>()
                .map_err(|_| INVALID_CHOICE_MESSAGE.to_owned())
        });

        match (description, amount, category) {
            (Ok(description), Ok(amount), Ok(category)) => Ok(NewExpense {
                description,
                amount,
                category,
            }),
            (description, amount, category) => Err(ExpenseFormErrors {
                description: description.err(),
                amount: amount.err(),
                category: category.err(),
            }),
        }
    }
}

/// Render the expense form, filled in with `form` and showing `errors` next to their fields.
pub fn expense_form_view(form: &ExpenseForm, errors: &ExpenseFormErrors) -> Markup {
    html! {
        form
            id="expense-form"
            hx-post=(endpoints::EXPENSES_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            (form_input(
                "description",
                "Description",
                InputKind::Text,
                &form.description,
                errors.description.as_deref(),
            ))
            (form_input(
                "amount",
                "Amount",
                InputKind::Number { min: "0.1", step: "0.01" },
                &form.amount,
                errors.amount.as_deref(),
            ))

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    id="category"
                    name="category"
                    class=(FORM_TEXT_INPUT_STYLE)
                    aria-invalid=[errors.category.as_ref().map(|_| "true")]
                    required
                {
                    option value="" selected[form.category.is_empty()] { "Select a category" }

                    @for category in ExpenseCategory::ALL {
                        option
                            value=(category.as_str())
                            selected[form.category.trim() == category.as_str()]
                        {
                            (category.label())
                        }
                    }
                }

                @if let Some(error) = &errors.category {
                    p class=(FORM_ERROR_STYLE) { (error) }
                }
            }

            (submit_button("Record expense"))
        }
    }
}
