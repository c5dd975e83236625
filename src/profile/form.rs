//! The form for editing a user's financial profile.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    auth::FinancialProfile,
    debt::PayoffStrategy,
    endpoints,
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, InputKind, form_input, submit_button},
    validation::{INVALID_CHOICE_MESSAGE, number_in_range, parse_number, required},
};

/// The raw data entered by the user in the profile form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub monthly_income: String,
    #[serde(default)]
    pub fixed_expenses: String,
    #[serde(default)]
    pub preferred_strategy: String,
}

/// The error message for each field of a [ProfileForm], if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFormErrors {
    pub monthly_income: Option<String>,
    pub fixed_expenses: Option<String>,
    pub preferred_strategy: Option<String>,
}

impl ProfileForm {
    /// Fill the form with the user's current profile.
    pub fn from_profile(profile: FinancialProfile) -> Self {
        Self {
            monthly_income: profile.monthly_income.to_string(),
            fixed_expenses: profile.fixed_expenses.to_string(),
            preferred_strategy: profile.preferred_strategy.as_str().to_owned(),
        }
    }

    /// Check every field and collect all of the errors at once.
    pub fn validate(&self) -> Result<FinancialProfile, ProfileFormErrors> {
        let monthly_income = parse_number(&self.monthly_income)
            .and_then(|number| number_in_range(number, 0.0, None));
        let fixed_expenses = parse_number(&self.fixed_expenses)
            .and_then(|number| number_in_range(number, 0.0, None));
        let preferred_strategy = required(&self.preferred_strategy).and_then(|strategy| {
            strategy
                .parse::<PayoffStrategy>()
                .map_err(|_| INVALID_CHOICE_MESSAGE.to_owned())
        });

        match (monthly_income, fixed_expenses, preferred_strategy) {
            (Ok(monthly_income), Ok(fixed_expenses), Ok(preferred_strategy)) => {
                Ok(FinancialProfile {
                    monthly_income,
                    fixed_expenses,
                    preferred_strategy,
                })
            }
            (monthly_income, fixed_expenses, preferred_strategy) => Err(ProfileFormErrors {
                monthly_income: monthly_income.err(),
                fixed_expenses: fixed_expenses.err(),
                preferred_strategy: preferred_strategy.err(),
            }),
        }
    }
}

pub fn profile_form_view(form: &ProfileForm, errors: &ProfileFormErrors) -> Markup {
    let money = InputKind::Number {
        min: "0",
        step: "0.01",
    };

    html! {
        form
            id="profile-form"
            hx-post=(endpoints::PROFILE_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            (form_input(
                "monthly_income",
                "Monthly income",
                money,
                &form.monthly_income,
                errors.monthly_income.as_deref(),
            ))
            (form_input(
                "fixed_expenses",
                "Fixed monthly expenses",
                money,
                &form.fixed_expenses,
                errors.fixed_expenses.as_deref(),
            ))

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Payoff strategy" }

                @for strategy in [PayoffStrategy::Avalanche, PayoffStrategy::Snowball] {
                    @let id = format!("strategy-{}", strategy.as_str());

                    div class="flex items-center gap-x-3 mb-2"
                    {
                        input
                            type="radio"
                            id=(id)
                            name="preferred_strategy"
                            value=(strategy.as_str())
                            checked[form.preferred_strategy.trim() == strategy.as_str()]
                            required;

                        label for=(id) class="text-sm text-gray-900 dark:text-white"
                        {
                            (strategy.label())
                        }
                    }
                }

                @if let Some(error) = &errors.preferred_strategy {
                    p class=(FORM_ERROR_STYLE) { (error) }
                }
            }

            (submit_button("Save profile"))
        }
    }
}
