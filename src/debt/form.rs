//! The form for registering a debt.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    bank::Bank,
    debt::NewDebt,
    endpoints,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, InputKind, form_input,
        submit_button,
    },
    validation::{INVALID_CHOICE_MESSAGE, number_in_range, parse_number},
};

pub const SELECT_INSTITUTION_MESSAGE: &str = "Select an institution.";

/// The raw data entered by the user in the debt form.
///
/// Every field is kept as text so that the form can be shown again exactly
/// as the user typed it when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DebtForm {
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub credit_limit: String,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub annual_rate: String,
    #[serde(default)]
    pub minimum_payment: String,
}

/// The error message for each field of a [DebtForm], if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtFormErrors {
    pub bank_id: Option<String>,
    pub credit_limit: Option<String>,
    pub balance: Option<String>,
    pub annual_rate: Option<String>,
    pub minimum_payment: Option<String>,
}

impl DebtForm {
    /// Check every field and collect all of the errors at once.
    ///
    /// `lending_banks` are the institutions the user may choose from.
    pub fn validate(&self, lending_banks: &[Bank]) -> Result<NewDebt, DebtFormErrors> {
        let bank_id = validate_bank(&self.bank_id, lending_banks);
        let credit_limit = parse_number(&self.credit_limit)
            .and_then(|number| number_in_range(number, 1.0, None));
        let balance =
            parse_number(&self.balance).and_then(|number| number_in_range(number, 0.0, None));
        let annual_rate = parse_number(&self.annual_rate)
            .and_then(|number| number_in_range(number, 0.0, Some(200.0)));
        let minimum_payment = parse_number(&self.minimum_payment)
            .and_then(|number| number_in_range(number, 0.0, None));

        match (bank_id, credit_limit, balance, annual_rate, minimum_payment) {
            (Ok(bank_id), Ok(credit_limit), Ok(balance), Ok(annual_rate), Ok(minimum_payment)) => {
                Ok(NewDebt {
                    bank_id,
                    balance,
                    credit_limit,
                    annual_rate,
                    minimum_payment,
                })
            }
            (bank_id, credit_limit, balance, annual_rate, minimum_payment) => Err(DebtFormErrors {
                bank_id: bank_id.err(),
                credit_limit: credit_limit.err(),
                balance: balance.err(),
                annual_rate: annual_rate.err(),
                minimum_payment: minimum_payment.err(),
            }),
        }
    }
}

fn validate_bank(raw_bank_id: &str, lending_banks: &[Bank]) -> Result<i64, String> {
    let raw_bank_id = raw_bank_id.trim();

    if raw_bank_id.is_empty() {
        return Err(SELECT_INSTITUTION_MESSAGE.to_owned());
    }

    raw_bank_id
        .parse::<i64>()
        .ok()
        .filter(|bank_id| lending_banks.iter().any(|bank| bank.id == *bank_id))
        .ok_or_else(|| INVALID_CHOICE_MESSAGE.to_owned())
}

/// Render the debt form, filled in with `form` and showing `errors` next to their fields.
pub fn debt_form_view(form: &DebtForm, errors: &DebtFormErrors, banks: &[Bank]) -> Markup {
    let money = InputKind::Number {
        min: "0",
        step: "0.01",
    };

    html! {
        form
            id="debt-form"
            hx-post=(endpoints::DEBTS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            div
            {
                label for="bank_id" class=(FORM_LABEL_STYLE) { "Institution" }

                select
                    id="bank_id"
                    name="bank_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                    aria-invalid=[errors.bank_id.as_ref().map(|_| "true")]
                    required
                {
                    option value="" selected[form.bank_id.is_empty()] { "Select an institution" }

                    @for bank in banks {
                        @let value = bank.id.to_string();
                        option value=(value) selected[form.bank_id.trim() == value] { (bank.name) }
                    }
                }

                @if let Some(error) = &errors.bank_id {
                    p class=(FORM_ERROR_STYLE) { (error) }
                }
            }

            (form_input(
                "credit_limit",
                "Credit limit",
                InputKind::Number { min: "1", step: "0.01" },
                &form.credit_limit,
                errors.credit_limit.as_deref(),
            ))
            (form_input("balance", "Current balance", money, &form.balance, errors.balance.as_deref()))
            (form_input(
                "annual_rate",
                "Annual interest rate (%)",
                InputKind::Number { min: "0", step: "0.01" },
                &form.annual_rate,
                errors.annual_rate.as_deref(),
            ))
            (form_input(
                "minimum_payment",
                "Minimum monthly payment",
                money,
                &form.minimum_payment,
                errors.minimum_payment.as_deref(),
            ))

            (submit_button("Register credit"))
        }
    }
}

#[cfg(test)]
mod debt_form_tests {
    use scraper::Html;

    use crate::{
        bank::Bank,
        debt::NewDebt,
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_selected_option,
            must_get_form,
        },
        validation::{INVALID_CHOICE_MESSAGE, INVALID_NUMBER_MESSAGE, REQUIRED_MESSAGE},
    };

    use super::{DebtForm, DebtFormErrors, SELECT_INSTITUTION_MESSAGE, debt_form_view};

    fn banks() -> Vec<Bank> {
        vec![Bank {
            id: 3,
            name: "Banorte".to_owned(),
            country_of_origin: Some("Mexico".to_owned()),
            issues_credit_cards: true,
            grants_loans: true,
            institution_type: None,
        }]
    }

    fn valid_form() -> DebtForm {
        DebtForm {
            bank_id: "3".to_owned(),
            credit_limit: "20000".to_owned(),
            balance: "5000.50".to_owned(),
            annual_rate: "45".to_owned(),
            minimum_payment: "600".to_owned(),
        }
    }

    #[test]
    fn valid_form_produces_new_debt() {
        let got = valid_form().validate(&banks());

        assert_eq!(
            got,
            Ok(NewDebt {
                bank_id: 3,
                balance: 5000.5,
                credit_limit: 20_000.0,
                annual_rate: 45.0,
                minimum_payment: 600.0,
            })
        );
    }

    #[test]
    fn zero_balance_rate_and_minimum_are_accepted() {
        let form = DebtForm {
            balance: "0".to_owned(),
            annual_rate: "0".to_owned(),
            minimum_payment: "0".to_owned(),
            ..valid_form()
        };

        assert!(form.validate(&banks()).is_ok());
    }

    #[test]
    fn missing_bank_asks_for_institution() {
        let form = DebtForm {
            bank_id: String::new(),
            ..valid_form()
        };

        let errors = form.validate(&banks()).unwrap_err();

        assert_eq!(errors.bank_id.as_deref(), Some(SELECT_INSTITUTION_MESSAGE));
    }

    #[test]
    fn bank_outside_lending_list_is_not_a_valid_choice() {
        for bank_id in ["99", "banorte"] {
            let form = DebtForm {
                bank_id: bank_id.to_owned(),
                ..valid_form()
            };

            let errors = form.validate(&banks()).unwrap_err();

            assert_eq!(errors.bank_id.as_deref(), Some(INVALID_CHOICE_MESSAGE));
        }
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let form = DebtForm {
            bank_id: "3".to_owned(),
            credit_limit: "0.5".to_owned(),
            balance: "-1".to_owned(),
            annual_rate: "201".to_owned(),
            minimum_payment: "lots".to_owned(),
        };

        let errors = form.validate(&banks()).unwrap_err();

        assert_eq!(
            errors,
            DebtFormErrors {
                bank_id: None,
                credit_limit: Some("Number must be at least 1.".to_owned()),
                balance: Some("Number must be at least 0.".to_owned()),
                annual_rate: Some("Number must be between 0 and 200.".to_owned()),
                minimum_payment: Some(INVALID_NUMBER_MESSAGE.to_owned()),
            }
        );
    }

    #[test]
    fn empty_numbers_are_required() {
        let errors = DebtForm::default().validate(&banks()).unwrap_err();

        assert_eq!(errors.credit_limit.as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.minimum_payment.as_deref(), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn form_view_keeps_entered_values() {
        let form = valid_form();
        let markup = debt_form_view(&form, &DebtFormErrors::default(), &banks());
        let html = Html::parse_fragment(&markup.into_string());
        let form_element = must_get_form(&html);

        assert_hx_endpoint(&form_element, endpoints::DEBTS_API, "hx-post");
        assert_form_input_with_value(&form_element, "balance", "number", "5000.50");
        assert_selected_option(&form_element, "bank_id", "3");
    }
}
