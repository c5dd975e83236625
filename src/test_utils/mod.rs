//! Assertions shared by the handler and view tests.

#![allow(missing_docs)]

mod form;
mod response;

pub(crate) use form::{
    assert_field_error, assert_form_input, assert_form_input_with_value, assert_form_submit_button,
    assert_hx_endpoint, assert_selected_option, must_get_form,
};
pub(crate) use response::{
    assert_content_type, assert_hx_redirect, assert_valid_html, get_header, must_select_text,
    parse_html_document, parse_html_fragment,
};
