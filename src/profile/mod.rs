//! The user's financial profile.

mod form;
mod profile_page;
mod update_endpoint;

pub use form::{ProfileForm, ProfileFormErrors, profile_form_view};
pub use profile_page::get_profile_page;
pub use update_endpoint::update_profile_endpoint;
