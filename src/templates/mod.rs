// Base template trait for inheritance
pub mod base_template;
pub use base_template::{BaseTemplate, FlashMessage, TemplateGlobals};

// Individual template files
pub mod user_form_template;
pub mod users_page_template;

pub use user_form_template::UserFormTemplate;
pub use users_page_template::UsersPageTemplate;
