// Request parsing helpers
pub mod checkbox;
pub mod url_parser;

// Terminal output helpers
pub mod json_converter;

pub use checkbox::checkbox_checked;
pub use json_converter::value_to_short_string;
pub use url_parser::hostname_from_url;
