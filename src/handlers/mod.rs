pub mod helpers;
pub mod users;
pub mod validation;
