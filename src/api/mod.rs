// Backend client modules
pub mod client;
pub mod error;
pub mod users;

pub use client::api_call;
pub use error::ApiError;
pub use users::{HttpUserApi, UserApi};
