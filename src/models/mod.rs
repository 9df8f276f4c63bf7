pub mod app_state;
pub mod permission;
pub mod user_record;
pub mod user_row;

pub use app_state::AppState;
pub use permission::{PermissionCategory, PermissionKey, PermissionSet};
pub use user_record::{UserRecord, UserType};
pub use user_row::UserRow;
