//! The create/edit workflow for a single user record.
//!
//! [`RecordForm`] is a plain state machine: events in, effects out.
//! [`FormDriver`] runs those effects against the backend.

pub mod driver;
pub mod error;
pub mod machine;
pub mod route;

pub use driver::{FormDriver, Outcome};
pub use error::{FetchError, SubmitError};
pub use machine::{Effect, FieldUpdate, FormEvent, FormMode, FormState, Notice, NoticeLevel, RecordForm};
pub use route::Route;
