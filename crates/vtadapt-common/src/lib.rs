pub mod actions;
pub mod error;
pub mod types;

pub use actions::VtAction;
pub use error::{DispatchError, Result};
