pub mod charset;
pub mod dispatch;
pub mod facade;
pub mod geometry;
pub mod mock;
pub mod state;
pub mod terminal;

pub use dispatch::{DispatchConfig, VtDispatch};
pub use facade::ConsoleApi;
