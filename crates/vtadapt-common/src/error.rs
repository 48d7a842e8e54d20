use thiserror::Error;

/// Internal error vocabulary for the dispatch and math helpers.
///
/// Never crosses the public `VtDispatch` boundary: every public dispatch
/// method collapses these to a `handled: bool`. This type exists so
/// internal helpers have a real `Result` to propagate with `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("parameter error: {0}")]
    Parameter(String),

    #[error("console façade call failed: {0}")]
    Facade(String),

    #[error("unsupported action: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
