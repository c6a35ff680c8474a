//! Page error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Required element missing: {0}")]
    MissingElement(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Document error: {0}")]
    Dom(#[from] dashboard_dom::DomError),
}
