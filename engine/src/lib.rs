//! Conversation engine for codequery.
//!
//! A [`Session`] owns the message history and drives the request / tool
//! execution loop against a single chat-completions endpoint. Tool calls are
//! run one at a time, in the order the model returned them.

mod prompt;
mod session;

use std::io;
use std::path::PathBuf;

use codequery_providers::ProviderError;

pub use session::Session;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("invalid working directory {path}: {source}")]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
