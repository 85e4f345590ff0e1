//! Output sinks for generated blog posts.
//!
//! - [`display::DisplaySink`]: write the markup verbatim to stdout or a file
//! - [`docs::DocsSink`]: create a Google Doc holding the markup and return its URL

pub mod display;
pub mod docs;

use async_trait::async_trait;
use blogsmith_common::{BlogsmithError, Result};
use blogsmith_config::SinkConfig;
use blogsmith_http::HttpError;
use std::sync::Arc;
use thiserror::Error;

pub use display::DisplaySink;
pub use docs::DocsSink;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write blog output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create document: {0}")]
    Create(#[source] HttpError),

    #[error("failed to insert text into document {document_id}: {source}")]
    Insert {
        document_id: String,
        #[source]
        source: HttpError,
    },

    #[error("document store returned an unusable response: {0}")]
    Malformed(String),
}

/// What happened to the post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Rendered to the user; nothing to link to.
    Displayed,
    /// Persisted remotely; `url` is where a person can open it.
    Stored { document_id: String, url: String },
}

impl SinkOutcome {
    pub fn reference(&self) -> Option<&str> {
        match self {
            SinkOutcome::Displayed => None,
            SinkOutcome::Stored { url, .. } => Some(url),
        }
    }
}

#[async_trait]
pub trait Sink: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Hand over the finished post. Called at most once per pipeline run.
    async fn publish(&self, title: &str, content: &str)
    -> std::result::Result<SinkOutcome, StoreError>;
}

/// Construct the sink described by `config`.
pub fn build_sink(config: &SinkConfig) -> Result<Arc<dyn Sink>> {
    let sink: Arc<dyn Sink> = match config {
        SinkConfig::Display { output: Some(path) } => Arc::new(DisplaySink::to_file(path)),
        SinkConfig::Display { output: None } => Arc::new(DisplaySink::stdout()),
        SinkConfig::Docs {
            access_token,
            endpoint,
        } => Arc::new(
            DocsSink::with_endpoint(access_token.clone(), endpoint)
                .map_err(|e| BlogsmithError::Config(format!("docs sink: {e}")))?,
        ),
    };
    Ok(sink)
}
