// Change feed trait for live database subscriptions
use crate::domain::flight::ChangeEvent;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Server-side exact-match predicate on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    pub field: String,
    pub value: String,
}

impl FeedFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("could not reach change feed: {0}")]
    Connect(String),

    #[error("change feed rejected subscription with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("change feed stream failed: {0}")]
    Transport(String),

    #[error("change document exceeds {0} bytes without a line break")]
    LineTooLong(usize),

    #[error("undecodable change document {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    /// Whether the subscription can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::Decode { .. })
    }
}

pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, FeedError>>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a live subscription delivering every change matching `filter`
    async fn subscribe(&self, filter: &FeedFilter) -> Result<ChangeStream, FeedError>;
}
