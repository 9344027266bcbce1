use thiserror::Error;
use tgsync_common::StoreError;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid {what} body: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub(crate) fn json(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Json { what, source }
    }
}

impl From<DecodeError> for StoreError {
    fn from(err: DecodeError) -> Self {
        StoreError::Decode(err.to_string())
    }
}
