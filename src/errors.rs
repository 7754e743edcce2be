use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Represents all possible errors in the autoindex crate.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// Error indicating a transport level failure while fetching a listing.
    #[error("Failed to fetch {what}: {how}")]
    Fetch {
        /// The url that failed to be fetched.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The server answered with a non-success status code.
    #[error("Unexpected status {status} for {url}")]
    Status {
        /// The url that was requested.
        url: String,
        /// The HTTP status code returned by the server.
        status: u16,
    },

    /// The fetch was abandoned because the traversal was cancelled.
    #[error("Cancelled while fetching {url}")]
    Cancelled {
        /// The url whose fetch was abandoned.
        url: String,
    },

    /// Error indicating an invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error indicating a failure to parse data.
    #[error("Failed to parse {what}: {how}")]
    Parse {
        /// The item that failed to be parse.
        what: String,
        /// The reason for the failure.
        how: String,
    },
}
