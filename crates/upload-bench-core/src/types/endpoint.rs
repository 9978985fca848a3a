//! The five upload strategies under test

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::Error;
use crate::constants::ENDPOINT_PREFIX;

/// How the client has to encode the request body for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEncoding {
    /// `multipart/form-data` with a `file` field
    Multipart,
    /// The file bytes are the request body
    Raw,
}

/// Upload endpoint, one per body consumption strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Whole file buffered by the framework, handler runs on the blocking pool
    SyncFile,
    /// Whole file buffered by the framework, handler runs on the async task
    AsyncFile,
    /// Spooled upload read in chunks on the blocking pool
    SyncUploadfile,
    /// Spooled upload read in chunks from the async task
    AsyncUploadfile,
    /// Raw request body consumed as a stream
    AsyncStream,
}

impl Endpoint {
    /// All endpoints in benchmark order
    pub const ALL: [Endpoint; 5] = [
        Endpoint::SyncFile,
        Endpoint::AsyncFile,
        Endpoint::SyncUploadfile,
        Endpoint::AsyncUploadfile,
        Endpoint::AsyncStream,
    ];

    /// All endpoints in benchmark order
    pub fn all() -> Vec<Endpoint> {
        Self::ALL.to_vec()
    }

    /// Short name, e.g. `async-stream`
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::SyncFile => "sync-file",
            Endpoint::AsyncFile => "async-file",
            Endpoint::SyncUploadfile => "sync-uploadfile",
            Endpoint::AsyncUploadfile => "async-uploadfile",
            Endpoint::AsyncStream => "async-stream",
        }
    }

    /// Route path, e.g. `/upload/async-stream`
    pub fn path(&self) -> String {
        format!("{}{}", ENDPOINT_PREFIX, self.name())
    }

    /// Request body encoding the endpoint expects
    pub fn encoding(&self) -> UploadEncoding {
        match self {
            Endpoint::AsyncStream => UploadEncoding::Raw,
            _ => UploadEncoding::Multipart,
        }
    }

    /// Strip the upload prefix from a route path
    pub fn name_from_path(path: &str) -> &str {
        path.strip_prefix(ENDPOINT_PREFIX).unwrap_or(path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Accepts either a name (`sync-file`) or a path (`/upload/sync-file`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = Endpoint::name_from_path(s.trim());
        Self::ALL
            .iter()
            .copied()
            .find(|endpoint| endpoint.name() == name)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "Unknown endpoint: {}. Valid options: {}",
                    s,
                    Self::ALL.map(|e| e.name()).join(", ")
                ))
            })
    }
}
