use download_jobs::{CatalogResult, ResultKind};
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DownloadMode {
    Archive,
    Tracks,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadRequest {
    pub(crate) result: CatalogResult,
    pub(crate) mode: DownloadMode,
}

#[derive(Debug, Serialize)]
pub(crate) struct DownloadAccepted {
    pub(crate) title: String,
    pub(crate) kind: ResultKind,
    pub(crate) mode: DownloadMode,
    pub(crate) jobs: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct DataResponse<T> {
    pub(crate) data: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

impl ErrorResponse {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
