#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid door count: {doors} (at least 3 doors are required)")]
    InvalidDoorCount { doors: u32 },
    #[error("Invalid trial count: at least 1 trial is required")]
    InvalidTrialCount,
    #[error("No door count configured")]
    NoDoorCounts,
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
