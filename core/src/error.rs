use crate::auth::AuthError;
use std::fmt;
use thiserror::Error;

/// The step of an era sync that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Resolve,
    FetchTracks,
    RemoveDuplicates,
    AddTracks,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            SyncStep::Resolve => "resolve playlist",
            SyncStep::FetchTracks => "fetch playlist tracks",
            SyncStep::RemoveDuplicates => "remove duplicate tracks",
            SyncStep::AddTracks => "add tracks",
        };
        f.write_str(step)
    }
}

#[derive(Error, Debug)]
pub enum EraError {
    #[error("Spotify API error: {0}")]
    Spotify(#[from] rspotify::ClientError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Playlist not found: {0}")]
    NotFound(String),
    #[error("Track {track_id} has no usable release date: {reason}")]
    Data { track_id: String, reason: String },
    #[error("Invalid Spotify ID: {0}")]
    InvalidId(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Batch {batch} of {batches} failed: {source}")]
    Batch {
        batch: usize,
        batches: usize,
        source: Box<EraError>,
    },
    #[error("Era {era}: {step} failed: {source}")]
    Era {
        era: String,
        step: SyncStep,
        source: Box<EraError>,
    },
}

pub type Result<T> = std::result::Result<T, EraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_error_names_era_and_step() {
        let err = EraError::Era {
            era: "1990s".to_string(),
            step: SyncStep::AddTracks,
            source: Box::new(EraError::Batch {
                batch: 2,
                batches: 3,
                source: Box::new(EraError::NotFound("abc".to_string())),
            }),
        };

        assert_eq!(
            err.to_string(),
            "Era 1990s: add tracks failed: Batch 2 of 3 failed: Playlist not found: abc"
        );
    }
}
