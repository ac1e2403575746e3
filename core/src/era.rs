use crate::error::{EraError, Result};
use crate::models::{Era, EraPlan, TrackRef, UndatedPolicy};
use log::debug;
use std::collections::BTreeMap;

/// Extracts the year from a Spotify release date (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
///
/// Spotify uses `0000` for albums with an unknown date; that is rejected too.
pub fn release_year(date: &str) -> std::result::Result<i32, String> {
    let year = date.split('-').next().unwrap_or_default().trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("unexpected release date format '{}'", date));
    }
    match year.parse::<i32>() {
        Ok(0) => Err("release date is the 0000 placeholder".to_string()),
        Ok(y) => Ok(y),
        Err(_) => Err(format!("unparseable release year '{}'", year)),
    }
}

impl Era {
    pub fn from_year(year: i32) -> Self {
        Era::Decade(year / 10)
    }

    pub fn from_release_date(date: &str) -> std::result::Result<Self, String> {
        release_year(date).map(Era::from_year)
    }
}

/// Partitions tracks by release decade, keeping source order inside each era.
pub fn group_by_era(tracks: &[TrackRef], policy: UndatedPolicy) -> Result<EraPlan> {
    let mut plan = EraPlan {
        total_tracks: tracks.len(),
        ..Default::default()
    };

    for track in tracks {
        let era = match track.release_date.as_deref() {
            Some(date) => Era::from_release_date(date),
            None => Err("missing release date".to_string()),
        };

        let era = match (era, policy) {
            (Ok(era), _) => era,
            (Err(reason), UndatedPolicy::Error) => {
                return Err(EraError::Data {
                    track_id: track.id.clone(),
                    reason,
                })
            }
            (Err(reason), UndatedPolicy::Skip) => {
                debug!("Skipping '{}' ({}): {}", track.name, track.id, reason);
                plan.skipped.push(track.id.clone());
                continue;
            }
            (Err(_), UndatedPolicy::Bucket) => Era::Undated,
        };

        plan.groups.entry(era).or_default().push(track.id.clone());
    }

    Ok(plan)
}

/// Distinct eras in processing order (oldest decade first).
pub fn sorted_eras(groups: &BTreeMap<Era, Vec<String>>) -> Vec<Era> {
    groups.keys().copied().collect()
}
