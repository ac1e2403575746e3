/*
    spotify-era-rs | Rust CLI tool to sort Liked Songs into decade playlists.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A saved track, reduced to what the era sync needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRef {
    pub id: String,
    pub name: String,
    pub release_date: Option<String>, // "YYYY", "YYYY-MM" or "YYYY-MM-DD"
}

/// A playlist as it appears in the user's playlist listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

/// A playlist with the first page of its member track ids embedded.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Page<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
}

/// Opaque continuation token handed out by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a remote listing. `next == None` means there are no more pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }
}

/// Grouping key for saved tracks.
///
/// `Decade` holds `year / 10`, so 1994 and 1996 both land in `Decade(199)`.
/// `Undated` only exists when undated tracks are bucketed instead of rejected,
/// and always sorts after every decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Era {
    Decade(i32),
    Undated,
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Era::Decade(decade) => write!(f, "{}0s", decade),
            Era::Undated => write!(f, "undated"),
        }
    }
}

// Serialized as its label so it can key JSON objects.
impl Serialize for Era {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What to do with a track whose release date is missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UndatedPolicy {
    #[default]
    Error,
    Skip,
    Bucket,
}

/// Saved tracks partitioned by era. Keys iterate in ascending order.
#[derive(Debug, Default, Serialize)]
pub struct EraPlan {
    pub total_tracks: usize,
    pub groups: BTreeMap<Era, Vec<String>>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaylistAction {
    Created,
    Updated,
}

/// Outcome of synchronizing a single era playlist.
#[derive(Debug, Clone, Serialize)]
pub struct EraReport {
    pub era: Era,
    pub playlist_id: String,
    pub playlist_name: String,
    pub action: PlaylistAction,
    pub desired: usize,
    pub duplicates_removed: usize,
    pub tracks_added: usize,
    pub batches: usize,
}

/// Report for a full sync run.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub total_tracks: usize,
    pub skipped: Vec<String>,
    pub eras: Vec<EraReport>,
    pub pruned: Vec<String>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.eras
            .iter()
            .filter(|e| e.action == PlaylistAction::Created)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_display() {
        assert_eq!(Era::Decade(199).to_string(), "1990s");
        assert_eq!(Era::Decade(201).to_string(), "2010s");
        assert_eq!(Era::Undated.to_string(), "undated");
    }

    #[test]
    fn test_undated_sorts_after_decades() {
        let mut eras = vec![Era::Undated, Era::Decade(201), Era::Decade(196)];
        eras.sort();
        assert_eq!(eras, vec![Era::Decade(196), Era::Decade(201), Era::Undated]);
    }

    #[test]
    fn test_sync_report_counts_created() {
        let era = |era, action| EraReport {
            era,
            playlist_id: "p".to_string(),
            playlist_name: "n".to_string(),
            action,
            desired: 1,
            duplicates_removed: 0,
            tracks_added: 1,
            batches: 1,
        };

        let report = SyncReport {
            eras: vec![
                era(Era::Decade(199), PlaylistAction::Created),
                era(Era::Decade(200), PlaylistAction::Updated),
            ],
            ..Default::default()
        };

        assert_eq!(report.created(), 1);
    }

    #[test]
    fn test_sync_report_json_shape() {
        let report = SyncReport {
            total_tracks: 2,
            ..Default::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_tracks"], 2);
        assert!(json["eras"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_era_plan_serializes_eras_as_keys() {
        let mut plan = EraPlan::default();
        plan.groups.insert(Era::Decade(199), vec!["a".to_string()]);
        plan.groups.insert(Era::Undated, vec!["b".to_string()]);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["groups"]["1990s"][0], "a");
        assert_eq!(json["groups"]["undated"][0], "b");
    }
}
