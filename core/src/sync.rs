use crate::batch::{apply_batched, DEFAULT_BATCH_SIZE};
use crate::diff::{find_duplicates, membership};
use crate::era::{group_by_era, sorted_eras};
use crate::error::{EraError, Result, SyncStep};
use crate::library::MusicLibrary;
use crate::models::{
    Era, EraPlan, EraReport, Playlist, PlaylistAction, PlaylistRef, SyncReport, UndatedPolicy,
    UserRef,
};
use crate::paginate::{drain, fetch_all};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const DEFAULT_PREFIX: &str = "spotifyera";

/// Settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Leading part of every era playlist name.
    pub prefix: String,
    pub batch_size: usize,
    /// Visibility of newly created playlists.
    pub public: bool,
    pub undated: UndatedPolicy,
    /// Leave the track count out of playlist names so re-runs find the same playlist.
    pub stable_names: bool,
    /// Unfollow era playlists that are no longer a target of this run.
    pub prune: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            public: false,
            undated: UndatedPolicy::Error,
            stable_names: false,
            prune: false,
        }
    }
}

impl SyncConfig {
    pub fn playlist_name(&self, era: Era, count: usize) -> String {
        if self.stable_names {
            format!("{} - {}", self.prefix, era)
        } else {
            format!("{} - {} - ({})", self.prefix, era, count)
        }
    }

    pub fn playlist_description(&self, era: Era) -> String {
        format!(
            "auto generated playlist based on release year from your liked song, this is era: {}",
            era
        )
    }

    fn is_era_playlist(&self, name: &str) -> bool {
        name.starts_with(&format!("{} - ", self.prefix))
    }
}

/// Name -> id index over the user's playlists. The first playlist with a given name wins.
pub fn index_by_name(playlists: &[PlaylistRef]) -> HashMap<&str, &str> {
    let mut index = HashMap::with_capacity(playlists.len());
    for playlist in playlists {
        index
            .entry(playlist.name.as_str())
            .or_insert(playlist.id.as_str());
    }
    index
}

/// Keeps one playlist per release decade in step with the user's Liked Songs.
pub struct EraSync<L> {
    library: Arc<L>,
    config: SyncConfig,
}

impl<L: MusicLibrary> EraSync<L> {
    pub fn new(library: L, config: SyncConfig) -> Self {
        Self {
            library: Arc::new(library),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetches the saved tracks and groups them by era. Read only.
    pub async fn plan(&self) -> Result<EraPlan> {
        let library = self.library.as_ref();

        info!("Fetching saved tracks");
        let tracks = fetch_all(move |cursor| library.saved_tracks(cursor)).await?;
        let plan = group_by_era(&tracks, self.config.undated)?;

        info!(
            "Grouped {} saved tracks into {} eras ({} skipped)",
            plan.total_tracks,
            plan.groups.len(),
            plan.skipped.len()
        );
        Ok(plan)
    }

    async fn user_playlists(&self) -> Result<Vec<PlaylistRef>> {
        let library = self.library.as_ref();
        info!("Fetching user's playlists");
        Ok(fetch_all(move |cursor| library.playlists(cursor)).await?)
    }

    /// Runs a full sync: every era playlist is resolved and filled in ascending era order.
    ///
    /// Stops at the first error. Playlists already synced in this run keep their changes.
    pub async fn run(&self) -> Result<SyncReport> {
        let user = self.library.current_user().await?;
        let plan = self.plan().await?;
        let playlists = self.user_playlists().await?;
        let index = index_by_name(&playlists);

        let mut report = SyncReport {
            total_tracks: plan.total_tracks,
            skipped: plan.skipped.clone(),
            ..Default::default()
        };

        for era in sorted_eras(&plan.groups) {
            let tracks = &plan.groups[&era];
            report
                .eras
                .push(self.sync_era(&user, era, tracks, &index).await?);
        }

        if self.config.prune {
            report.pruned = self.prune_playlists(&plan, &playlists).await?;
        }

        Ok(report)
    }

    /// Unfollows stale era playlists without touching the current ones.
    pub async fn prune(&self) -> Result<Vec<String>> {
        let plan = self.plan().await?;
        let playlists = self.user_playlists().await?;
        self.prune_playlists(&plan, &playlists).await
    }

    async fn prune_playlists(
        &self,
        plan: &EraPlan,
        playlists: &[PlaylistRef],
    ) -> Result<Vec<String>> {
        let targets: HashSet<String> = plan
            .groups
            .iter()
            .map(|(era, tracks)| self.config.playlist_name(*era, tracks.len()))
            .collect();

        // Only the playlist a sync resolves to survives; later ones with the same name go too.
        let mut kept: HashSet<&str> = HashSet::new();
        let mut pruned = Vec::new();
        for playlist in playlists {
            if !self.config.is_era_playlist(&playlist.name) {
                continue;
            }
            if targets.contains(&playlist.name) && kept.insert(playlist.name.as_str()) {
                continue;
            }
            info!("Unfollowing stale playlist: {} ({})", playlist.name, playlist.id);
            self.library.unfollow_playlist(&playlist.id).await?;
            pruned.push(playlist.name.clone());
        }
        Ok(pruned)
    }

    async fn sync_era(
        &self,
        user: &UserRef,
        era: Era,
        tracks: &[String],
        index: &HashMap<&str, &str>,
    ) -> Result<EraReport> {
        let wrap = |step: SyncStep| {
            move |source: EraError| EraError::Era {
                era: era.to_string(),
                step,
                source: Box::new(source),
            }
        };

        let name = self.config.playlist_name(era, tracks.len());
        let (playlist, action) = self
            .resolve_playlist(user, era, &name, index)
            .await
            .map_err(wrap(SyncStep::Resolve))?;

        let Playlist {
            id: playlist_id,
            name: playlist_name,
            tracks: first_page,
            ..
        } = playlist;
        let library = self.library.as_ref();
        let id = playlist_id.as_str();

        info!("Fetching tracks of playlist: {}", playlist_name);
        let current = drain(first_page, move |cursor| library.playlist_tracks(id, cursor))
            .await
            .map_err(|partial| wrap(SyncStep::FetchTracks)(partial.into()))?;

        let members = membership(&current);
        let duplicates = find_duplicates(tracks, &members);
        let mut batches = 0;

        if !duplicates.is_empty() {
            info!(
                "Deleting {} duplicate tracks from playlist: {}",
                duplicates.len(),
                playlist_name
            );
            batches += apply_batched(&duplicates, self.config.batch_size, move |chunk| {
                async move { library.remove_tracks(id, &chunk).await }
            })
            .await
            .map_err(wrap(SyncStep::RemoveDuplicates))?;
        }

        info!("Adding {} tracks to playlist: {}", tracks.len(), playlist_name);
        batches += apply_batched(tracks, self.config.batch_size, move |chunk| async move {
            library.add_tracks(id, &chunk).await
        })
        .await
        .map_err(wrap(SyncStep::AddTracks))?;

        Ok(EraReport {
            era,
            playlist_id,
            playlist_name,
            action,
            desired: tracks.len(),
            duplicates_removed: duplicates.len(),
            tracks_added: tracks.len(),
            batches,
        })
    }

    async fn resolve_playlist(
        &self,
        user: &UserRef,
        era: Era,
        name: &str,
        index: &HashMap<&str, &str>,
    ) -> Result<(Playlist, PlaylistAction)> {
        if let Some(id) = index.get(name) {
            info!("Playlist {} exists, fetching...", name);
            let playlist = self.library.playlist(id).await.map_err(|e| match e {
                EraError::NotFound(_) => EraError::NotFound(format!("{} ({})", name, id)),
                other => other,
            })?;
            return Ok((playlist, PlaylistAction::Updated));
        }

        info!("Playlist {} doesn't exist, creating...", name);
        let description = self.config.playlist_description(era);
        let playlist = self
            .library
            .create_playlist(&user.id, name, &description, self.config.public)
            .await?;
        debug!("Created playlist {} ({})", playlist.name, playlist.id);
        Ok((playlist, PlaylistAction::Created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist_ref(id: &str, name: &str) -> PlaylistRef {
        PlaylistRef {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_playlist_names() {
        let config = SyncConfig::default();
        assert_eq!(
            config.playlist_name(Era::Decade(199), 42),
            "spotifyera - 1990s - (42)"
        );
        assert!(config
            .playlist_description(Era::Decade(200))
            .ends_with("this is era: 2000s"));

        let stable = SyncConfig {
            stable_names: true,
            ..Default::default()
        };
        assert_eq!(stable.playlist_name(Era::Decade(199), 42), "spotifyera - 1990s");
    }

    #[test]
    fn test_first_playlist_with_a_name_wins() {
        let playlists = vec![
            playlist_ref("first", "spotifyera - 1990s - (2)"),
            playlist_ref("other", "Road trip"),
            playlist_ref("second", "spotifyera - 1990s - (2)"),
        ];

        let index = index_by_name(&playlists);

        assert_eq!(index.len(), 2);
        assert_eq!(index["spotifyera - 1990s - (2)"], "first");
    }

    #[test]
    fn test_era_playlist_detection_uses_prefix() {
        let config = SyncConfig::default();
        assert!(config.is_era_playlist("spotifyera - 1990s - (2)"));
        assert!(!config.is_era_playlist("spotifyera"));
        assert!(!config.is_era_playlist("Road trip"));
    }
}
