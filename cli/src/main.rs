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

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use era_core::{
    get_spotify_client, EraPlan, EraSync, PlaylistAction, SpotifyLibrary, SyncConfig,
    SyncReport, UndatedPolicy,
};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::process;

#[derive(Parser)]
#[command(name = "spotify-era")]
#[command(about = "Sorts your Spotify Liked Songs into one playlist per release decade", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates or updates one playlist per decade from your 'Liked Songs'
    Sync {
        #[command(flatten)]
        options: SyncOptions,
        /// Unfollow era playlists left behind by earlier runs
        #[arg(long)]
        prune: bool,
        /// Output the sync report to a JSON file (e.g., --json=report.json)
        #[arg(long)]
        json: Option<String>,
    },
    /// Shows which playlists a sync would create or update, without changing anything
    Plan {
        #[command(flatten)]
        options: SyncOptions,
        /// Output the plan to a JSON file
        #[arg(long)]
        json: Option<String>,
    },
    /// Unfollows era playlists that no longer match your 'Liked Songs'
    Prune {
        #[command(flatten)]
        options: SyncOptions,
    },
}

#[derive(Args)]
struct SyncOptions {
    /// Leading part of every era playlist name
    #[arg(long, default_value = era_core::sync::DEFAULT_PREFIX)]
    prefix: String,
    /// Maximum number of tracks sent per add/remove request
    #[arg(long, default_value_t = era_core::batch::DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Create new playlists as public
    #[arg(long)]
    public: bool,
    /// What to do with tracks that have no usable release date
    #[arg(long, value_enum, default_value_t = Undated::Error)]
    undated: Undated,
    /// Leave the track count out of playlist names
    #[arg(long)]
    stable_names: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Undated {
    /// Stop before touching any playlist
    Error,
    /// Leave the track out
    Skip,
    /// Collect such tracks in an "undated" playlist
    Bucket,
}

impl From<Undated> for UndatedPolicy {
    fn from(value: Undated) -> Self {
        match value {
            Undated::Error => UndatedPolicy::Error,
            Undated::Skip => UndatedPolicy::Skip,
            Undated::Bucket => UndatedPolicy::Bucket,
        }
    }
}

impl SyncOptions {
    fn into_config(self, prune: bool) -> SyncConfig {
        SyncConfig {
            prefix: self.prefix,
            batch_size: self.batch_size,
            public: self.public,
            undated: self.undated.into(),
            stable_names: self.stable_names,
            prune,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenv().is_err() {
        debug!("No .env file found, using the process environment");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync {
            options,
            prune,
            json,
        } => handle_sync(options.into_config(prune), json.as_deref()).await,
        Commands::Plan { options, json } => {
            handle_plan(options.into_config(false), json.as_deref()).await
        }
        Commands::Prune { options } => handle_prune(options.into_config(true)).await,
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("[ERROR] {:#}", e);
        process::exit(1);
    }
}

async fn get_syncer(config: SyncConfig) -> anyhow::Result<EraSync<SpotifyLibrary>> {
    if config.batch_size == 0 {
        anyhow::bail!("--batch-size must be at least 1");
    }
    let spotify = get_spotify_client()
        .await
        .context("Error initializing Spotify client")?;
    Ok(EraSync::new(SpotifyLibrary::new(spotify), config))
}

fn write_json<T: Serialize>(path: &str, value: &T) -> anyhow::Result<()> {
    let json_content = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path).with_context(|| format!("Failed to create file '{}'", path))?;
    file.write_all(json_content.as_bytes())
        .with_context(|| format!("Failed to write report to '{}'", path))?;
    println!();
    println!("[SAVED] Report saved to: {}", path);
    Ok(())
}

async fn handle_sync(config: SyncConfig, json_path: Option<&str>) -> anyhow::Result<()> {
    let syncer = get_syncer(config).await?;
    println!("Syncing Liked Songs into era playlists...");
    println!("This will fetch your entire library and playlists. Please wait.");

    let report = syncer.run().await.context("Sync failed")?;
    print_report(&report);

    if let Some(path) = json_path {
        write_json(path, &report)?;
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!();
    println!("---------------------------------------------------");
    println!("SYNC COMPLETE");
    println!("---------------------------------------------------");
    println!("Liked Songs Scanned:  {}", report.total_tracks);
    println!("Skipped (undated):    {}", report.skipped.len());
    println!("Era Playlists:        {}", report.eras.len());
    println!("Created:              {}", report.created());
    println!("---------------------------------------------------");

    if !report.eras.is_empty() {
        println!();
        println!(
            "{:<8} | {:<35} | {:<7} | {:<6} | {:<5}",
            "Era", "Playlist", "Action", "Tracks", "Dupes"
        );
        println!("{:-<8}-+-{:-<35}-+-{:-<7}-+-{:-<6}-+-{:-<5}", "", "", "", "", "");
        for era in &report.eras {
            let action = match era.action {
                PlaylistAction::Created => "Created",
                PlaylistAction::Updated => "Updated",
            };
            println!(
                "{:<8} | {:<35} | {:<7} | {:<6} | {:<5}",
                era.era.to_string(),
                era.playlist_name,
                action,
                era.tracks_added,
                era.duplicates_removed
            );
        }
    }

    if !report.pruned.is_empty() {
        println!();
        println!("[CLEANUP] Unfollowed {} stale playlists:", report.pruned.len());
        for name in &report.pruned {
            println!("   - {}", name);
        }
    }
}

async fn handle_plan(config: SyncConfig, json_path: Option<&str>) -> anyhow::Result<()> {
    let syncer = get_syncer(config).await?;
    println!("Fetching Liked Songs...");

    let plan = syncer.plan().await.context("Planning failed")?;
    print_plan(&plan, syncer.config());

    if let Some(path) = json_path {
        write_json(path, &plan)?;
    }
    Ok(())
}

fn print_plan(plan: &EraPlan, config: &SyncConfig) {
    println!();
    println!("---------------------------------------------------");
    println!("ERA PLAN");
    println!("---------------------------------------------------");
    println!("Liked Songs Scanned:  {}", plan.total_tracks);
    println!("Skipped (undated):    {}", plan.skipped.len());
    println!("---------------------------------------------------");
    for (era, tracks) in &plan.groups {
        println!(
            "{:<8} {:>6} tracks -> {}",
            era.to_string(),
            tracks.len(),
            config.playlist_name(*era, tracks.len())
        );
    }
}

async fn handle_prune(config: SyncConfig) -> anyhow::Result<()> {
    let syncer = get_syncer(config).await?;
    println!("Looking for stale era playlists...");

    let pruned = syncer.prune().await.context("Prune failed")?;
    println!();
    if pruned.is_empty() {
        println!("[OK] No stale era playlists found.");
    } else {
        println!("[CLEANUP] Unfollowed {} stale playlists:", pruned.len());
        for name in pruned {
            println!("   - {}", name);
        }
    }
    Ok(())
}
