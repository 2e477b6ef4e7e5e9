use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    error, info, logging,
    source::SourceRef,
    spotify::SpotifyClient,
    success,
    sync::{self, ProgressSink, SyncOptions, SyncOutcome},
    types::{SourcePlaylist, UnresolvedTableRow},
    warning,
};

use super::{ensure_user_session, load_settings, new_session};

pub async fn convert(
    source: String,
    name: Option<String>,
    concurrency: Option<usize>,
    dry_run: bool,
) {
    let settings = load_settings();
    let session = new_session(&settings);

    let source_ref = match SourceRef::parse(&source) {
        Ok(source_ref) => source_ref,
        Err(e) => error!("{}", e),
    };

    let pb = spinner("Loading source playlist...");
    let playlist: SourcePlaylist = match source_ref.load(session.http()).await {
        Ok(playlist) => playlist,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot load source playlist. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    if playlist.tracks.is_empty() {
        warning!("The source playlist has no tracks. Nothing to convert.");
        return;
    }
    success!("Found {} tracks.", playlist.tracks.len());

    let name = name
        .or_else(|| playlist.name.clone())
        .unwrap_or_else(|| "Converted playlist".to_string());

    if let Err(e) = session.refresh().await {
        error!("Cannot authenticate with Spotify. Err: {}", e);
    }
    if !dry_run {
        if let Err(e) = ensure_user_session(&session, &settings).await {
            error!("Cannot establish user session. Err: {}", e);
        }
    }

    let client = Arc::new(SpotifyClient::new(Arc::new(session)));
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }
    let options =
        SyncOptions::new(concurrency.unwrap_or(settings.concurrency)).with_cancel(cancel);

    info!("Resolving tracks on Spotify...");
    let pb = progress_bar(playlist.tracks.len() as u64);
    let progress: Arc<dyn ProgressSink> = Arc::new(pb.clone());

    if dry_run {
        let outcome = sync::sync_tracks(client, &playlist.tracks, &options, progress).await;
        pb.finish_and_clear();
        match outcome {
            Ok(outcome) => report(&outcome),
            Err(e) => error!("Conversion stopped. Err: {}", e),
        }
        info!("Dry run, no playlist was created.");
        return;
    }

    let result = sync::sync_playlist(client, &playlist, &name, &options, progress).await;
    pb.finish_and_clear();

    let report_result = match result {
        Ok(r) => r,
        Err(e) => error!("Conversion stopped. Err: {}", e),
    };
    report(&report_result.outcome);

    match report_result.playlist {
        Ok(written) => success!(
            "Added {} tracks to playlist \"{}\" ({}). Enjoy :)",
            written.tracks_written,
            name,
            written.id
        ),
        Err(e) => error!("Cannot write playlist \"{}\". Err: {}", name, e),
    }
}

fn report(outcome: &SyncOutcome) {
    if outcome.is_complete() {
        success!("All {} tracks have been converted.", outcome.slots.len());
        return;
    }

    let details = match logging::log_file() {
        Some(path) => format!(" Details are in {}.", path.display()),
        None => String::new(),
    };
    warning!(
        "{} of {} tracks could not be found.{}",
        outcome.failed_count(),
        outcome.slots.len(),
        details
    );

    let rows: Vec<UnresolvedTableRow> = outcome
        .unresolved
        .iter()
        .map(|u| UnresolvedTableRow {
            position: u.index + 1,
            title: u.track.title.clone(),
            artist: u.track.artist.clone(),
            reason: u.reason.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.blue} {pos}/{len} tracks ({eta})") {
        pb.set_style(style);
    }
    pb
}
