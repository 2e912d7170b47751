//! Library directory watching
//!
//! Forwards media additions and removals in the library directory over a
//! channel. Listings still re-read the directory; events only say when it
//! is worth doing so.

use crate::error::Result;
use crate::media::MediaClassifier;
use crossbeam_channel::Sender;
use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use std::path::Path;
use tracing::{debug, warn};

/// A change to the set of media files
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LibraryEvent {
    Added(String),
    Removed(String),
}

impl LibraryEvent {
    pub fn name(&self) -> &str {
        match self {
            LibraryEvent::Added(name) | LibraryEvent::Removed(name) => name,
        }
    }
}

/// Watch `dir` (non-recursively) and send media events to `tx`
///
/// The returned watcher must be kept alive for events to flow.
pub fn start_watcher(
    dir: &Path,
    classifier: MediaClassifier,
    tx: Sender<LibraryEvent>,
) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for library_event in classify_event(&event, &classifier) {
                if tx.send(library_event).is_err() {
                    debug!("Watch receiver dropped");
                    return;
                }
            }
        }
        Err(e) => warn!(error = %e, "Watch error"),
    })?;

    watcher.configure(Config::default())?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    debug!(?dir, "Watching library directory");
    Ok(watcher)
}

/// Translate a filesystem event into media events
pub fn classify_event(event: &Event, classifier: &MediaClassifier) -> Vec<LibraryEvent> {
    let media_names = |paths: &[std::path::PathBuf]| -> Vec<String> {
        paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .filter(|name| crate::media::is_media(classifier.classify(name)))
            .map(str::to_string)
            .collect()
    };

    match &event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            media_names(event.paths.as_slice())
                .into_iter()
                .map(LibraryEvent::Added)
                .collect()
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            media_names(event.paths.as_slice())
                .into_iter()
                .map(LibraryEvent::Removed)
                .collect()
        }
        // Rename with both ends: paths are [from, to]
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut events = Vec::new();
            if let Some(from) = event.paths.first() {
                events.extend(
                    media_names(std::slice::from_ref(from))
                        .into_iter()
                        .map(LibraryEvent::Removed),
                );
            }
            if let Some(to) = event.paths.get(1) {
                events.extend(
                    media_names(std::slice::from_ref(to))
                        .into_iter()
                        .map(LibraryEvent::Added),
                );
            }
            events
        }
        _ => Vec::new(),
    }
}
