//! Pure reconciliation between a directory snapshot and the favorites list
//!
//! Nothing here does I/O or keeps state between calls. Every listing is
//! rebuilt from the snapshot it is given.

use crate::config::OrderPolicy;
use crate::media::{MediaClassifier, MediaItem};
use std::collections::HashSet;

/// Media items in a snapshot, in listing order, first occurrence of each name
fn media_in<'a, S: AsRef<str>>(
    directory_names: &'a [S],
    classifier: &'a MediaClassifier,
) -> impl Iterator<Item = MediaItem> + 'a {
    let mut seen = HashSet::new();
    directory_names
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(move |name| seen.insert(*name))
        .map(move |name| MediaItem::new(name, classifier))
        .filter(MediaItem::is_media)
}

/// Ordered gallery listing for a directory snapshot
///
/// Unknown files are dropped. With [`OrderPolicy::Timestamp`] items are
/// sorted by order key, then by name; with [`OrderPolicy::Listing`] the
/// snapshot order is kept.
pub fn list_gallery<S: AsRef<str>>(
    directory_names: &[S],
    classifier: &MediaClassifier,
    order: OrderPolicy,
) -> Vec<MediaItem> {
    let mut items: Vec<MediaItem> = media_in(directory_names, classifier).collect();

    if order == OrderPolicy::Timestamp {
        items.sort_by(|a, b| {
            a.order_key()
                .cmp(&b.order_key())
                .then_with(|| a.name().cmp(b.name()))
        });
    }

    items
}

/// Favorited media that still exists, in listing order
///
/// Dangling favorites are skipped silently. They stay in the persisted list
/// until removed explicitly.
pub fn list_favorites<S: AsRef<str>, F: AsRef<str>>(
    directory_names: &[S],
    favorite_names: &[F],
    classifier: &MediaClassifier,
) -> Vec<MediaItem> {
    let favorites: HashSet<&str> = favorite_names.iter().map(AsRef::<str>::as_ref).collect();
    if favorites.is_empty() {
        return Vec::new();
    }

    media_in(directory_names, classifier)
        .filter(|item| favorites.contains(item.name()))
        .collect()
}

/// Add `name` if absent, otherwise drop every occurrence of it
pub fn toggle_favorite(current: &[String], name: &str) -> Vec<String> {
    if current.iter().any(|f| f == name) {
        remove_favorite(current, name)
    } else {
        let mut next = current.to_vec();
        next.push(name.to_string());
        next
    }
}

/// Drop every occurrence of `name`; absent names are a no-op
pub fn remove_favorite(current: &[String], name: &str) -> Vec<String> {
    current.iter().filter(|f| *f != name).cloned().collect()
}

/// Favorites with no file in the snapshot, in favorites order, deduplicated
pub fn dangling_favorites<S: AsRef<str>>(directory_names: &[S], favorites: &[String]) -> Vec<String> {
    let present: HashSet<&str> = directory_names.iter().map(AsRef::<str>::as_ref).collect();
    let mut seen = HashSet::new();
    favorites
        .iter()
        .filter(|f| !present.contains(f.as_str()))
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect()
}
