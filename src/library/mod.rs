//! Library reconciliation
//!
//! `reconcile` holds the pure operations on snapshots and favorites lists;
//! `session` binds them to the storage collaborators for one application
//! session.

pub mod reconcile;
pub mod session;

pub use reconcile::{
    dangling_favorites, list_favorites, list_gallery, remove_favorite, toggle_favorite,
};
pub use session::{FavoriteChange, Library, MediaEntry};
