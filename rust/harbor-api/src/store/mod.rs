//! Persistence layer.
//!
//! A single record schema is reused polymorphically across a fixed set of
//! entity kinds, each stored in a disjoint namespace, plus a globally
//! unique library catalog. Backends sit behind repository traits; the
//! in-memory implementations live in [`memory`].

pub mod catalog;
pub mod entity;
pub mod memory;

pub use catalog::{
    CatalogOrder, CatalogRepository, CounterField, LibraryCatalog, LibraryItem, LibraryItemData,
    LibraryItemDraft,
};
pub use entity::{EntityDraft, EntityKind, EntityRecord, EntityRepository, EntityStore};
