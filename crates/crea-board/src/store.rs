//! In-memory campaign asset store

use crate::types::{Asset, AssetDraft};
use chrono::Utc;
use crea_core::{AssetId, Notice};

/// A mutation that just happened to the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added(Asset),
    Removed(Asset),
    Cleared { removed: usize },
}

impl StoreEvent {
    /// The confirmation shown to the user for this mutation
    pub fn notice(&self) -> Notice {
        match self {
            StoreEvent::Added(asset) => Notice::info(
                "Asset Added to Board",
                format!("New '{}' asset has been saved.", asset.asset_type()),
            ),
            StoreEvent::Removed(_) => Notice::destructive(
                "Asset Removed",
                "The asset has been removed from your campaign board.",
            ),
            StoreEvent::Cleared { .. } => Notice::info(
                "Board Cleared",
                "All assets have been removed from your campaign board.",
            ),
        }
    }
}

/// Handle returned by [`AssetStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Ordered collection of committed assets for one session.
///
/// Assets are kept in commit order internally and exposed most-recent-first.
/// Subscribers are called synchronously after every mutation.
#[derive(Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize a draft with a fresh id and timestamp and put it first
    pub fn add(&mut self, draft: AssetDraft) -> Asset {
        let asset = Asset::from_draft(draft, Utc::now());
        tracing::debug!(id = %asset.id(), kind = %asset.asset_type(), "asset added to board");
        self.assets.push(asset.clone());
        self.notify(&StoreEvent::Added(asset.clone()));
        asset
    }

    /// Remove the asset with this id. Unknown ids are ignored.
    pub fn remove(&mut self, id: AssetId) -> Option<Asset> {
        let index = self.assets.iter().position(|a| a.id() == id)?;
        let removed = self.assets.remove(index);
        tracing::debug!(id = %id, "asset removed from board");
        self.notify(&StoreEvent::Removed(removed.clone()));
        Some(removed)
    }

    /// Remove every asset
    pub fn clear(&mut self) {
        let removed = self.assets.len();
        self.assets.clear();
        tracing::debug!(removed, "board cleared");
        self.notify(&StoreEvent::Cleared { removed });
    }

    /// Snapshot of all assets, most recent first
    pub fn list(&self) -> Vec<Asset> {
        self.iter().cloned().collect()
    }

    /// Iterate assets most recent first
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().rev()
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Register a callback invoked after each mutation
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("assets", &self.assets.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
