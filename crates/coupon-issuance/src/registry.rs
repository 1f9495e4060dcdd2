use crate::{Campaign, CampaignId, Error, Result};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// Concurrent map from campaign ID to campaign.
///
/// A single [`Mutex`] guards the whole map. Every operation holds it only for
/// `Arc` bookkeeping; pools, code rendering and clock reads all happen
/// outside the lock.
#[derive(Debug, Default)]
pub struct CampaignRegistry {
    campaigns: Mutex<HashMap<CampaignId, Arc<Campaign>>>,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `campaign`, replacing any entry with the same ID.
    pub fn add(&self, campaign: Arc<Campaign>) {
        self.campaigns.lock().insert(campaign.id(), campaign);
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no campaign is registered under `id`.
    pub fn get(&self, id: CampaignId) -> Result<Arc<Campaign>> {
        self.campaigns
            .lock()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { id })
    }

    /// Removes the campaign registered under `id`, if any.
    pub fn delete(&self, id: CampaignId) {
        self.campaigns.lock().remove(&id);
    }

    /// Snapshot of every registered campaign, in no particular order.
    pub fn list(&self) -> Vec<Arc<Campaign>> {
        self.campaigns.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.campaigns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.lock().is_empty()
    }
}
