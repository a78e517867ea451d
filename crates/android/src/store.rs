//! The OS notification channel table
//!
//! The channel table belongs to the OS, not to the app: the app can only
//! submit definitions and read back what the OS kept. [`ChannelStore`]
//! models it as an external key-value store keyed by channel id.

use crate::channels::NotificationChannelDefinition;
use boofer_core::error::Result;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// OS-owned notification channel table
pub trait ChannelStore {
    /// Submit a batch of definitions
    ///
    /// Implementations upsert by id. Creating a channel that already exists
    /// refreshes only its name and description; behaviour the user may have
    /// customised stays as stored.
    fn create_channels(&self, channels: &[NotificationChannelDefinition]) -> Result<()>;

    /// Look up a registered channel
    fn channel(&self, id: &str) -> Option<NotificationChannelDefinition>;

    /// Ids of every registered channel, sorted
    fn channel_ids(&self) -> Vec<String>;
}

/// In-process channel table with the platform's upsert semantics
///
/// Used by tests and the CLI dry run in place of `NotificationManager`.
#[derive(Debug, Default)]
pub struct InMemoryChannelStore {
    channels: RwLock<BTreeMap<String, NotificationChannelDefinition>>,
}

impl InMemoryChannelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.read(|channels| channels.len())
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply a user edit from the OS settings screen
    ///
    /// Returns `false` when the channel does not exist.
    pub fn customize<F>(&self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut NotificationChannelDefinition),
    {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        match channels.get_mut(id) {
            Some(channel) => {
                edit(channel);
                true
            }
            None => false,
        }
    }

    fn read<T>(&self, f: impl FnOnce(&BTreeMap<String, NotificationChannelDefinition>) -> T) -> T {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        f(&channels)
    }
}

impl ChannelStore for InMemoryChannelStore {
    fn create_channels(&self, definitions: &[NotificationChannelDefinition]) -> Result<()> {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);

        for definition in definitions {
            match channels.get_mut(&definition.id) {
                Some(existing) => {
                    existing.display_name.clone_from(&definition.display_name);
                    existing.description.clone_from(&definition.description);
                }
                None => {
                    channels.insert(definition.id.clone(), definition.clone());
                }
            }
        }

        Ok(())
    }

    fn channel(&self, id: &str) -> Option<NotificationChannelDefinition> {
        self.read(|channels| channels.get(id).cloned())
    }

    fn channel_ids(&self) -> Vec<String> {
        self.read(|channels| channels.keys().cloned().collect())
    }
}
