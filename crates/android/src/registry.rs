//! Notification channel registration
//!
//! Runs once when the app engine attaches. Registration is best effort: a
//! failure degrades the notification experience but never blocks startup,
//! so [`ChannelRegistry::register`] reports an outcome instead of an error.

use crate::channels::{default_channels, Importance, NotificationChannelDefinition};
use crate::platform::Platform;
use crate::store::ChannelStore;
use boofer_core::error::Result;
use boofer_core::validation::{ValidationResult, Validator};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened when the channel table was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// The platform has no channel model; nothing was submitted
    Skipped {
        /// Platform that was skipped
        platform: Platform,
    },
    /// The batch was accepted
    Registered {
        /// Number of definitions submitted
        count: usize,
    },
    /// The store rejected the batch
    Failed {
        /// Store error, rendered
        reason: String,
    },
}

/// Validated, immutable set of channel definitions
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    definitions: Vec<NotificationChannelDefinition>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self {
            definitions: default_channels(),
        }
    }
}

impl ChannelRegistry {
    /// Build a registry from custom definitions
    ///
    /// Fails when ids repeat or are empty, a display name is empty, or a
    /// channel bypasses Do Not Disturb without high importance.
    pub fn new(definitions: Vec<NotificationChannelDefinition>) -> Result<Self> {
        validate_definitions(&definitions)
            .to_result()
            .map_err(|e| {
                e.with_context("While building the notification channel table")
                    .with_suggestion("Fix the channel table before registering it")
            })?;
        Ok(Self { definitions })
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> &[NotificationChannelDefinition] {
        &self.definitions
    }

    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Option<&NotificationChannelDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Submit every definition to the OS table as one batch
    ///
    /// Safe to call repeatedly; the store upserts by id.
    pub fn register(&self, store: &dyn ChannelStore, platform: Platform) -> RegistrationOutcome {
        if !platform.supports_notification_channels() {
            debug!(%platform, "Platform has no notification channels, skipping registration");
            return RegistrationOutcome::Skipped { platform };
        }

        match store.create_channels(&self.definitions) {
            Ok(()) => {
                info!(count = self.definitions.len(), %platform, "Notification channels registered");
                RegistrationOutcome::Registered {
                    count: self.definitions.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Notification channel registration failed");
                RegistrationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Check a channel table for consistency
pub fn validate_definitions(definitions: &[NotificationChannelDefinition]) -> ValidationResult {
    let mut validator = Validator::new().unique("id", definitions.iter().map(|d| d.id.as_str()));

    for definition in definitions {
        let field = format!("channels.{}", definition.id);
        validator = validator
            .required("id", &definition.id)
            .required(&format!("{field}.display_name"), &definition.display_name)
            .custom(&format!("{field}.bypass_dnd"), || {
                (definition.bypass_dnd && definition.importance != Importance::High).then(|| {
                    format!(
                        "Bypassing Do Not Disturb requires high importance, found {}",
                        definition.importance
                    )
                })
            })
            .warn_if(
                &format!("{field}.description"),
                definition.description.is_empty(),
                "Channel has no description in OS settings",
            );
    }

    validator.validate()
}
