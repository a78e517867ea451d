//! Deep link into the OS notification settings
//!
//! Android 8.0 added a per-app notification settings screen. Older
//! platforms only have the generic app details screen, which is where the
//! notification toggle lives there.

use crate::method_channel::{MethodCall, MethodCallHandler, MethodResult};
use crate::platform::Platform;
use boofer_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Name of the channel that exposes the settings bridge
pub const SETTINGS_CHANNEL: &str = "com.shaadow.boofer/settings";

/// The one method the settings bridge understands
pub const OPEN_NOTIFICATION_SETTINGS: &str = "openNotificationSettings";

/// `Settings.ACTION_APP_NOTIFICATION_SETTINGS`
pub const ACTION_APP_NOTIFICATION_SETTINGS: &str = "android.settings.APP_NOTIFICATION_SETTINGS";

/// `Settings.ACTION_APPLICATION_DETAILS_SETTINGS`
pub const ACTION_APPLICATION_DETAILS_SETTINGS: &str =
    "android.settings.APPLICATION_DETAILS_SETTINGS";

/// `Settings.EXTRA_APP_PACKAGE`
pub const EXTRA_APP_PACKAGE: &str = "android.provider.extra.APP_PACKAGE";

/// Which settings screen to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsTarget {
    /// The app's own notification settings
    AppNotificationSettings,
    /// The generic application details screen
    AppDetailsSettings,
}

/// Pick the settings screen for a platform version
pub fn resolve_settings_intent(sdk_int: u32) -> SettingsTarget {
    if Platform::new(sdk_int).has_app_notification_settings() {
        SettingsTarget::AppNotificationSettings
    } else {
        SettingsTarget::AppDetailsSettings
    }
}

/// A navigation request for the host to start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsIntent {
    /// Screen being opened
    pub target: SettingsTarget,
    /// Intent action
    pub action: String,
    /// Intent data URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Intent extras
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<(String, String)>,
}

impl SettingsIntent {
    /// Build the intent for a target screen and app package
    pub fn for_target(target: SettingsTarget, package: &str) -> Self {
        match target {
            SettingsTarget::AppNotificationSettings => Self {
                target,
                action: ACTION_APP_NOTIFICATION_SETTINGS.to_string(),
                data: None,
                extras: vec![(EXTRA_APP_PACKAGE.to_string(), package.to_string())],
            },
            SettingsTarget::AppDetailsSettings => Self {
                target,
                action: ACTION_APPLICATION_DETAILS_SETTINGS.to_string(),
                data: Some(format!("package:{package}")),
                extras: Vec::new(),
            },
        }
    }

    /// Value of an extra
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Starts activities on the host
pub trait Navigator {
    /// Issue the navigation request; returns once it is issued
    fn start_activity(&self, intent: &SettingsIntent) -> Result<()>;
}

/// Navigator that records intents instead of starting them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    started: Mutex<Vec<SettingsIntent>>,
}

impl RecordingNavigator {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Intents issued so far
    pub fn started(&self) -> Vec<SettingsIntent> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn start_activity(&self, intent: &SettingsIntent) -> Result<()> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(intent.clone());
        Ok(())
    }
}

/// Handler behind [`SETTINGS_CHANNEL`]
///
/// Stateless apart from the navigator, so concurrent calls simply issue
/// independent intents.
pub struct SettingsBridge<N> {
    package: String,
    platform: Platform,
    navigator: N,
}

impl<N: Navigator> SettingsBridge<N> {
    /// Create a bridge for an app package on a platform
    pub fn new(package: impl Into<String>, platform: Platform, navigator: N) -> Self {
        Self {
            package: package.into(),
            platform,
            navigator,
        }
    }

    /// The navigator intents are sent through
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Open the notification settings screen
    ///
    /// Fire-and-forget: returns once the intent is issued, not once the
    /// user has acted on it.
    pub fn open_notification_settings(&self) -> Result<SettingsIntent> {
        let target = resolve_settings_intent(self.platform.sdk_int);
        let intent = SettingsIntent::for_target(target, &self.package);
        self.navigator.start_activity(&intent)?;
        info!(action = %intent.action, platform = %self.platform, "Opened notification settings");
        Ok(intent)
    }
}

impl<N: Navigator> MethodCallHandler for SettingsBridge<N> {
    fn on_method_call(&self, call: &MethodCall) -> Result<MethodResult> {
        match call.method.as_str() {
            OPEN_NOTIFICATION_SETTINGS => {
                self.open_notification_settings()?;
                Ok(MethodResult::Success(Value::Bool(true)))
            }
            _ => Ok(MethodResult::NotImplemented),
        }
    }
}
