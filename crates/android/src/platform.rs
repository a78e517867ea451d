//! Android platform version model

use serde::{Deserialize, Serialize};
use std::fmt;

/// API level of the running Android platform (`Build.VERSION.SDK_INT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform {
    /// Raw API level
    pub sdk_int: u32,
}

impl Platform {
    /// Android 6.0, the lowest level the app ships to
    pub const MIN_SUPPORTED: u32 = 23;

    /// Android 8.0 "O": notification channels and per-app notification settings
    pub const O: u32 = 26;

    /// Create a platform for the given API level
    pub const fn new(sdk_int: u32) -> Self {
        Self { sdk_int }
    }

    /// Whether notifications must be posted to a registered channel
    pub fn supports_notification_channels(&self) -> bool {
        self.sdk_int >= Self::O
    }

    /// Whether the OS has an app-specific notification settings screen
    pub fn has_app_notification_settings(&self) -> bool {
        self.sdk_int >= Self::O
    }

    /// Whether the app supports this platform at all
    pub fn is_supported(&self) -> bool {
        self.sdk_int >= Self::MIN_SUPPORTED
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {}", self.sdk_int)
    }
}
