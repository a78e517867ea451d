//! Android platform shell for Boofer
//!
//! This crate provides the Android-side behaviour of the app:
//! - The notification channel table and its registration
//! - The settings bridge behind the `com.shaadow.boofer/settings` method channel
//! - Platform version gating
//! - Release signing properties
//!
//! # Example
//!
//! ```rust
//! use boofer_android::prelude::*;
//!
//! let store = InMemoryChannelStore::new();
//! let outcome = ChannelRegistry::default().register(&store, Platform::new(34));
//! assert_eq!(outcome, RegistrationOutcome::Registered { count: 10 });
//!
//! let bridge = SettingsBridge::new("com.shaadow.boofer.android", Platform::new(34), RecordingNavigator::new());
//! let channel = MethodChannel::new(SETTINGS_CHANNEL, bridge);
//! let result = channel.invoke(&MethodCall::new(OPEN_NOTIFICATION_SETTINGS)).unwrap();
//! assert!(result.is_success());
//! ```

#![warn(missing_docs)]

pub mod channels;
pub mod method_channel;
pub mod platform;
pub mod registry;
pub mod settings;
pub mod signing;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::channels::{default_channels, ids, Importance, NotificationChannelDefinition, SoundRef};
    pub use crate::method_channel::{MethodCall, MethodCallHandler, MethodChannel, MethodResult};
    pub use crate::platform::Platform;
    pub use crate::registry::{ChannelRegistry, RegistrationOutcome};
    pub use crate::settings::{
        resolve_settings_intent, Navigator, RecordingNavigator, SettingsBridge, SettingsIntent,
        SettingsTarget, OPEN_NOTIFICATION_SETTINGS, SETTINGS_CHANNEL,
    };
    pub use crate::store::{ChannelStore, InMemoryChannelStore};
}
