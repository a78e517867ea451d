//! Notification channel definitions
//!
//! Each user-facing notification category maps to one OS channel. The
//! table returned by [`default_channels`] is the complete set the app
//! registers; channel ids are stable because the OS keys user
//! customisations by them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable channel ids
pub mod ids {
    /// Direct messages
    pub const MESSAGES: &str = "messages";
    /// Group chat messages
    pub const GROUP_MESSAGES: &str = "group_messages";
    /// Friend requests and acceptances
    pub const FRIEND_REQUESTS: &str = "friend_requests";
    /// Incoming voice and video calls
    pub const CALLS: &str = "calls";
    /// Missed calls
    pub const MISSED_CALLS: &str = "missed_calls";
    /// App updates and system notices
    pub const SYSTEM_ALERTS: &str = "system_alerts";
    /// Security and privacy notices
    pub const SECURITY_ALERTS: &str = "security_alerts";
    /// Mentions and replies
    pub const MENTIONS: &str = "mentions";
    /// Reactions to the user's messages
    pub const REACTIONS: &str = "reactions";
    /// Everything else
    pub const GENERAL: &str = "general";
}

/// How intrusively a channel's notifications are presented
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Shown in the shade only, no sound or peeking
    Silent,
    /// Shown everywhere, never makes noise
    Low,
    /// Makes noise, does not peek
    Default,
    /// Makes noise and peeks as a heads-up notification
    High,
}

impl Importance {
    /// The `NotificationManager.IMPORTANCE_*` value
    pub fn android_level(self) -> i32 {
        match self {
            Importance::Silent => 1,
            Importance::Low => 2,
            Importance::Default => 3,
            Importance::High => 4,
        }
    }

    /// Parse a lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "silent" => Some(Importance::Silent),
            "low" => Some(Importance::Low),
            "default" => Some(Importance::Default),
            "high" => Some(Importance::High),
            _ => None,
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Importance::Silent => "silent",
            Importance::Low => "low",
            Importance::Default => "default",
            Importance::High => "high",
        };
        f.write_str(name)
    }
}

/// Audio attributes attached to a channel sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttributes {
    /// `AudioAttributes.CONTENT_TYPE_*`
    pub content_type: AudioContentType,
    /// `AudioAttributes.USAGE_*`
    pub usage: AudioUsage,
}

impl AudioAttributes {
    /// Attributes for an ordinary notification alert
    pub const NOTIFICATION: Self = Self {
        content_type: AudioContentType::Sonification,
        usage: AudioUsage::Notification,
    };
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioContentType {
    Sonification,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioUsage {
    Notification,
}

/// Alert sound of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoundRef {
    /// The user's default notification sound
    SystemDefault {
        /// Playback attributes
        attributes: AudioAttributes,
    },
}

impl SoundRef {
    /// The default notification sound with notification attributes
    pub fn system_default() -> Self {
        SoundRef::SystemDefault {
            attributes: AudioAttributes::NOTIFICATION,
        }
    }
}

/// One category of user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannelDefinition {
    /// Stable key; the OS upserts by it
    pub id: String,
    /// Label shown in OS settings
    pub display_name: String,
    /// Purpose shown in OS settings
    pub description: String,
    /// Presentation level
    pub importance: Importance,
    /// Blink the notification light
    pub lights_enabled: bool,
    /// Vibrate on arrival
    pub vibration_enabled: bool,
    /// Alert sound, `None` for silent
    pub sound: Option<SoundRef>,
    /// Count towards the launcher badge
    pub show_badge: bool,
    /// May interrupt Do Not Disturb
    pub bypass_dnd: bool,
}

impl NotificationChannelDefinition {
    /// Create a definition with the platform defaults
    ///
    /// Freshly constructed OS channels play the default sound, show a badge,
    /// and neither blink nor vibrate.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, importance: Importance) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            importance,
            lights_enabled: false,
            vibration_enabled: false,
            sound: Some(SoundRef::system_default()),
            show_badge: true,
            bypass_dnd: false,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enable or disable the notification light
    #[must_use]
    pub fn lights(mut self, enabled: bool) -> Self {
        self.lights_enabled = enabled;
        self
    }

    /// Enable or disable vibration
    #[must_use]
    pub fn vibration(mut self, enabled: bool) -> Self {
        self.vibration_enabled = enabled;
        self
    }

    /// Set the alert sound; `None` makes the channel silent
    #[must_use]
    pub fn sound(mut self, sound: Option<SoundRef>) -> Self {
        self.sound = sound;
        self
    }

    /// Set badge participation
    #[must_use]
    pub fn badge(mut self, show: bool) -> Self {
        self.show_badge = show;
        self
    }

    /// Allow the channel to interrupt Do Not Disturb
    #[must_use]
    pub fn bypass_dnd(mut self, bypass: bool) -> Self {
        self.bypass_dnd = bypass;
        self
    }

    /// Whether the channel makes no sound
    pub fn is_silent(&self) -> bool {
        self.sound.is_none()
    }
}

/// The ten channels the app registers, in registration order
pub fn default_channels() -> Vec<NotificationChannelDefinition> {
    use Importance::{High, Low};
    let alert = || Some(SoundRef::system_default());

    vec![
        NotificationChannelDefinition::new(ids::MESSAGES, "Messages", High)
            .with_description("Notifications for new direct messages")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true),
        NotificationChannelDefinition::new(ids::GROUP_MESSAGES, "Group Messages", High)
            .with_description("Notifications for group chat messages")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true),
        NotificationChannelDefinition::new(ids::FRIEND_REQUESTS, "Friend Requests", High)
            .with_description("Notifications for new friend requests and acceptances")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true),
        NotificationChannelDefinition::new(ids::CALLS, "Calls", High)
            .with_description("Notifications for incoming voice and video calls")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true)
            .bypass_dnd(true),
        NotificationChannelDefinition::new(ids::MISSED_CALLS, "Missed Calls", High)
            .with_description("Notifications for missed calls")
            .lights(true)
            .vibration(false)
            .sound(alert())
            .badge(true),
        NotificationChannelDefinition::new(ids::SYSTEM_ALERTS, "System Alerts", Importance::Default)
            .with_description("Important app updates and system notifications")
            .lights(false)
            .vibration(false)
            .sound(alert())
            .badge(false),
        NotificationChannelDefinition::new(ids::SECURITY_ALERTS, "Security Alerts", High)
            .with_description("Critical security and privacy notifications")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true)
            .bypass_dnd(true),
        NotificationChannelDefinition::new(ids::MENTIONS, "Mentions & Replies", High)
            .with_description("When someone mentions you or replies to your message")
            .lights(true)
            .vibration(true)
            .sound(alert())
            .badge(true),
        NotificationChannelDefinition::new(ids::REACTIONS, "Reactions", Low)
            .with_description("When someone reacts to your messages")
            .lights(false)
            .vibration(false)
            .sound(None)
            .badge(false),
        NotificationChannelDefinition::new(ids::GENERAL, "General Notifications", Importance::Default)
            .with_description("Other app notifications")
            .lights(false)
            .vibration(false)
            .sound(alert())
            .badge(false),
    ]
}
