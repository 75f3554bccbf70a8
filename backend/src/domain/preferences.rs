//! User preference types.
//!
//! One row per user capturing interests, an optional home location, and
//! notification/privacy settings. Preferences feed the discovery frontend;
//! the backend only stores and returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Notification delivery switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    /// Email notifications enabled.
    pub email: bool,
    /// Push notifications enabled.
    pub push: bool,
    /// Reminders before registered events.
    pub event_reminders: bool,
    /// Notifications for new recommendations.
    pub new_recommendations: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: false,
            event_reminders: true,
            new_recommendations: true,
        }
    }
}

/// Profile visibility options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    /// Profile visible to all users.
    #[default]
    Public,
    /// Profile hidden from other users.
    Private,
}

/// Privacy switches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    /// Who can see the profile.
    pub profile_visibility: ProfileVisibility,
    /// Whether the home location is shown on the profile.
    pub show_location: bool,
}

/// A user's preferred home location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferredLocation {
    /// City name.
    pub city: String,
    /// Country name.
    pub country: String,
}

/// Stored preferences for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// The user these preferences belong to.
    pub user_id: UserId,
    /// Interest categories; at least one is required on save.
    pub interests: Vec<String>,
    /// Preferred home location, if set.
    pub location: Option<PreferredLocation>,
    /// Notification switches.
    pub notification_settings: NotificationSettings,
    /// Privacy switches.
    pub privacy_settings: PrivacySettings,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a user's preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesUpsert {
    /// The user being updated.
    pub user_id: UserId,
    /// Interest categories; must not be empty.
    pub interests: Vec<String>,
    /// Preferred home location.
    pub location: Option<PreferredLocation>,
    /// Notification switches.
    pub notification_settings: NotificationSettings,
    /// Privacy switches.
    pub privacy_settings: PrivacySettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn notification_defaults_enable_email_and_reminders() {
        let defaults = NotificationSettings::default();
        assert!(defaults.email);
        assert!(defaults.event_reminders);
        assert!(!defaults.push);
    }

    #[rstest]
    fn settings_deserialise_with_partial_payloads() {
        let settings: NotificationSettings =
            serde_json::from_str(r#"{ "push": true }"#).expect("partial payload");
        assert!(settings.push);
        assert!(settings.email, "unspecified switches keep their defaults");

        let privacy: PrivacySettings =
            serde_json::from_str(r#"{ "profileVisibility": "private" }"#).expect("partial payload");
        assert_eq!(privacy.profile_visibility, ProfileVisibility::Private);
    }
}
