//! Request types for the Wayfarer API.

use serde::{Deserialize, Serialize};

/// Request body for a streaming discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverRequest {
    /// Free-text user message.
    pub message: String,
    /// Search profile to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    /// Existing session to continue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Where the user currently is, for nearby results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
}

impl DiscoverRequest {
    /// Create a new request with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the profile ID.
    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// Set the session ID.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the user's location.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.user_location = Some(UserLocation {
            user_lat: latitude,
            user_lon: longitude,
        });
        self
    }
}

/// A user's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub user_lat: f64,
    pub user_lon: f64,
}
