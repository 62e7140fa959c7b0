use serde::{Deserialize, Serialize};

/// The authenticated user's profile as held by the session.
///
/// The `token` field is the bearer credential for API requests. It is
/// deliberately excluded from serialization so the persisted session blob
/// never contains it; rehydration restores it from the OS keychain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub telegram_id: i64,
    pub role: String,
    pub clan: String,
    pub up_coins: i64,
    pub ref_code: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub membership_level: Option<String>,
    #[serde(default, skip_serializing)]
    pub token: String,
}

impl User {
    /// Build a session user from an auth-exchange response and its token.
    pub fn from_exchange(wire: WireUser, token: String) -> Self {
        Self {
            id: wire.id,
            username: wire.username,
            telegram_id: wire.telegram_id,
            role: wire.role,
            clan: wire.clan,
            up_coins: wire.up_coins,
            ref_code: wire.ref_code,
            avatar_url: wire.avatar_url,
            is_verified: wire.is_verified,
            membership_level: None,
            token,
        }
    }
}

/// Partial update applied to the current user with shallow-merge
/// semantics: fields left as `None` are unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub up_coins: Option<i64>,
    pub avatar_url: Option<String>,
    pub membership_level: Option<String>,
    pub is_verified: Option<bool>,
}

impl UserUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(coins) = self.up_coins {
            user.up_coins = coins;
        }
        if let Some(ref avatar) = self.avatar_url {
            user.avatar_url = Some(avatar.clone());
        }
        if let Some(ref level) = self.membership_level {
            user.membership_level = Some(level.clone());
        }
        if let Some(verified) = self.is_verified {
            user.is_verified = verified;
        }
    }
}

/// User record inside the auth-exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub username: String,
    pub telegram_id: i64,
    pub role: String,
    pub clan: String,
    pub up_coins: i64,
    pub ref_code: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// `POST /api/auth/callback` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthExchangeResponse {
    pub user: WireUser,
    pub access_token: String,
}

/// `GET /api/users/me` response body.
///
/// The backend may add fields over time; everything we do not reconcile
/// is ignored. `up_coins` is optional at the wire level so a response
/// missing it can be rejected as malformed instead of defaulting to zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub up_coins: Option<i64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub membership_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u-1".to_string(),
            username: "netrunner".to_string(),
            telegram_id: 4211,
            role: "runner".to_string(),
            clan: "NEON_SYNDICATE".to_string(),
            up_coins: 100,
            ref_code: "UP-AAAAA".to_string(),
            avatar_url: None,
            is_verified: false,
            membership_level: None,
            token: "tok-1".to_string(),
        }
    }

    #[test]
    fn test_update_overwrites_only_present_fields() {
        let mut user = sample_user();
        let update = UserUpdate {
            up_coins: Some(150),
            avatar_url: Some("https://cdn.example/ava.png".to_string()),
            ..Default::default()
        };
        update.apply(&mut user);

        assert_eq!(user.up_coins, 150);
        assert_eq!(user.avatar_url.as_deref(), Some("https://cdn.example/ava.png"));
        // Everything else untouched
        assert_eq!(user.username, "netrunner");
        assert_eq!(user.membership_level, None);
        assert_eq!(user.token, "tok-1");
    }

    #[test]
    fn test_empty_update_is_identity() {
        let mut user = sample_user();
        UserUpdate::default().apply(&mut user);
        assert_eq!(user, sample_user());
    }

    #[test]
    fn test_token_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).expect("serialize user");
        assert!(!json.contains("tok-1"));
        assert!(!json.contains("\"token\""));
    }

    #[test]
    fn test_profile_response_tolerates_extra_fields() {
        let json = r#"{"up_coins": 500, "photo_url": null, "membership_level": "gold",
                       "created_at": "2025-01-01T00:00:00Z", "telegram_id": 4211}"#;
        let profile: ProfileResponse = serde_json::from_str(json).expect("parse profile");
        assert_eq!(profile.up_coins, Some(500));
        assert_eq!(profile.photo_url, None);
        assert_eq!(profile.membership_level.as_deref(), Some("gold"));
    }

    #[test]
    fn test_profile_response_missing_balance_parses_as_none() {
        let profile: ProfileResponse =
            serde_json::from_str(r#"{"photo_url": "x"}"#).expect("parse profile");
        assert_eq!(profile.up_coins, None);
    }
}
