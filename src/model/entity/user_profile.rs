use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile document of a user, created at sign-up and edited on the profile
/// screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Base64 image data, without the `data:` prefix.
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

/// Fields to overwrite in a profile. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    display_name: Option<String>,
    email: Option<String>,
    photo_url: Option<String>,
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    pub fn new_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn new_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn new_photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }
}

impl UserProfile {
    /// Profile of a user who has no stored document yet.
    pub fn empty(uid: impl Into<String>) -> Self {
        Self::new(uid, None, None, None)
    }

    pub fn new(
        uid: impl Into<String>,
        display_name: Option<String>,
        email: Option<String>,
        photo_url: Option<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            display_name,
            email,
            photo_url,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Name for greetings, `fallback` when none is set.
    pub fn greeting_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name().filter(|n| !n.is_empty()).unwrap_or(fallback)
    }

    /// Merges `patch` into the profile. Returns `true` if anything changed.
    pub fn apply(&mut self, patch: ProfilePatch) -> bool {
        fn merge(field: &mut Option<String>, value: Option<String>) -> bool {
            match value {
                Some(value) if field.as_deref() != Some(value.as_str()) => {
                    *field = Some(value);
                    true
                }
                _ => false,
            }
        }

        let name = merge(&mut self.display_name, patch.display_name);
        let email = merge(&mut self.email, patch.email);
        let photo = merge(&mut self.photo_url, patch.photo_url);
        name || email || photo
    }
}
