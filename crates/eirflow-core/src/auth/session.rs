use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LoginResponse, NotificationQuery, Role, TransportMode};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub mode: Option<TransportMode>,
    #[serde(default)]
    pub token: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

impl SessionData {
    /// Build a session from a login answer. The backend may omit the
    /// identity fields, in which case the typed username and the `user` role
    /// are used.
    pub fn from_login(username: &str, response: LoginResponse) -> Self {
        Self {
            username: response
                .username
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| username.to_string()),
            role: response.role.unwrap_or_default(),
            mode: response.mode,
            token: response.token,
            logged_in_at: Utc::now(),
        }
    }

    /// Supervisors decide requests for their own mode.
    pub fn can_review(&self, mode: TransportMode) -> bool {
        self.role == Role::Supervisor && self.mode == Some(mode)
    }

    /// Managers with a mode may ask for reroutes.
    pub fn can_request_reroute(&self) -> bool {
        self.role == Role::Manager && self.mode.is_some()
    }

    pub fn sees_notifications(&self) -> bool {
        matches!(self.role, Role::Supervisor | Role::Manager)
    }

    pub fn notification_query(&self) -> Option<NotificationQuery> {
        self.sees_notifications().then(|| NotificationQuery {
            role: self.role,
            mode: self.mode,
            username: self.username.clone(),
        })
    }

    /// "aoife (supervisor, bus)"
    pub fn display(&self) -> String {
        match self.mode {
            Some(mode) => format!("{} ({}, {})", self.username, self.role, mode),
            None => format!("{} ({})", self.username, self.role),
        }
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.token.as_deref())
    }

    pub fn user(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(role: Role, mode: Option<TransportMode>) -> SessionData {
        SessionData {
            username: "aoife".to_string(),
            role,
            mode,
            token: Some("tok".to_string()),
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_login_defaults() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"message": "ok", "token": "abc"}"#).unwrap();
        let data = SessionData::from_login("cian", resp);
        assert_eq!(data.username, "cian");
        assert_eq!(data.role, Role::User);
        assert_eq!(data.mode, None);
        assert_eq!(data.token.as_deref(), Some("abc"));

        let resp: LoginResponse = serde_json::from_str(
            r#"{"token": "abc", "username": "Cian", "role": "manager", "mode": "bike"}"#,
        )
        .unwrap();
        let data = SessionData::from_login("cian", resp);
        assert_eq!(data.username, "Cian");
        assert_eq!(data.role, Role::Manager);
        assert_eq!(data.mode, Some(TransportMode::Bike));
    }

    #[test]
    fn test_role_gating() {
        let supervisor = session_for(Role::Supervisor, Some(TransportMode::Bus));
        assert!(supervisor.can_review(TransportMode::Bus));
        assert!(!supervisor.can_review(TransportMode::Bike));
        assert!(!supervisor.can_request_reroute());
        assert!(supervisor.sees_notifications());

        let manager = session_for(Role::Manager, Some(TransportMode::Bike));
        assert!(!manager.can_review(TransportMode::Bike));
        assert!(manager.can_request_reroute());

        let user = session_for(Role::User, None);
        assert!(!user.sees_notifications());
        assert!(user.notification_query().is_none());
    }

    #[test]
    fn test_session_persistence() {
        let dir = std::env::temp_dir().join(format!("eirflow-session-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut session = Session::new(dir.clone());
        assert!(!session.load().unwrap());

        let data = session_for(Role::Manager, Some(TransportMode::Pedestrian));
        session.update(data.clone());
        session.save().unwrap();

        let mut reloaded = Session::new(dir.clone());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.user(), Some(&data));
        assert_eq!(reloaded.token(), Some("tok"));

        reloaded.clear().unwrap();
        assert!(!reloaded.is_logged_in());
        assert!(!Session::new(dir.clone()).load().unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
