use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Supervisor,
    Manager,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Supervisor, Role::Manager, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supervisor => "supervisor",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Bus,
    Bike,
    Pedestrian,
}

impl TransportMode {
    pub const ALL: [TransportMode; 3] =
        [TransportMode::Bus, TransportMode::Bike, TransportMode::Pedestrian];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Bike => "bike",
            TransportMode::Pedestrian => "pedestrian",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub mode: Option<TransportMode>,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub supervisor_name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub mode: TransportMode,
    pub security_question: String,
    pub security_answer: String,
}

impl Registration {
    /// First missing field, by its form label.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("Supervisor name", &self.supervisor_name),
            ("Username", &self.username),
            ("Password", &self.password),
            ("Security question", &self.security_question),
            ("Security answer", &self.security_answer),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Supervisor).unwrap(), "\"supervisor\"");
        let mode: TransportMode = serde_json::from_str("\"bike\"").unwrap();
        assert_eq!(mode, TransportMode::Bike);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::parse(" Manager "), Some(Role::Manager));
        assert_eq!(TransportMode::parse("BUS"), Some(TransportMode::Bus));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_login_response_optional_fields() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"message": "Login successful", "token": "abc"}"#).unwrap();
        assert_eq!(resp.token.as_deref(), Some("abc"));
        assert!(resp.role.is_none());
        assert_eq!(resp.role.unwrap_or_default(), Role::User);
    }

    #[test]
    fn test_registration_missing_field() {
        let mut reg = Registration {
            supervisor_name: "Aoife".to_string(),
            username: "cian".to_string(),
            password: "secret".to_string(),
            role: Role::Manager,
            mode: TransportMode::Bus,
            security_question: "First pet?".to_string(),
            security_answer: String::new(),
        };
        assert_eq!(reg.missing_field(), Some("Security answer"));
        reg.security_answer = "Rex".to_string();
        assert_eq!(reg.missing_field(), None);
    }
}
