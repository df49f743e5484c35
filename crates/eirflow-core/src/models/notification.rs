use serde::{Deserialize, Deserializer, Serialize};

use super::de;
use super::{Role, TransportMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Approved => "approved",
            NotificationStatus::Rejected => "rejected",
        }
    }

    /// Only pending requests can be decided, and only once.
    pub fn can_transition_to(&self, next: NotificationStatus) -> bool {
        matches!(
            (self, next),
            (NotificationStatus::Pending, NotificationStatus::Approved)
                | (NotificationStatus::Pending, NotificationStatus::Rejected)
        )
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reroute request as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub mode_of_transport: TransportMode,
    pub status: NotificationStatus,
    pub manager_name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// `GET /api/notifications` answers with either a bare array or a wrapper.
/// Entries that do not decode, such as an unknown status or mode, are
/// skipped instead of failing the whole list.
#[derive(Debug, Clone, Default)]
pub struct NotificationsResponse(Vec<Notification>);

impl<'de> Deserialize<'de> for NotificationsResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            List(Vec<serde_json::Value>),
            Wrapped { notifications: Vec<serde_json::Value> },
        }

        let items = match Shape::deserialize(deserializer)? {
            Shape::List(items) => items,
            Shape::Wrapped { notifications } => notifications,
        };
        Ok(Self(de::decode_items(items, "notifications")))
    }
}

impl NotificationsResponse {
    pub fn into_vec(self) -> Vec<Notification> {
        self.0
    }
}

/// Identity the notification list is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub role: Role,
    pub mode: Option<TransportMode>,
    pub username: String,
}

impl NotificationQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("role", self.role.as_str().to_string()),
            ("username", self.username.clone()),
        ];
        if let Some(mode) = self.mode {
            params.push(("mode", mode.as_str().to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RerouteRequest {
    pub mode_of_transport: TransportMode,
    pub manager_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: NotificationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use NotificationStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_response_shapes() {
        let body = r#"{"id": 7, "mode_of_transport": "bus", "status": "pending", "manager_name": "cian"}"#;
        let list: NotificationsResponse = serde_json::from_str(&format!("[{}]", body)).unwrap();
        assert_eq!(list.into_vec()[0].id, "7");

        let wrapped: NotificationsResponse =
            serde_json::from_str(&format!(r#"{{"notifications": [{}]}}"#, body)).unwrap();
        let items = wrapped.into_vec();
        assert_eq!(items[0].mode_of_transport, TransportMode::Bus);
        assert_eq!(items[0].status, NotificationStatus::Pending);
    }

    #[test]
    fn test_unknown_entries_are_skipped() {
        let body = r#"[
            {"id": 1, "mode_of_transport": "bus", "status": "pending", "manager_name": "cian"},
            {"id": 2, "mode_of_transport": "bus", "status": "escalated", "manager_name": "cian"},
            {"id": 3, "mode_of_transport": "tram", "status": "pending", "manager_name": "cian"},
            {"id": 4, "mode_of_transport": "bike", "status": "approved", "manager_name": "cian"}
        ]"#;
        let items = serde_json::from_str::<NotificationsResponse>(body)
            .unwrap()
            .into_vec();
        let ids: Vec<&str> = items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        let wrapped = format!(r#"{{"notifications": {}}}"#, body);
        let items = serde_json::from_str::<NotificationsResponse>(&wrapped)
            .unwrap()
            .into_vec();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_reroute_request_omits_empty_location() {
        let req = RerouteRequest {
            mode_of_transport: TransportMode::Bike,
            manager_name: "cian".to_string(),
            message: "Station closed".to_string(),
            location: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("location").is_none());
        assert_eq!(json["mode_of_transport"], "bike");
    }

    #[test]
    fn test_query_params() {
        let q = NotificationQuery {
            role: Role::Supervisor,
            mode: Some(TransportMode::Pedestrian),
            username: "aoife".to_string(),
        };
        let params = q.to_params();
        assert!(params.contains(&("mode", "pedestrian".to_string())));
        assert!(params.contains(&("role", "supervisor".to_string())));
    }
}
