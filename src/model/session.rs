use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::config::UserConfig;
use super::task::Area;

/// Display name used when a worker session carries none
pub const DEFAULT_WORKER_NAME: &str = "Trabajador";

/// Who is using the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Worker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }

    pub fn parse_role(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "worker" => Some(Role::Worker),
            _ => None,
        }
    }
}

/// A resolved session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Admin,
    Worker { name: String, area: Area },
}

/// Error type for login
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("wrong password")]
    WrongPassword,
}

impl Session {
    /// Resolve a session from navigation query parameters
    /// (`role`, and for workers `name` and `area`).
    ///
    /// Returns None when no recognised role is present.
    pub fn from_query(query: &str) -> Option<Session> {
        let query = query.trim().trim_start_matches('?');
        let mut role = None;
        let mut name = None;
        let mut area = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "role" => role = Role::parse_role(&value),
                "name" if !value.trim().is_empty() => name = Some(value.into_owned()),
                "area" => area = Area::parse_area(&value),
                _ => {}
            }
        }
        match role? {
            Role::Admin => Some(Session::Admin),
            Role::Worker => Some(Session::Worker {
                name: name.unwrap_or_else(|| DEFAULT_WORKER_NAME.to_string()),
                area: area.unwrap_or(Area::Engineering),
            }),
        }
    }

    /// Encode this session as navigation query parameters
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("role", self.role().as_str());
        if let Session::Worker { name, area } = self {
            serializer.append_pair("name", name);
            serializer.append_pair("area", area.label());
        }
        serializer.finish()
    }

    pub fn role(&self) -> Role {
        match self {
            Session::Admin => Role::Admin,
            Session::Worker { .. } => Role::Worker,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Admin)
    }
}

/// Check credentials against the configured users and return their session.
/// Passwords are per user, so the username is resolved first.
pub fn authenticate(
    users: &[UserConfig],
    username: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let user = users
        .iter()
        .find(|u| u.username == username)
        .ok_or_else(|| LoginError::UserNotFound(username.to_string()))?;
    if user.password != password {
        return Err(LoginError::WrongPassword);
    }
    Ok(match user.role {
        Role::Admin => Session::Admin,
        Role::Worker => Session::Worker {
            name: user
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_WORKER_NAME.to_string()),
            area: user.area.unwrap_or(Area::Engineering),
        },
    })
}
