use crate::credentials::CredentialStore;
use anyhow::Result;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    LoggedIn(String),
    Registered(String),
    UsernameTaken,
    InvalidCredentials,
    Usage,
    Quit,
}

impl LoginStep {
    pub fn message(&self) -> String {
        match self {
            LoginStep::LoggedIn(user) => format!("Welcome, {}", user),
            LoginStep::Registered(user) => format!("Registered {}, now log in", user),
            LoginStep::UsernameTaken => "Username already exists".to_string(),
            LoginStep::InvalidCredentials => "Invalid username or password".to_string(),
            LoginStep::Usage => "Commands: register <user> <password> | login <user> <password> | quit".to_string(),
            LoginStep::Quit => "Bye".to_string(),
        }
    }
}

pub fn handle_login_line(store: &CredentialStore, line: &str) -> Result<LoginStep> {
    let mut parts = line.split_whitespace();
    let step = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("quit"), None, None, None) => LoginStep::Quit,
        (Some("register"), Some(user), Some(password), None) => {
            if store.register_user(user, password)? {
                info!("New user registered: {}", user);
                LoginStep::Registered(user.to_string())
            } else {
                LoginStep::UsernameTaken
            }
        }
        (Some("login"), Some(user), Some(password), None) => {
            if store.validate_user(user, password)? {
                info!("User logged in: {}", user);
                LoginStep::LoggedIn(user.to_string())
            } else {
                LoginStep::InvalidCredentials
            }
        }
        _ => LoginStep::Usage,
    };
    Ok(step)
}
