//! Session context handed to the application root and threaded to the
//! screens that need it.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AuthError;

/// Decides whether a username/password pair may open a session.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

/// Checks against the administrator account from the configuration.
pub struct ConfiguredCredentials {
    username: String,
    password: String,
}

impl ConfiguredCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.admin_user.clone(), config.admin_password.clone())
    }
}

impl Authenticator for ConfiguredCredentials {
    fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        if username == self.username && password == self.password {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

pub struct Session {
    authenticator: Box<dyn Authenticator>,
    user: Option<String>,
}

impl Session {
    pub fn new(authenticator: Box<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.authenticator.authenticate(username, password) {
            Ok(()) => {
                info!(user = username, "logged in");
                self.user = Some(username.to_string());
                Ok(())
            }
            Err(err) => {
                warn!(user = username, %err, "login refused");
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user = %user, "logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_logout() {
        let mut session = Session::new(Box::new(ConfiguredCredentials::new("admin", "secret1")));
        assert!(!session.is_authenticated());

        assert_eq!(session.login("admin", "wrong!!"), Err(AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());

        session.login("admin", "secret1").unwrap();
        assert_eq!(session.user(), Some("admin"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn missing_account_refuses_everyone() {
        let mut session = Session::new(Box::new(ConfiguredCredentials::new("", "")));
        assert_eq!(session.login("", ""), Err(AuthError::NotConfigured));
    }
}
