//! Connection password storage in the OS keyring.
//!
//! Passwords are only stored when the user asks for it (`--store-password`)
//! and are looked up on later runs for the same user, host and port.

use crate::config::ConnectionConfig;
use crate::error::{Result, TracerError};
use keyring::Entry;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "sql-tracer";

/// Manages connection passwords in the OS keyring.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    service: String,
}

impl Default for SecretStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStorage {
    /// Creates a storage bound to the application's keyring service.
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Stores a secret in the keyring.
    pub fn store(&self, key: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key)
            .map_err(|e| TracerError::secret(format!("Failed to create keyring entry: {e}")))?;

        entry
            .set_password(secret)
            .map_err(|e| TracerError::secret(format!("Failed to store secret: {e}")))?;

        debug!("Stored secret for {key}");
        Ok(())
    }

    /// Retrieves a secret from the keyring.
    ///
    /// A missing entry or an unavailable keyring yields `None`; the
    /// connection then proceeds without a password.
    pub fn retrieve(&self, key: &str) -> Option<String> {
        let entry = match Entry::new(&self.service, key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to access keyring: {e}");
                return None;
            }
        };

        match entry.get_password() {
            Ok(secret) => Some(secret),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!("Failed to retrieve secret from keyring: {e}");
                None
            }
        }
    }

    /// Generates the keyring key for a connection password.
    pub fn connection_password_key(config: &ConnectionConfig) -> String {
        format!(
            "mysql:{}@{}:{}",
            config.user.as_deref().unwrap_or(""),
            config.host.as_deref().unwrap_or("localhost"),
            config.port
        )
    }
}

/// Fills in `config.password` when it is not already set.
///
/// With `ask` the password is prompted for, and stored in the keyring when
/// `store` is set. Otherwise the keyring is consulted.
pub fn resolve_password(
    config: &mut ConnectionConfig,
    storage: &SecretStorage,
    ask: bool,
    store: bool,
) -> Result<()> {
    if config.password.is_some() && !ask {
        return Ok(());
    }

    let key = SecretStorage::connection_password_key(config);

    if ask {
        let prompt = format!(
            "Password for {}@{}: ",
            config.user.as_deref().unwrap_or(""),
            config.host.as_deref().unwrap_or("localhost")
        );
        let password = rpassword::prompt_password(prompt)
            .map_err(|e| TracerError::secret(format!("Failed to read password: {e}")))?;
        if store {
            storage.store(&key, &password)?;
        }
        config.password = Some(password);
    } else {
        config.password = storage.retrieve(&key);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_password_key() {
        let config = ConnectionConfig {
            host: Some("db.internal".to_string()),
            port: 3307,
            user: Some("reader".to_string()),
            ..Default::default()
        };
        assert_eq!(
            SecretStorage::connection_password_key(&config),
            "mysql:reader@db.internal:3307"
        );
    }

    #[test]
    fn test_connection_password_key_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(
            SecretStorage::connection_password_key(&config),
            "mysql:@localhost:3306"
        );
    }

    #[test]
    fn test_explicit_password_skips_keyring() {
        let mut config = ConnectionConfig {
            password: Some("given".to_string()),
            ..Default::default()
        };
        resolve_password(&mut config, &SecretStorage::new(), false, false).unwrap();
        assert_eq!(config.password, Some("given".to_string()));
    }
}
