use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const ACCOUNT_MARKER: &str = "Account=";
const PASSWORD_MARKER: &str = "Password=";

static CREDENTIALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Account=(?P<username>.*?)Password=(?P<password>.*)")
        .expect("credentials pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("missing '{0}' marker in credentials content")]
    MissingMarker(&'static str),
    #[error("empty {0} in credentials content")]
    Empty(&'static str),
}

/// Login credentials, serialized as `{"username": ..., "password": ...}`.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parses `Account=<username>Password=<password>` content. Both values are trimmed and the
    /// password runs to the end of the content.
    pub fn parse(content: &str) -> Result<Self, CredentialsError> {
        let captures = CREDENTIALS_RE.captures(content).ok_or_else(|| {
            if content.contains(ACCOUNT_MARKER) {
                CredentialsError::MissingMarker(PASSWORD_MARKER)
            } else {
                CredentialsError::MissingMarker(ACCOUNT_MARKER)
            }
        })?;

        let username = captures["username"].trim();
        if username.is_empty() {
            return Err(CredentialsError::Empty("username"));
        }

        let password = captures["password"].trim();

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_parse_concatenated() -> Result<()> {
        assert_eq!(
            credentials("user1", "pass1"),
            Credentials::parse("Account=user1Password=pass1")?
        );

        Ok(())
    }

    #[test]
    fn test_parse_trims_whitespace() -> Result<()> {
        assert_eq!(
            credentials("bob", "secret"),
            Credentials::parse("Account=  bob  Password= secret  ")?
        );

        Ok(())
    }

    #[test]
    fn test_parse_multiline() -> Result<()> {
        assert_eq!(
            credentials("alice", "hunter2"),
            Credentials::parse("Account=alice\nPassword=hunter2\n")?
        );

        Ok(())
    }

    #[test]
    fn test_parse_uses_first_password_marker() -> Result<()> {
        assert_eq!(
            credentials("carol", "a Password=b"),
            Credentials::parse("Account=carolPassword=a Password=b")?
        );

        Ok(())
    }

    #[test]
    fn test_parse_ignores_leading_text() -> Result<()> {
        assert_eq!(
            credentials("dave", "pw"),
            Credentials::parse("# login\nAccount=dave Password=pw")?
        );

        Ok(())
    }

    #[test]
    fn test_parse_missing_password_marker() {
        assert_eq!(
            Err(CredentialsError::MissingMarker("Password=")),
            Credentials::parse("Account=user1pass1")
        );
    }

    #[test]
    fn test_parse_missing_account_marker() {
        assert_eq!(
            Err(CredentialsError::MissingMarker("Account=")),
            Credentials::parse("user1Password=pass1")
        );
        assert_eq!(
            Err(CredentialsError::MissingMarker("Account=")),
            Credentials::parse("")
        );
    }

    #[test]
    fn test_parse_markers_out_of_order() {
        assert_eq!(
            Err(CredentialsError::MissingMarker("Password=")),
            Credentials::parse("Password=pass1Account=user1")
        );
    }

    #[test]
    fn test_parse_empty_username() {
        assert_eq!(
            Err(CredentialsError::Empty("username")),
            Credentials::parse("Account=   Password=pass1")
        );
    }

    #[test]
    fn test_to_json() -> Result<()> {
        assert_eq!(
            r#"{"username":"user1","password":"pa\"ss"}"#,
            credentials("user1", "pa\"ss").to_json()?
        );

        Ok(())
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", credentials("user1", "pass1"));

        assert!(debug.contains("user1"));
        assert!(!debug.contains("pass1"));
    }
}
