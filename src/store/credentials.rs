//! AWS credentials from the ambient environment

use std::env;
use std::fmt;

use crate::error::ExportError;

pub const AWS_DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct AwsCredentials {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token,
        }
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`
    pub fn from_env() -> Result<Self, ExportError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key = lookup("AWS_ACCESS_KEY_ID").filter(|v| !v.is_empty()).ok_or_else(|| {
            ExportError::Credentials("AWS_ACCESS_KEY_ID not found in the environment".to_string())
        })?;
        let secret_key = lookup("AWS_SECRET_ACCESS_KEY").filter(|v| !v.is_empty()).ok_or_else(|| {
            ExportError::Credentials(
                "AWS_SECRET_ACCESS_KEY not found in the environment".to_string(),
            )
        })?;
        let session_token = lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());

        Ok(Self {
            access_key,
            secret_key,
            session_token,
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

// Keep secrets out of logs and panics
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Region from `AWS_REGION`, then `AWS_DEFAULT_REGION`, then `us-east-1`
pub fn region_from_env() -> String {
    env::var("AWS_REGION")
        .or_else(|_| env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| AWS_DEFAULT_REGION.to_owned())
}
