//! Configuration handling for redis2csv

/// Output format for the run report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

/// Shape of the CSV table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One column per key, one row per key, a single populated cell per row
    #[default]
    Sparse,
    /// Two columns: `key` and `value`
    KeyValue,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Sparse => write!(f, "sparse"),
            Layout::KeyValue => write!(f, "key-value"),
        }
    }
}

/// Order in which enumerated keys are fetched and written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// Bytewise sort, stable across runs
    #[default]
    Sorted,
    /// Whatever order the store returned
    Enumeration,
}

/// What to do when a key vanishes between enumeration and fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingValuePolicy {
    /// Keep the row, leave its cell empty
    #[default]
    EmptyCell,
    /// Abort the whole run
    Abort,
}

/// Redis connection settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            username: None,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Host as it appears in a URL authority, IPv6 literals bracketed
    fn url_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// `host:port`, used in log lines and error messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.url_host(), self.port)
    }

    /// Build a `redis://` URL carrying credentials and database index
    pub fn url(&self) -> Result<url::Url, url::ParseError> {
        let mut url = url::Url::parse(&format!("redis://{}/{}", self.address(), self.db))?;
        if let Some(ref username) = self.username {
            let _ = url.set_username(username);
        }
        if let Some(ref password) = self.password {
            let _ = url.set_password(Some(password));
        }
        Ok(url)
    }
}

/// Configuration for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Redis connection settings
    pub redis: RedisConfig,
    /// Pattern passed to `KEYS`
    pub key_pattern: String,
    /// Destination bucket
    pub bucket: String,
    /// Destination object key
    pub object_key: String,
    /// Content type attached to the uploaded object
    pub content_type: String,
    /// Table shape
    pub layout: Layout,
    /// Key ordering in the document
    pub key_order: KeyOrder,
    /// Handling of keys that vanish before their GET
    pub missing_values: MissingValuePolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            key_pattern: "*".to_string(),
            bucket: String::new(),
            object_key: "redis_data".to_string(),
            content_type: "text/csv".to_string(),
            layout: Layout::default(),
            key_order: KeyOrder::default(),
            missing_values: MissingValuePolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Create a new config targeting a bucket
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Set Redis connection settings
    pub fn with_redis(mut self, redis: RedisConfig) -> Self {
        self.redis = redis;
        self
    }

    /// Set the key pattern
    pub fn with_key_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.key_pattern = pattern.into();
        self
    }

    /// Set the destination object key
    pub fn with_object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = key.into();
        self
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the table layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Set key ordering
    pub fn with_key_order(mut self, order: KeyOrder) -> Self {
        self.key_order = order;
        self
    }

    /// Set the missing value policy
    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }

    /// Check the settings that cannot be defaulted
    pub fn validate(&self) -> Result<(), crate::ExportError> {
        if self.bucket.is_empty() {
            return Err(crate::ExportError::Config("bucket must not be empty".to_string()));
        }
        if self.object_key.is_empty() {
            return Err(crate::ExportError::Config("object key must not be empty".to_string()));
        }
        if self.key_pattern.is_empty() {
            return Err(crate::ExportError::Config("key pattern must not be empty".to_string()));
        }
        Ok(())
    }
}
