/// Which backing store a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Process environment, only available on Windows hosts
    LocalEnv,
    /// Process environment, available everywhere
    RemoteEnv,
    /// Named entry under the `ConnectionStrings` configuration section
    ConnectionString,
    /// Hierarchical configuration key such as `Section:SubKey`
    AppSetting,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::LocalEnv,
        SourceKind::RemoteEnv,
        SourceKind::ConnectionString,
        SourceKind::AppSetting,
    ];

    /// Key used when the caller does not name one
    pub fn default_key(self) -> &'static str {
        match self {
            SourceKind::LocalEnv => "LOCAL_SECRET_VARIABLE",
            SourceKind::RemoteEnv => "AZURE_SECRET_VARIABLE",
            SourceKind::ConnectionString => "DefaultConnection",
            SourceKind::AppSetting => "AppConfiguration:SecretValue",
        }
    }

    /// Get the source name for logging
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::LocalEnv => "local-env",
            SourceKind::RemoteEnv => "remote-env",
            SourceKind::ConnectionString => "connection-string",
            SourceKind::AppSetting => "app-setting",
        }
    }
}

/// A single lookup: which store, and which key in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    source: SourceKind,
    key: String,
}

impl SecretRequest {
    /// Build a request, falling back to the source's default key when `key`
    /// is `None` or empty.
    pub fn new(source: SourceKind, key: Option<String>) -> Self {
        let key = key
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| source.default_key().to_string());
        Self { source, key }
    }

    pub fn with_default_key(source: SourceKind) -> Self {
        Self::new(source, None)
    }

    pub fn with_key(source: SourceKind, key: impl Into<String>) -> Self {
        Self::new(source, Some(key.into()))
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
