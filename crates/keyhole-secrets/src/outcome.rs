/// Result of a resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretOutcome {
    /// The store holds a non-empty value for the key
    Found(String),
    /// The key is absent, or its value is empty
    NotFound,
    /// The source cannot be queried on this host
    Unsupported(String),
}

impl SecretOutcome {
    /// Map a raw store lookup. Empty values collapse into `NotFound`.
    pub fn from_lookup(value: Option<String>) -> Self {
        match value {
            Some(value) if !value.is_empty() => SecretOutcome::Found(value),
            _ => SecretOutcome::NotFound,
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        SecretOutcome::Unsupported(reason.into())
    }

    /// Get the outcome name for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            SecretOutcome::Found(_) => "found",
            SecretOutcome::NotFound => "not-found",
            SecretOutcome::Unsupported(_) => "unsupported",
        }
    }
}
