//! Environment variables as a configuration layer
//!
//! `__` in a variable name stands for the `:` path separator, so
//! `AppConfiguration__SecretValue` sets `AppConfiguration:SecretValue`.
//! Variables carrying an App Service connection-string prefix
//! (`SQLAZURECONNSTR_Name`, ...) land under `ConnectionStrings:Name`, with a
//! `ConnectionStrings:Name_ProviderName` sibling when the prefix names one.

use super::{CONNECTION_STRINGS_SECTION, KEY_DELIMITER};

/// App Service connection-string prefixes and the provider name each implies
const CONNECTION_STRING_PREFIXES: [(&str, Option<&str>); 5] = [
    ("CUSTOMCONNSTR_", None),
    ("MYSQLCONNSTR_", Some("MySql.Data.MySqlClient")),
    ("POSTGRESQLCONNSTR_", None),
    ("SQLAZURECONNSTR_", Some("System.Data.SqlClient")),
    ("SQLCONNSTR_", Some("System.Data.SqlClient")),
];

const PROVIDER_NAME_SUFFIX: &str = "_ProviderName";

/// Snapshot of the process environment, skipping non-UTF-8 entries
pub(crate) fn process_variables() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Map variables to configuration entries
///
/// Names are mapped to configuration keys first. With a prefix, only keys
/// starting with the normalized prefix (ASCII case-insensitive) are kept, and
/// the prefix is stripped. A connection-string variable therefore has to pass
/// the filter as `ConnectionStrings:<name>`.
pub(crate) fn map_variables<I>(prefix: Option<&str>, vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = prefix.map(normalize).unwrap_or_default();
    let mut entries = Vec::new();

    for (name, value) in vars {
        for (key, value) in config_entries(&name, value) {
            if let Some(key) = strip_prefix_ignore_case(&key, &prefix) {
                if !key.is_empty() {
                    entries.push((key.to_string(), value));
                }
            }
        }
    }

    entries
}

fn config_entries(name: &str, value: String) -> Vec<(String, String)> {
    for (prefix, provider) in CONNECTION_STRING_PREFIXES {
        let Some(conn_name) = strip_prefix_ignore_case(name, prefix) else {
            continue;
        };
        if conn_name.is_empty() {
            return Vec::new();
        }

        let key = format!(
            "{}{}{}",
            CONNECTION_STRINGS_SECTION,
            KEY_DELIMITER,
            normalize(conn_name)
        );
        let provider_entry =
            provider.map(|provider| (format!("{}{}", key, PROVIDER_NAME_SUFFIX), provider.to_string()));
        return std::iter::once((key, value)).chain(provider_entry).collect();
    }

    vec![(normalize(name), value)]
}

fn normalize(name: &str) -> String {
    name.replace("__", &KEY_DELIMITER.to_string())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
