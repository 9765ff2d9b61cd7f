use keyhole_secrets::SourceKind;

/// Path prefix shared by all secret endpoints
pub const SECRETS_PREFIX: &str = "/api/secrets";

/// Endpoint segment -> source kind
const ROUTES: [(&str, SourceKind); 4] = [
    ("local", SourceKind::LocalEnv),
    ("azureAppConfiguration", SourceKind::RemoteEnv),
    ("azureSqlConnection", SourceKind::ConnectionString),
    ("appSettings", SourceKind::AppSetting),
];

/// Result of matching a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Secret(SourceKind),
    Unknown,
}

/// Match a request path against the secret endpoints
///
/// Matching ignores ASCII case and tolerates one trailing slash.
pub fn route(path: &str) -> RouteMatch {
    let path = path.strip_suffix('/').unwrap_or(path);

    let segment = match strip_prefix_ignore_case(path, SECRETS_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(segment) => segment,
        None => return RouteMatch::Unknown,
    };

    ROUTES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(segment))
        .map(|(_, kind)| RouteMatch::Secret(*kind))
        .unwrap_or(RouteMatch::Unknown)
}

/// Canonical path of the endpoint serving a source kind
pub fn path_for(kind: SourceKind) -> String {
    let segment = ROUTES
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(name, _)| *name)
        .unwrap_or_default();
    format!("{}/{}", SECRETS_PREFIX, segment)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_paths() {
        assert_eq!(
            route("/api/secrets/local"),
            RouteMatch::Secret(SourceKind::LocalEnv)
        );
        assert_eq!(
            route("/api/secrets/azureAppConfiguration"),
            RouteMatch::Secret(SourceKind::RemoteEnv)
        );
        assert_eq!(
            route("/api/secrets/azureSqlConnection"),
            RouteMatch::Secret(SourceKind::ConnectionString)
        );
        assert_eq!(
            route("/api/secrets/appSettings"),
            RouteMatch::Secret(SourceKind::AppSetting)
        );
    }

    #[test]
    fn test_case_and_trailing_slash() {
        assert_eq!(
            route("/API/Secrets/AppSettings/"),
            RouteMatch::Secret(SourceKind::AppSetting)
        );
        assert_eq!(
            route("/api/secrets/azuresqlconnection"),
            RouteMatch::Secret(SourceKind::ConnectionString)
        );
    }

    #[test]
    fn test_unknown_paths() {
        for path in [
            "/",
            "/api/secrets",
            "/api/secrets/",
            "/api/secrets/other",
            "/api/secrets/local/extra",
            "/api/secretslocal",
            "/api/secrets//local",
        ] {
            assert_eq!(route(path), RouteMatch::Unknown, "{}", path);
        }
    }

    #[test]
    fn test_path_for_round_trips() {
        for kind in SourceKind::ALL {
            assert_eq!(route(&path_for(kind)), RouteMatch::Secret(kind));
        }
    }
}
