//! Secret resolution dispatcher

use std::fmt;
use std::sync::Arc;

use crate::configuration::ConfigurationProvider;
use crate::environment::EnvironmentAccessor;
use crate::outcome::SecretOutcome;
use crate::request::{SecretRequest, SourceKind};

/// Reason reported when a Windows-only source is queried elsewhere
pub const WINDOWS_ONLY_MESSAGE: &str = "This endpoint is for Windows Platform Only";

/// Which collaborator call serves a source
#[derive(Debug, Clone, Copy)]
enum Lookup {
    EnvironmentVariable,
    ConnectionString,
    ConfigurationValue,
}

#[derive(Debug, Clone, Copy)]
struct Dispatch {
    windows_only: bool,
    lookup: Lookup,
}

fn dispatch(source: SourceKind) -> Dispatch {
    match source {
        SourceKind::LocalEnv => Dispatch {
            windows_only: true,
            lookup: Lookup::EnvironmentVariable,
        },
        SourceKind::RemoteEnv => Dispatch {
            windows_only: false,
            lookup: Lookup::EnvironmentVariable,
        },
        SourceKind::ConnectionString => Dispatch {
            windows_only: false,
            lookup: Lookup::ConnectionString,
        },
        SourceKind::AppSetting => Dispatch {
            windows_only: false,
            lookup: Lookup::ConfigurationValue,
        },
    }
}

/// Resolves secrets from the environment or configuration based on source kind
///
/// Cheap to clone; both collaborators are shared and only ever read.
#[derive(Clone)]
pub struct SecretResolver {
    environment: Arc<dyn EnvironmentAccessor>,
    configuration: Arc<dyn ConfigurationProvider>,
}

impl SecretResolver {
    pub fn new(
        environment: Arc<dyn EnvironmentAccessor>,
        configuration: Arc<dyn ConfigurationProvider>,
    ) -> Self {
        Self {
            environment,
            configuration,
        }
    }

    /// Resolve a request to an outcome. Never fails; absence is `NotFound`.
    pub fn resolve(&self, request: &SecretRequest) -> SecretOutcome {
        let source = request.source();
        let key = request.key();
        let Dispatch {
            windows_only,
            lookup,
        } = dispatch(source);

        tracing::debug!(source = source.name(), key, "Resolving secret");

        if windows_only {
            let platform = self.environment.platform();
            if !platform.is_windows() {
                tracing::debug!(source = source.name(), %platform, "Source unavailable on this platform");
                return SecretOutcome::unsupported(WINDOWS_ONLY_MESSAGE);
            }
        }

        let value = match lookup {
            Lookup::EnvironmentVariable => self.environment.var(key),
            Lookup::ConnectionString => self.configuration.connection_string(key),
            Lookup::ConfigurationValue => self.configuration.value(key),
        };

        SecretOutcome::from_lookup(value)
    }
}

impl fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretResolver")
            .field("platform", &self.environment.platform())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{ConfigurationBuilder, LayeredConfiguration};
    use crate::environment::StaticEnvironment;
    use crate::platform::PlatformFamily;
    use parking_lot::Mutex;

    /// Records every variable name it is asked for
    struct RecordingEnvironment {
        inner: StaticEnvironment,
        queried: Mutex<Vec<String>>,
    }

    impl EnvironmentAccessor for RecordingEnvironment {
        fn var(&self, name: &str) -> Option<String> {
            self.queried.lock().push(name.to_string());
            self.inner.var(name)
        }

        fn platform(&self) -> PlatformFamily {
            self.inner.platform()
        }
    }

    fn configuration(pairs: &[(&str, &str)]) -> Arc<LayeredConfiguration> {
        Arc::new(
            ConfigurationBuilder::new()
                .add_in_memory(pairs.iter().copied())
                .build()
                .unwrap(),
        )
    }

    fn resolver(env: StaticEnvironment, pairs: &[(&str, &str)]) -> SecretResolver {
        SecretResolver::new(Arc::new(env), configuration(pairs))
    }

    fn found(value: &str) -> SecretOutcome {
        SecretOutcome::Found(value.to_string())
    }

    #[test]
    fn test_local_env_on_windows() {
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Windows).with_var("LOCAL_SECRET_VARIABLE", "foo"),
            &[],
        );
        let outcome = resolver.resolve(&SecretRequest::with_default_key(SourceKind::LocalEnv));
        assert_eq!(outcome, found("foo"));
    }

    #[test]
    fn test_local_env_unsupported_without_querying() {
        for platform in [PlatformFamily::Unix, PlatformFamily::Other] {
            let env = Arc::new(RecordingEnvironment {
                inner: StaticEnvironment::new(platform).with_var("LOCAL_SECRET_VARIABLE", "foo"),
                queried: Mutex::new(Vec::new()),
            });
            let resolver = SecretResolver::new(env.clone(), configuration(&[]));

            let outcome = resolver.resolve(&SecretRequest::with_default_key(SourceKind::LocalEnv));
            assert_eq!(
                outcome,
                SecretOutcome::Unsupported(WINDOWS_ONLY_MESSAGE.to_string())
            );

            let outcome =
                resolver.resolve(&SecretRequest::with_key(SourceKind::LocalEnv, "MISSING"));
            assert!(matches!(outcome, SecretOutcome::Unsupported(_)));

            assert!(env.queried.lock().is_empty());
        }
    }

    #[test]
    fn test_remote_env_ignores_platform() {
        for platform in [
            PlatformFamily::Windows,
            PlatformFamily::Unix,
            PlatformFamily::Other,
        ] {
            let resolver = resolver(
                StaticEnvironment::new(platform).with_var("AZURE_SECRET_VARIABLE", "remote"),
                &[],
            );
            assert_eq!(
                resolver.resolve(&SecretRequest::with_default_key(SourceKind::RemoteEnv)),
                found("remote")
            );
            assert_eq!(
                resolver.resolve(&SecretRequest::with_key(SourceKind::RemoteEnv, "NOPE")),
                SecretOutcome::NotFound
            );
        }
    }

    #[test]
    fn test_connection_string() {
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Unix),
            &[("ConnectionStrings:DefaultConnection", "Server=db;User Id=sa")],
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_default_key(SourceKind::ConnectionString)),
            found("Server=db;User Id=sa")
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_key(SourceKind::ConnectionString, "Other")),
            SecretOutcome::NotFound
        );
    }

    #[test]
    fn test_connection_string_missing_default() {
        let resolver = resolver(StaticEnvironment::new(PlatformFamily::Windows), &[]);
        assert_eq!(
            resolver.resolve(&SecretRequest::with_default_key(SourceKind::ConnectionString)),
            SecretOutcome::NotFound
        );
    }

    #[test]
    fn test_app_setting_nested_key() {
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Unix),
            &[
                ("AppConfiguration:SecretValue", "app-secret"),
                ("Section:SubKey", "nested"),
            ],
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_default_key(SourceKind::AppSetting)),
            found("app-secret")
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_key(SourceKind::AppSetting, "Section:SubKey")),
            found("nested")
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_key(SourceKind::AppSetting, "Section")),
            SecretOutcome::NotFound
        );
    }

    #[test]
    fn test_app_setting_json_scalars_as_written() {
        let configuration = ConfigurationBuilder::new()
            .add_json_str(
                "appsettings.json",
                r#"{"App": {"Version": 1.10, "Big": 12345678901234567890123, "Exp": 1E3, "On": true}}"#,
            )
            .build()
            .unwrap();
        let resolver = SecretResolver::new(
            Arc::new(StaticEnvironment::new(PlatformFamily::Unix)),
            Arc::new(configuration),
        );

        for (key, expected) in [
            ("App:Version", "1.10"),
            ("App:Big", "12345678901234567890123"),
            ("App:Exp", "1E3"),
            ("App:On", "True"),
        ] {
            assert_eq!(
                resolver.resolve(&SecretRequest::with_key(SourceKind::AppSetting, key)),
                found(expected),
                "{}",
                key
            );
        }
    }

    #[test]
    fn test_empty_values_are_not_found() {
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Windows)
                .with_var("LOCAL_SECRET_VARIABLE", "")
                .with_var("AZURE_SECRET_VARIABLE", ""),
            &[
                ("ConnectionStrings:DefaultConnection", ""),
                ("AppConfiguration:SecretValue", ""),
            ],
        );
        for kind in SourceKind::ALL {
            assert_eq!(
                resolver.resolve(&SecretRequest::with_default_key(kind)),
                SecretOutcome::NotFound,
                "{} should collapse empty to NotFound",
                kind.name()
            );
        }
    }

    #[test]
    fn test_values_round_trip_unmodified() {
        let value = "  Pa$$w0rd=;%20é\n";
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Windows)
                .with_var("LOCAL_SECRET_VARIABLE", value)
                .with_var("AZURE_SECRET_VARIABLE", value),
            &[
                ("ConnectionStrings:DefaultConnection", value),
                ("AppConfiguration:SecretValue", value),
            ],
        );
        for kind in SourceKind::ALL {
            assert_eq!(
                resolver.resolve(&SecretRequest::with_default_key(kind)),
                found(value)
            );
        }
    }

    #[test]
    fn test_environment_keys_are_case_sensitive() {
        let resolver = resolver(
            StaticEnvironment::new(PlatformFamily::Unix).with_var("Mixed_Case", "v"),
            &[],
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_key(SourceKind::RemoteEnv, "Mixed_Case")),
            found("v")
        );
        assert_eq!(
            resolver.resolve(&SecretRequest::with_key(SourceKind::RemoteEnv, "MIXED_CASE")),
            SecretOutcome::NotFound
        );
    }
}
