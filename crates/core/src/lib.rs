pub mod domain;
pub mod market;
pub mod report;
pub mod session;

pub mod config {
    use std::path::PathBuf;

    const DEFAULT_SESSION_FILE: &str = ".savvystock_session.json";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub session_file: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                session_file: std::env::var("SESSION_FILE").ok(),
            })
        }

        pub fn session_file(&self) -> PathBuf {
            self.session_file
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn session_file_defaults_when_unset() {
            let settings = Settings {
                sentry_dsn: None,
                session_file: None,
            };
            assert_eq!(
                settings.session_file(),
                PathBuf::from(".savvystock_session.json")
            );

            let settings = Settings {
                sentry_dsn: None,
                session_file: Some("/tmp/u.json".to_string()),
            };
            assert_eq!(settings.session_file(), PathBuf::from("/tmp/u.json"));
        }
    }
}
