pub mod compare;
pub mod domain;
pub mod engine;
pub mod evaluator;
pub mod format;
pub mod portfolio;
pub mod storage;
pub mod templates;
pub mod whatif;

pub use domain::input::{Frequency, RoiInput};
pub use domain::output::{Priority, RoiOutput};
pub use engine::evaluate;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub remote_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                remote_url: non_empty_var("ROI_REMOTE_URL"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_remote_url(&self) -> anyhow::Result<&str> {
            self.remote_url
                .as_deref()
                .context("ROI_REMOTE_URL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
