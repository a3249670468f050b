pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod publish;
pub mod scrape;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub wp_api_url: Option<String>,
        pub wp_user: Option<String>,
        pub wp_pass: Option<String>,
        pub groq_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                wp_api_url: std::env::var("WP_API_URL").ok(),
                wp_user: std::env::var("WP_USER").ok(),
                wp_pass: std::env::var("WP_PASS").ok(),
                groq_api_key: std::env::var("GROQ_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_wp_api_url(&self) -> anyhow::Result<&str> {
            self.wp_api_url.as_deref().context("WP_API_URL is required")
        }

        pub fn require_wp_user(&self) -> anyhow::Result<&str> {
            self.wp_user.as_deref().context("WP_USER is required")
        }

        pub fn require_wp_pass(&self) -> anyhow::Result<&str> {
            self.wp_pass.as_deref().context("WP_PASS is required")
        }

        pub fn require_groq_api_key(&self) -> anyhow::Result<&str> {
            self.groq_api_key
                .as_deref()
                .context("GROQ_API_KEY is required")
        }
    }
}
