use std::env;

use camino::Utf8PathBuf;

use crate::domain::{OutputFormat, QueryMethod};
use crate::error::Dhis2Error;

pub const USERNAME_VAR: &str = "DHIS2_KENYA_USERNAME";
pub const PASSWORD_VAR: &str = "DHIS2_KENYA_PASSWORD";

pub const DEFAULT_SERVER: &str = "https://hiskenya.org";
pub const DEFAULT_API_VERSION: &str = "25";

/// HTTP Basic credential pair. Built from the environment only; there are
/// deliberately no fallback defaults.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, Dhis2Error> {
        let username = require_var(USERNAME_VAR)?;
        let password = require_var(PASSWORD_VAR)?;
        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn require_var(name: &'static str) -> Result<String, Dhis2Error> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Dhis2Error::MissingCredential(name)),
    }
}

/// Process-lifetime run settings, immutable after construction and passed by
/// reference to every component.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub server: String,
    pub api_version: String,
    pub format: OutputFormat,
    pub query_method: QueryMethod,
    pub data_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub dry_run: bool,
}

impl RunConfig {
    /// Base analytics endpoint, e.g. `https://hiskenya.org/api/25/analytics`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/{}/analytics",
            self.server.trim_end_matches('/'),
            self.api_version
        )
    }

    pub fn org_units_path(&self) -> Utf8PathBuf {
        self.data_dir
            .join("organisationUnits")
            .join("all_level_2.csv")
    }

    pub fn indicators_dir(&self) -> Utf8PathBuf {
        self.data_dir.join("indicators")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn credentials_require_both_env_vars() {
        unsafe {
            env::remove_var(USERNAME_VAR);
            env::remove_var(PASSWORD_VAR);
        }
        let err = Credentials::from_env().unwrap_err();
        assert_matches!(err, Dhis2Error::MissingCredential(USERNAME_VAR));

        unsafe {
            env::set_var(USERNAME_VAR, "admin");
            env::set_var(PASSWORD_VAR, "district");
        }
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "district");

        unsafe {
            env::remove_var(USERNAME_VAR);
            env::remove_var(PASSWORD_VAR);
        }
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials {
            username: "admin".to_string(),
            password: "district".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("district"));
    }

    fn config_with_server(server: &str) -> RunConfig {
        RunConfig {
            server: server.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            format: OutputFormat::Csv,
            query_method: QueryMethod::Http,
            data_dir: Utf8PathBuf::from("source_data"),
            output_dir: Utf8PathBuf::from("output"),
            dry_run: false,
        }
    }

    #[test]
    fn endpoint_joins_server_and_version() {
        let config = config_with_server("https://hiskenya.org");
        assert_eq!(config.endpoint(), "https://hiskenya.org/api/25/analytics");
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = config_with_server("https://hiskenya.org/");
        assert_eq!(config.endpoint(), "https://hiskenya.org/api/25/analytics");
    }

    #[test]
    fn data_paths_follow_source_layout() {
        let config = config_with_server(DEFAULT_SERVER);
        assert_eq!(
            config.org_units_path(),
            Utf8PathBuf::from("source_data/organisationUnits/all_level_2.csv")
        );
        assert_eq!(
            config.indicators_dir(),
            Utf8PathBuf::from("source_data/indicators")
        );
    }
}
