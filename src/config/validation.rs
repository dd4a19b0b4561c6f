use super::defaults::{CREDENTIAL_SEPARATOR, DEFAULT_MPD_HOST, DEFAULT_MPD_PORT};
use super::AppConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;

/// Where the MPD connection goes, with the password split off the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl ConnectionTarget {
    /// Resolve `MPD_HOST`/`MPD_PORT` style values, falling back to the MPD defaults.
    pub fn resolve(host: Option<&str>, port: Option<u16>) -> Self {
        let (password, host) = match host.map(str::trim).filter(|h| !h.is_empty()) {
            Some(raw) => match raw.split_once(CREDENTIAL_SEPARATOR) {
                Some((password, host)) => {
                    let password = (!password.is_empty()).then(|| password.to_string());
                    (password, host.to_string())
                }
                None => (None, raw.to_string()),
            },
            None => (None, DEFAULT_MPD_HOST.to_string()),
        };
        Self {
            host,
            port: port.unwrap_or(DEFAULT_MPD_PORT),
            password,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values that would otherwise only fail once acme is already showing windows.
    pub fn validate(&mut self) -> Result<()> {
        if self.acme_root.as_os_str().is_empty() {
            bail!("--acme-root cannot be empty");
        }
        if self.port == Some(0) {
            bail!("--port must be between 1 and 65535");
        }
        if self.connection_target().host.is_empty() {
            bail!("--host names no host after the password");
        }
        self.info_command()?;
        Ok(())
    }

    pub fn connection_target(&self) -> ConnectionTarget {
        ConnectionTarget::resolve(self.host.as_deref(), self.port)
    }

    /// Split `--info-cmd` into program and leading arguments.
    pub fn info_command(&self) -> Result<Vec<String>> {
        let words = shell_words::split(&self.info_cmd)
            .with_context(|| format!("--info-cmd '{}' is not a valid command line", self.info_cmd))?;
        if words.is_empty() {
            bail!("--info-cmd cannot be empty");
        }
        Ok(words)
    }
}
