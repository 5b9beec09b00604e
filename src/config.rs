// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Settings for [SurfClient](crate::client::SurfClient).

use crate::error::{ConfigSnafu, Result};
use ::config::{Config, Environment, Map};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.tumblr.com/v2";
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_PREFIX: &str = "TUMBLR";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// API root that request paths are appended to, without a trailing slash.
    pub base_url: String,
    /// OAuth consumer key, sent as the `api_key` query parameter on every request.
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load settings from `TUMBLR_*` environment variables (`TUMBLR_API_KEY`,
    /// `TUMBLR_BASE_URL`, `TUMBLR_USER_AGENT`, `TUMBLR_TIMEOUT_SECS`) layered over the defaults.
    /// Empty variables are ignored; a value of the wrong type is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_env_source(None)
    }

    fn from_env_source(vars: Option<Map<String, String>>) -> Result<Self> {
        Config::builder()
            .add_source(Config::try_from(&Self::default()).context(ConfigSnafu)?)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()
            .context(ConfigSnafu)?
            .try_deserialize()
            .context(ConfigSnafu)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
