// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::config::ClientConfig;
use crate::error::{self, InvalidUrlSnafu, RequestSnafu, StatusSnafu, TransportError};
use crate::types::{decode_envelope, Meta};
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use std::convert::{TryFrom, TryInto};
use std::fmt;
use surf::http::headers::USER_AGENT;
use surf::{StatusCode, Url};
use tracing::{event, Level};

/// Query string parameters, in the order they are sent.
pub type Params = [(String, String)];

/// A raw API response as seen by the query helpers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header by name, ignoring ASCII case. Returns the first value if the header was
    /// sent more than once.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Re-parse the `response` member of the body as untyped JSON.
    pub fn result(&self) -> error::Result<serde_json::Value> {
        decode_envelope(&self.body)
    }
}

/// The capability the query helpers need from an HTTP client.
///
/// Paths are relative to the API root (e.g. `/blog/staff.tumblr.com/info`). Implementations own
/// authentication, timeouts and the base URL; the query helpers only decode what comes back.
pub trait Client: Send + Sync {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Response, TransportError>> {
        self.get_with_params(path, &[])
    }

    fn get_with_params<'a>(
        &'a self,
        path: &'a str,
        params: &'a Params,
    ) -> BoxFuture<'a, Result<Response, TransportError>>;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    meta: Meta,
}

/// [Client] backed by a `surf` HTTP client.
///
/// Redirects are not followed, so endpoints which answer with a `Location` header (such as the
/// avatar endpoint) can be observed by the caller. Responses with a 4xx or 5xx status become
/// [TransportError::Status], using the `meta.msg` of the body as the message when there is one.
#[derive(Clone)]
pub struct SurfClient {
    client: surf::Client,
    config: ClientConfig,
}

impl fmt::Debug for SurfClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfClient")
            .field("base_url", &self.config.base_url)
            .field("user_agent", &self.config.user_agent)
            .finish()
    }
}

impl SurfClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client: surf::Client = surf::Config::new()
            .set_timeout(Some(config.timeout()))
            .try_into()
            .map_err(|err| {
                RequestSnafu {
                    message: format!("unable to build HTTP client: {}", err),
                }
                .build()
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str, params: &Params) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|err| {
            InvalidUrlSnafu {
                url: raw.clone(),
                message: err.to_string(),
            }
            .build()
        })?;
        if !params.is_empty() || self.config.api_key.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(key) = &self.config.api_key {
                pairs.append_pair("api_key", key);
            }
        }
        Ok(url)
    }

    async fn send(&self, path: &str, params: &Params) -> Result<Response, TransportError> {
        let url = self.url(path, params)?;
        event!(Level::DEBUG, "--> GET {} ({} params)", path, params.len());
        let mut res = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .await
            .map_err(TransportError::from_surf)?;
        let status = res.status();
        let body = res.body_bytes().await.map_err(TransportError::from_surf)?;
        let mut headers = Vec::new();
        for (name, values) in res.iter() {
            for value in values.iter() {
                headers.push((name.as_str().to_string(), value.as_str().to_string()));
            }
        }
        event!(
            Level::DEBUG,
            "<-- {} {} ({} bytes)",
            u16::from(status),
            path,
            body.len()
        );
        response_to_result(Response {
            status: status.into(),
            headers,
            body,
        })
    }
}

impl Client for SurfClient {
    fn get_with_params<'a>(
        &'a self,
        path: &'a str,
        params: &'a Params,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        self.send(path, params).boxed()
    }
}

/// Turn responses with an error status into a [TransportError::Status].
///
/// Redirects and other non-error statuses pass through unchanged.
pub fn response_to_result(res: Response) -> Result<Response, TransportError> {
    if res.status < 400 {
        return Ok(res);
    }
    let message = serde_json::from_slice::<ErrorBody>(&res.body)
        .ok()
        .map(|body| body.meta.msg)
        .filter(|msg| !msg.is_empty())
        .or_else(|| {
            StatusCode::try_from(res.status)
                .ok()
                .map(|code| code.canonical_reason().to_string())
        })
        .unwrap_or_default();
    StatusSnafu {
        status: res.status,
        message,
    }
    .fail()
}
