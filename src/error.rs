// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

use snafu::Snafu;

/// Errors produced by a [Client](crate::client::Client) implementation.
///
/// The query helpers never interpret these; they are passed to the caller inside
/// [Error::Transport] exactly as the client produced them.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("invalid request url {}: {}", url, message))]
    InvalidUrl { url: String, message: String },
    #[snafu(display("request failed: {}", message))]
    Request { message: String },
    #[snafu(display("server responded with status {}: {}", status, message))]
    Status { status: u16, message: String },
}

impl TransportError {
    /// Build a [TransportError] from a failed `surf` request.
    ///
    /// [surf::Error] does not implement [std::error::Error], so only its message is kept.
    pub fn from_surf(err: surf::Error) -> Self {
        RequestSnafu {
            message: err.to_string(),
        }
        .build()
    }
}

/// Errors returned by the Tumblr query helpers and entity accessors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{}", source))]
    Transport { source: TransportError },
    #[snafu(display("response body fails to deserialize: {}", source))]
    Decode { source: serde_json::Error },
    #[snafu(display("unable to encode value: {}", source))]
    Encode { source: serde_json::Error },
    #[snafu(display("invalid client configuration: {}", source))]
    Config { source: ::config::ConfigError },
    #[snafu(display("property {} does not exist", name))]
    FieldNotFound { name: String },
    #[snafu(display("unable to detect avatar location for {}", blog))]
    AvatarNotFound { blog: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
