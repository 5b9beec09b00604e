// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Typed client interfaces for the Tumblr v2 API.
//!
//! All data structures returned by the Tumblr API endpoints covered here correspond directly to
//! Rust data structures via the serde deserialization interfaces. Decoding is lenient in the same
//! way the API is: fields missing from a response take their default value and unknown fields are
//! ignored, but a field of the wrong type fails the whole response. Every entity implements
//! [Display](std::fmt::Display) by re-encoding itself as JSON, which is convenient for logging.
//!
//! Requests go through the [Client](client::Client) trait, which only has to be able to issue a
//! `GET` for a path and hand back the status, headers and body. [SurfClient](client::SurfClient)
//! is the default implementation; tests and applications with their own HTTP stack can supply
//! another. Entities never hold on to the client: follow-up requests such as
//! [BlogRef::posts](blog::BlogRef::posts) take it as an argument.
//!
//! The one irregular part of the wire format is the `media` member of Neue Post Format content
//! blocks, which is either an object or an array of objects. [NpfMediaContainer] models it as a
//! two-variant enum chosen by the shape of the value.

pub mod blog;
pub mod client;
pub mod config;
pub mod error;
pub mod npf;
pub mod post;
pub mod types;

pub use blog::*;
pub use client::{Client, Params, Response, SurfClient};
pub use config::ClientConfig;
pub use error::*;
pub use npf::*;
pub use post::*;
pub use types::*;
