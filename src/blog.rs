// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::client::{Client, Params};
use crate::error::{AvatarNotFoundSnafu, Result, TransportSnafu};
use crate::post::{get_posts, Posts};
use crate::types::{decode_envelope, fmt_as_json, BlogResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::{self, Display, Formatter};
use tracing::{event, Level};

/// Domain appended to blog names which are not already a full host name.
pub const DEFAULT_DOMAIN: &str = "tumblr.com";

/// Qualify a bare blog name (`staff`) with the default domain. Names containing a `.` are taken
/// to be full host names (custom domains included) and returned as is.
pub fn normalize_blog_name(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{}.{}", name, DEFAULT_DOMAIN)
    }
}

/// Substitute the normalized blog name for the `%s` placeholder in `template`.
///
/// The name is percent-encoded as a single path segment, so `/`, `?` or `#` in it cannot change
/// the shape of the request URL.
pub fn blog_path(template: &str, name: &str) -> String {
    template.replacen("%s", &urlencoding::encode(&normalize_blog_name(name)), 1)
}

/// A blog name, used as the starting point for requests about that blog.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlogRef {
    pub name: String,
}

impl BlogRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub async fn info<C: Client + ?Sized>(&self, client: &C) -> Result<Blog> {
        get_blog_info(client, &self.name).await
    }

    pub async fn posts<C: Client + ?Sized>(&self, client: &C, params: &Params) -> Result<Posts> {
        get_posts(client, &self.name, params).await
    }

    pub async fn avatar<C: Client + ?Sized>(&self, client: &C) -> Result<String> {
        get_avatar(client, &self.name).await
    }
}

impl Display for BlogRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Blog metadata, as returned by the blog info endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Blog {
    pub name: String,
    pub url: String,
    pub title: String,
    pub posts: i64,
    pub ask: bool,
    pub ask_anon: bool,
    pub ask_page_title: String,
    pub can_send_fan_mail: bool,
    pub can_submit: bool,
    pub can_subscribe: bool,
    pub description: String,
    pub followed: bool,
    pub is_blocked_from_primary: bool,
    pub is_nsfw: bool,
    pub share_likes: bool,
    pub submission_page_title: String,
    pub subscribed: bool,
    pub total_posts: i64,
    pub updated: i64,
    pub uuid: String,
}

impl Blog {
    pub fn blog_ref(&self) -> BlogRef {
        BlogRef::new(self.name.clone())
    }
}

impl Display for Blog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

/// The short blog description embedded in trails and mentions.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlogMiniInfo {
    pub name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub updated: u64,
    pub uuid: String,
}

/// Retrieve information about a blog.
pub async fn get_blog_info<C: Client + ?Sized>(client: &C, name: &str) -> Result<Blog> {
    let path = blog_path("/blog/%s/info", name);
    let response = client.get(&path).await.context(TransportSnafu)?;
    let info: BlogResponse<Blog> = decode_envelope(&response.body)?;
    event!(Level::DEBUG, "decoded blog info for {}", info.blog.name);
    Ok(info.blog)
}

/// Retrieve the URL of a blog's avatar at the default size.
///
/// Tumblr usually answers with a redirect whose `Location` header is the avatar itself. The body
/// is only consulted when that header is missing.
pub async fn get_avatar<C: Client + ?Sized>(client: &C, name: &str) -> Result<String> {
    avatar_at(client, name, &blog_path("/blog/%s/avatar", name)).await
}

/// Like [get_avatar], for one of the square sizes Tumblr serves (16, 24, 30, 40, 48, 64, 96, 128
/// or 512 pixels).
pub async fn get_avatar_sized<C: Client + ?Sized>(
    client: &C,
    name: &str,
    size: u16,
) -> Result<String> {
    let path = format!("{}/{}", blog_path("/blog/%s/avatar", name), size);
    avatar_at(client, name, &path).await
}

async fn avatar_at<C: Client + ?Sized>(client: &C, name: &str, path: &str) -> Result<String> {
    let response = client.get(path).await.context(TransportSnafu)?;
    if let Some(location) = response.header("Location").filter(|l| !l.is_empty()) {
        return Ok(location.to_string());
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return AvatarNotFoundSnafu { blog: name }.fail();
    }
    match response.result()?.get("location").and_then(Value::as_str) {
        Some(location) => Ok(location.to_string()),
        None => AvatarNotFoundSnafu { blog: name }.fail(),
    }
}
