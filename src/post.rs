// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::blog::{blog_path, BlogRef};
use crate::client::{Client, Params, Response};
use crate::error::{EncodeSnafu, FieldNotFoundSnafu, Result, TransportSnafu};
use crate::npf::{NpfContent, NpfTrail};
use crate::types::{decode_envelope, fmt_as_json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::{self, Display, Formatter};
use tracing::{event, Level};

/// One page of posts, plus the response it was decoded from.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Posts {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total_posts: i64,
    #[serde(skip)]
    response: Response,
}

impl Posts {
    /// The raw response these posts were decoded from, for fields this type does not model.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }
}

impl<'a> IntoIterator for &'a Posts {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Posts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

/// The fields needed to identify a post and act on it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MiniPost {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub blog_name: String,
    pub reblog_key: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Reblog {
    pub comment: String,
    pub tree_html: String,
}

/// A post of any type.
///
/// Tumblr's legacy post types each add their own fields; this struct carries the common ones.
/// NPF posts describe their body in `content` and their reblog chain in `trail`. Anything else
/// can be read through [Post::property] or from [Posts::response].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Post {
    pub id: u64,
    pub id_string: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub blog_name: String,
    pub reblog_key: String,

    pub body: String,
    pub can_like: bool,
    pub can_reblog: bool,
    pub can_reply: bool,
    pub can_send_in_message: bool,
    pub caption: String,
    pub date: String,
    pub display_avatar: bool,
    pub followed: bool,
    pub format: String,
    pub highlighted: Vec<Value>,
    pub liked: bool,
    pub note_count: u64,
    pub permalink_url: String,
    pub post_url: String,
    pub reblog: Reblog,
    pub notes: Vec<Note>,
    pub recommended_color: String,
    pub recommended_source: bool,
    pub short_url: String,
    pub slug: String,
    pub source_title: String,
    pub source_url: String,
    pub state: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub timestamp: u64,
    pub featured_timestamp: u64,
    pub track_name: String,

    pub content: Vec<NpfContent>,
    pub trail: Vec<NpfTrail>,
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context(EncodeSnafu)
}

impl Post {
    /// Names accepted by [Post::property].
    pub const PROPERTIES: &'static [&'static str] = &[
        "id",
        "id_string",
        "type",
        "blog_name",
        "reblog_key",
        "body",
        "can_like",
        "can_reblog",
        "can_reply",
        "can_send_in_message",
        "caption",
        "date",
        "display_avatar",
        "followed",
        "format",
        "highlighted",
        "liked",
        "note_count",
        "permalink_url",
        "post_url",
        "reblog",
        "notes",
        "recommended_color",
        "recommended_source",
        "short_url",
        "slug",
        "source_title",
        "source_url",
        "state",
        "summary",
        "tags",
        "timestamp",
        "featured_timestamp",
        "track_name",
        "content",
        "trail",
    ];

    /// Look up a single field by its JSON name.
    pub fn property(&self, name: &str) -> Result<Value> {
        let value = match name {
            "id" => Value::from(self.id),
            "id_string" => Value::from(self.id_string.as_str()),
            "type" => Value::from(self.kind.as_str()),
            "blog_name" => Value::from(self.blog_name.as_str()),
            "reblog_key" => Value::from(self.reblog_key.as_str()),
            "body" => Value::from(self.body.as_str()),
            "can_like" => Value::from(self.can_like),
            "can_reblog" => Value::from(self.can_reblog),
            "can_reply" => Value::from(self.can_reply),
            "can_send_in_message" => Value::from(self.can_send_in_message),
            "caption" => Value::from(self.caption.as_str()),
            "date" => Value::from(self.date.as_str()),
            "display_avatar" => Value::from(self.display_avatar),
            "followed" => Value::from(self.followed),
            "format" => Value::from(self.format.as_str()),
            "highlighted" => Value::from(self.highlighted.clone()),
            "liked" => Value::from(self.liked),
            "note_count" => Value::from(self.note_count),
            "permalink_url" => Value::from(self.permalink_url.as_str()),
            "post_url" => Value::from(self.post_url.as_str()),
            "reblog" => to_value(&self.reblog)?,
            "notes" => to_value(&self.notes)?,
            "recommended_color" => Value::from(self.recommended_color.as_str()),
            "recommended_source" => Value::from(self.recommended_source),
            "short_url" => Value::from(self.short_url.as_str()),
            "slug" => Value::from(self.slug.as_str()),
            "source_title" => Value::from(self.source_title.as_str()),
            "source_url" => Value::from(self.source_url.as_str()),
            "state" => Value::from(self.state.as_str()),
            "summary" => Value::from(self.summary.as_str()),
            "tags" => Value::from(self.tags.clone()),
            "timestamp" => Value::from(self.timestamp),
            "featured_timestamp" => Value::from(self.featured_timestamp),
            "track_name" => Value::from(self.track_name.as_str()),
            "content" => to_value(&self.content)?,
            "trail" => to_value(&self.trail)?,
            _ => return FieldNotFoundSnafu { name }.fail(),
        };
        Ok(value)
    }

    pub fn mini(&self) -> MiniPost {
        MiniPost {
            id: self.id,
            kind: self.kind.clone(),
            blog_name: self.blog_name.clone(),
            reblog_key: self.reblog_key.clone(),
        }
    }

    /// The blog this post was published on.
    pub fn blog(&self) -> BlogRef {
        BlogRef::new(self.blog_name.clone())
    }

    pub fn is_reblog(&self) -> bool {
        !self.trail.is_empty()
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

/// A like, reblog, reply or other activity on a post.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Note {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: u64,
    pub blog_name: String,
    pub blog_uuid: String,
    pub blog_url: String,
    pub followed: bool,
    pub avatar_shape: String,
    // reply notes
    pub reply_text: String,
    // reblog notes
    pub post_id: String,
    pub reblog_parent_blog_name: String,
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

async fn query_posts<C: Client + ?Sized>(
    client: &C,
    template: &str,
    name: &str,
    params: &Params,
) -> Result<Posts> {
    let path = blog_path(template, name);
    let response = client
        .get_with_params(&path, params)
        .await
        .context(TransportSnafu)?;
    let mut posts: Posts = decode_envelope(&response.body)?;
    event!(
        Level::DEBUG,
        "decoded {} of {} posts from {}",
        posts.len(),
        posts.total_posts,
        path
    );
    posts.response = response;
    Ok(posts)
}

/// Retrieve a page of a blog's posts.
///
/// `params` are passed through as query parameters; see the Tumblr API documentation for
/// filtering by `type`, `tag`, `id`, `offset`, `limit` and so on.
pub async fn get_posts<C: Client + ?Sized>(
    client: &C,
    name: &str,
    params: &Params,
) -> Result<Posts> {
    query_posts(client, "/blog/%s/posts", name, params).await
}

/// Retrieve a single post by id, or `None` if the blog has no such post.
pub async fn get_post<C: Client + ?Sized>(client: &C, name: &str, id: u64) -> Result<Option<Post>> {
    let params = [("id".to_string(), id.to_string())];
    let posts = get_posts(client, name, &params).await?;
    Ok(posts.posts.into_iter().find(|post| post.id == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::npf::TrailOrigin;

    const POSTS: &str = r#"{
        "meta": {"status": 200, "msg": "OK"},
        "response": {
            "blog": {"name": "staff"},
            "posts": [{
                "id": 7, "id_string": "7", "type": "text", "blog_name": "staff",
                "reblog_key": "abc", "note_count": 12, "tags": ["news", "updates"],
                "reblog": {"comment": "<p>hi</p>", "tree_html": ""},
                "notes": [
                    {"type": "reply", "blog_name": "fan", "reply_text": "nice", "timestamp": 2},
                    {"type": "reblog", "blog_name": "other", "post_id": "8", "reblog_parent_blog_name": "staff"}
                ],
                "content": [
                    {"type": "text", "text": "Hello"},
                    {"type": "image", "media": [{"url": "https://x/1.jpg", "width": 100, "height": 50}]}
                ],
                "trail": [
                    {"post": {"id": "1"}, "blog": {"name": "origin"}, "content": []},
                    {"content": [], "broken_blog": {"name": "deleted"}}
                ],
                "is_blocks_post_format": true
            }],
            "total_posts": 1
        }
    }"#;

    fn posts() -> Posts {
        decode_envelope(POSTS.as_bytes()).unwrap()
    }

    #[test]
    fn decodes_legacy_and_npf_fields() {
        let posts = posts();
        assert_eq!(posts.total_posts, 1);
        let post = &posts.posts[0];
        assert_eq!(post.id, 7);
        assert_eq!(post.kind, "text");
        assert_eq!(post.tags, vec!["news", "updates"]);
        assert_eq!(post.reblog.comment, "<p>hi</p>");
        assert_eq!(post.notes[0].reply_text, "nice");
        assert_eq!(post.notes[1].reblog_parent_blog_name, "staff");
        assert_eq!(post.content[1].media()[0].width, 100);
        assert!(post.is_reblog());
        assert!(matches!(post.trail[0].origin(), TrailOrigin::Post { .. }));
        assert!(post.trail[1].is_broken());
    }

    #[test]
    fn property_returns_field_values() {
        let post = &posts().posts[0];
        assert_eq!(post.property("note_count").unwrap(), Value::from(12u64));
        assert_eq!(post.property("type").unwrap(), "text");
        assert_eq!(post.property("tags").unwrap()[1], "updates");
        assert_eq!(post.property("reblog").unwrap()["comment"], "<p>hi</p>");
        assert_eq!(post.property("trail").unwrap()[1]["broken_blog"]["name"], "deleted");
    }

    #[test]
    fn every_listed_property_resolves() {
        let post = Post::default();
        for name in Post::PROPERTIES {
            assert!(post.property(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn unknown_property_is_an_error() {
        match Post::default().property("NoteCount") {
            Err(Error::FieldNotFound { name }) => assert_eq!(name, "NoteCount"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn property_matches_serialized_form() {
        let post = &posts().posts[0];
        let encoded: Value = serde_json::from_str(&post.to_string()).unwrap();
        for name in Post::PROPERTIES {
            assert_eq!(post.property(name).unwrap(), encoded[*name], "{}", name);
        }
    }

    #[test]
    fn mini_and_blog_refs() {
        let post = &posts().posts[0];
        let mini = post.mini();
        assert_eq!(mini.id, 7);
        assert_eq!(mini.reblog_key, "abc");
        assert_eq!(post.blog(), BlogRef::new("staff"));
    }

    #[test]
    fn display_omits_the_raw_response() {
        let value: Value = serde_json::from_str(&posts().to_string()).unwrap();
        assert_eq!(value["total_posts"], 1);
        assert!(value.get("response").is_none());
    }
}
