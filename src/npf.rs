// Copyright (c) 2022 Espresso Systems (espressosys.com)
// This file is part of the Tumblr library.

// This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
// You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Neue Post Format content blocks and reblog trails.

use crate::blog::BlogMiniInfo;
use crate::types::fmt_as_json;
use serde::de::{self, value::MapAccessDeserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};

/// One block of an NPF post body.
///
/// Tumblr tags blocks with `type` (and sometimes `subtype`) and only fills in the fields relevant
/// to that type; everything else is left at its default.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NpfContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,

    pub text: String,
    pub formatting: Vec<Formatting>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_media"
    )]
    pub media: Option<NpfMediaContainer>,
    pub alt_text: String,

    #[serde(flatten)]
    pub link: NpfLink,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_media"
    )]
    pub poster: Option<NpfMediaContainer>,

    // audio and video blocks
    pub provider: String,
    pub embed_html: String,
    pub embed_url: String,
}

/// Block types understood by [NpfContent::content_kind].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
    Link,
    Audio,
    Video,
    Other,
}

impl NpfContent {
    pub fn content_kind(&self) -> ContentKind {
        match self.kind.as_str() {
            "text" => ContentKind::Text,
            "image" => ContentKind::Image,
            "link" => ContentKind::Link,
            "audio" => ContentKind::Audio,
            "video" => ContentKind::Video,
            _ => ContentKind::Other,
        }
    }

    /// All media attached to this block, in order. Empty for blocks without media.
    pub fn media(&self) -> &[NpfMedia] {
        self.media.as_ref().map(|m| m.as_slice()).unwrap_or(&[])
    }
}

impl Display for NpfContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

/// Fields of a `link` block. They sit at the top level of the block on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NpfLink {
    pub url: String,
    pub display_url: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub site_name: String,
}

/// Inline formatting applied to a range of a text block.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Formatting {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: u64,
    pub end: u64,
    // link formatting
    pub url: String,
    // mention formatting
    pub blog: BlogMiniInfo,
}

/// A single media asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NpfMedia {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// The `media` (or `poster`) member of a block.
///
/// Tumblr sends a lone object for a single asset and an array for a set of them (e.g. the
/// different resolutions of one image), so the shape of the JSON value decides the variant.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NpfMediaContainer {
    Single(NpfMedia),
    Collection(Vec<NpfMedia>),
}

impl NpfMediaContainer {
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn as_slice(&self) -> &[NpfMedia] {
        match self {
            Self::Single(media) => std::slice::from_ref(media),
            Self::Collection(media) => media,
        }
    }

    pub fn first(&self) -> Option<&NpfMedia> {
        self.as_slice().first()
    }

    pub fn into_vec(self) -> Vec<NpfMedia> {
        match self {
            Self::Single(media) => vec![media],
            Self::Collection(media) => media,
        }
    }
}

struct MediaContainerVisitor;

impl<'de> Visitor<'de> for MediaContainerVisitor {
    type Value = NpfMediaContainer;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a media object or an array of media objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        NpfMedia::deserialize(MapAccessDeserializer::new(map)).map(NpfMediaContainer::Single)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut media = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            media.push(item);
        }
        Ok(NpfMediaContainer::Collection(media))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Err(shape_error())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Err(shape_error())
    }
}

fn shape_error<E: de::Error>() -> E {
    E::custom("unexpected value shape for media field")
}

impl<'de> Deserialize<'de> for NpfMediaContainer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MediaContainerVisitor)
    }
}

// Absent members stay `None`; a present member, even `null`, must be an object or an array.
fn present_media<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NpfMediaContainer>, D::Error> {
    NpfMediaContainer::deserialize(deserializer).map(Some)
}

/// One ancestor in the reblog chain of an NPF post.
///
/// When the ancestor post is no longer available Tumblr omits `post`/`blog` and sends
/// `broken_blog` instead. Use [NpfTrail::origin] rather than reading the fields directly.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NpfTrail {
    pub post: TrailPost,
    pub blog: BlogMiniInfo,
    pub content: Vec<NpfContent>,
    pub broken_blog: BrokenBlog,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrailPost {
    pub id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrokenBlog {
    pub name: String,
}

/// Where a trail entry came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrailOrigin<'a> {
    Post {
        post: &'a TrailPost,
        blog: &'a BlogMiniInfo,
    },
    Broken(&'a BrokenBlog),
}

impl NpfTrail {
    /// A non-empty `broken_blog.name` marks the entry as broken.
    pub fn origin(&self) -> TrailOrigin<'_> {
        if self.broken_blog.name.is_empty() {
            TrailOrigin::Post {
                post: &self.post,
                blog: &self.blog,
            }
        } else {
            TrailOrigin::Broken(&self.broken_blog)
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.origin(), TrailOrigin::Broken(_))
    }
}

impl Display for NpfTrail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_as_json(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(json: &str) -> serde_json::Result<NpfMediaContainer> {
        serde_json::from_str(json)
    }

    #[test]
    fn object_decodes_as_single() {
        let m = media(r#"{"type":"image/png","url":"https://x/a.png","width":500,"height":400}"#)
            .unwrap();
        assert!(!m.is_array());
        assert_eq!(
            m,
            NpfMediaContainer::Single(NpfMedia {
                kind: "image/png".into(),
                url: "https://x/a.png".into(),
                width: 500,
                height: 400,
            })
        );
    }

    #[test]
    fn leading_whitespace_is_ignored() {
        assert!(media("  \n[]").unwrap().is_array());
        assert!(!media(" {}").unwrap().is_array());
    }

    #[test]
    fn array_decodes_as_collection() {
        let m = media(r#"[{"url":"https://x/1280.jpg","width":1280},{"url":"https://x/640.jpg","width":640}]"#)
            .unwrap();
        assert!(m.is_array());
        assert_eq!(m.as_slice().len(), 2);
        assert_eq!(m.first().unwrap().width, 1280);
        assert_eq!(m.into_vec()[1].url, "https://x/640.jpg");
    }

    #[test]
    fn empty_array_is_an_empty_collection() {
        assert_eq!(media("[]").unwrap(), NpfMediaContainer::Collection(vec![]));
    }

    #[test]
    fn scalars_are_rejected() {
        for json in &[r#""https://x/a.png""#, "42", "-1", "1.5", "true", "null"] {
            let err = media(json).unwrap_err();
            assert!(
                err.to_string().contains("unexpected value shape for media field"),
                "{}: {}",
                json,
                err
            );
        }
    }

    #[test]
    fn bad_element_in_collection_is_rejected() {
        assert!(media(r#"[{"width":"wide"}]"#).is_err());
    }

    #[test]
    fn media_shape_error_fails_the_whole_block() {
        let res: serde_json::Result<NpfContent> =
            serde_json::from_str(r#"{"type":"image","media":"nope"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn null_media_member_is_rejected() {
        let res: serde_json::Result<NpfContent> =
            serde_json::from_str(r#"{"type":"image","media":null}"#);
        assert!(res.is_err());
    }

    #[test]
    fn image_block_with_gallery_media() {
        let block: NpfContent = serde_json::from_str(
            r#"{"type":"image","media":[{"type":"image/jpeg","url":"https://x/1.jpg","width":1,"height":1}],"alt_text":"cat"}"#,
        )
        .unwrap();
        assert_eq!(block.content_kind(), ContentKind::Image);
        assert_eq!(block.alt_text, "cat");
        assert_eq!(block.media().len(), 1);
        assert!(block.poster.is_none());
    }

    #[test]
    fn link_block_fields_are_flattened() {
        let block: NpfContent = serde_json::from_str(
            r#"{"type":"link","url":"https://example.com","title":"Example","site_name":"ex","poster":{"url":"https://x/p.jpg"}}"#,
        )
        .unwrap();
        assert_eq!(block.content_kind(), ContentKind::Link);
        assert_eq!(block.link.url, "https://example.com");
        assert_eq!(block.link.site_name, "ex");
        assert_eq!(block.poster.as_ref().unwrap().first().unwrap().url, "https://x/p.jpg");
        assert!(block.media().is_empty());
    }

    #[test]
    fn text_block_with_mention() {
        let block: NpfContent = serde_json::from_str(
            r#"{"type":"text","subtype":"heading1","text":"hi @staff","formatting":[{"type":"mention","start":3,"end":9,"blog":{"name":"staff","uuid":"t:1"}}]}"#,
        )
        .unwrap();
        assert_eq!(block.subtype, "heading1");
        assert_eq!(block.formatting[0].kind, "mention");
        assert_eq!(block.formatting[0].blog.name, "staff");
        assert!(block.media.is_none());
    }

    #[test]
    fn serialized_single_media_is_an_object() {
        let block = NpfContent {
            kind: "image".into(),
            media: Some(NpfMediaContainer::Single(NpfMedia::default())),
            ..Default::default()
        };
        let value = serde_json::to_value(&block).unwrap();
        assert!(value["media"].is_object());
        assert!(value.get("poster").is_none());
        let back: NpfContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn trail_origin_is_inferred() {
        let ok: NpfTrail = serde_json::from_str(
            r#"{"post":{"id":"123"},"blog":{"name":"staff"},"content":[{"type":"text","text":"a"}]}"#,
        )
        .unwrap();
        match ok.origin() {
            TrailOrigin::Post { post, blog } => {
                assert_eq!(post.id, "123");
                assert_eq!(blog.name, "staff");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!ok.is_broken());

        let broken: NpfTrail =
            serde_json::from_str(r#"{"content":[],"broken_blog":{"name":"gone"}}"#).unwrap();
        assert_eq!(broken.origin(), TrailOrigin::Broken(&BrokenBlog { name: "gone".into() }));
    }
}
