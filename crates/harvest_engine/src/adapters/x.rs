use std::collections::HashSet;

use harvest_core::{Extraction, RawAuthor, RawItem};
use serde_json::{Map, Value};

use super::walk::{number, str_at, text_field, walk_objects, Descend};
use super::Adapter;
use crate::{AdapterError, Payload};

/// GraphQL timeline responses (`UserTweets`, `UserMedia`, `UserByScreenName`).
#[derive(Debug, Default, Clone, Copy)]
pub struct XAdapter;

impl Adapter for XAdapter {
    fn extract(&self, payload: &Payload) -> Result<Extraction, AdapterError> {
        let doc = payload.json()?;
        let mut seen = HashSet::new();
        let mut extraction = Extraction::default();

        walk_objects(&doc, &mut |obj| {
            if extraction.author.is_none() {
                extraction.author = user_node(obj);
            }

            let media = obj
                .get("extended_entities")
                .and_then(|e| e.get("media"))
                .or_else(|| obj.get("legacy").and_then(|l| l.pointer("/entities/media")));
            if let Some(Value::Array(list)) = media {
                for node in list {
                    if let Some(item) = media_item(node) {
                        if seen.insert(item.id.clone()) {
                            extraction.items.push(item);
                        }
                    }
                }
            }

            // Other users' cards (quotes, retweets) must not win over the profile owner.
            if extraction.author.is_some() {
                Descend::Except("user_results")
            } else {
                Descend::All
            }
        });

        Ok(extraction)
    }
}

fn user_node(obj: &Map<String, Value>) -> Option<RawAuthor> {
    if obj.get("__typename").and_then(Value::as_str) != Some("User") {
        return None;
    }
    let legacy = obj.get("legacy")?;
    let core = obj.get("core");

    let picture = obj
        .get("avatar")
        .and_then(|avatar| str_at(avatar, "/image_url"))
        .or_else(|| str_at(legacy, "/profile_image_url_https"))
        .map(|url| url.replace("_normal", "_400x400"));

    Some(RawAuthor {
        id: text_field(obj, "rest_id"),
        username: str_at(legacy, "/screen_name")
            .or_else(|| core.and_then(|c| str_at(c, "/screen_name")))
            .map(str::to_string),
        nickname: core
            .and_then(|c| str_at(c, "/name"))
            .or_else(|| str_at(legacy, "/name"))
            .map(str::to_string),
        picture,
        header: str_at(legacy, "/profile_banner_url").map(str::to_string),
    })
}

fn media_item(node: &Value) -> Option<RawItem> {
    let id = node.as_object().and_then(|m| text_field(m, "id_str"))?;
    if let Some(video) = best_video(node) {
        return Some(RawItem::new(id, video).with_extension("mp4").in_collection("posts"));
    }
    let image = str_at(node, "/media_url_https")?;
    let url = if image.contains('?') {
        image.to_string()
    } else {
        format!("{image}?name=large")
    };
    Some(RawItem::new(id, url).with_extension("jpg").in_collection("posts"))
}

/// Highest-bitrate `video/mp4` variant.
fn best_video(node: &Value) -> Option<String> {
    node.pointer("/video_info/variants")?
        .as_array()?
        .iter()
        .filter(|v| v.get("content_type").and_then(Value::as_str) == Some("video/mp4"))
        .filter_map(|v| {
            let url = v.get("url")?.as_str()?;
            let bitrate = v.get("bitrate").and_then(number).unwrap_or(0.0);
            Some((bitrate, url))
        })
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, url)| url.to_string())
}
