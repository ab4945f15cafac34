use harvest_core::{Extraction, RawAuthor, RawItem};
use serde_json::Value;

use super::walk::{str_at, text_field};
use super::Adapter;
use crate::{AdapterError, Payload};

/// `/api/post/item_list/` responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TikTokAdapter;

impl Adapter for TikTokAdapter {
    fn extract(&self, payload: &Payload) -> Result<Extraction, AdapterError> {
        let doc = payload.json()?;
        let Some(list) = doc.get("itemList") else {
            // The last page of a profile carries `hasMore: false` and no list at all.
            if doc.get("hasMore").is_some() {
                return Ok(Extraction::default());
            }
            return Err(AdapterError::UnexpectedShape {
                origin: payload.source.clone(),
            });
        };
        let list = list.as_array().map(Vec::as_slice).unwrap_or_default();

        let author = list
            .iter()
            .find_map(|item| item.get("author"))
            .map(author_of);

        let mut items = Vec::new();
        for post in list {
            let Some(id) = post.as_object().and_then(|m| text_field(m, "id")) else {
                continue;
            };
            if let Some(url) = video_url(post) {
                items.push(RawItem::new(id, url).with_extension("mp4"));
                continue;
            }
            // Photo mode posts: one file per slide.
            if let Some(Value::Array(images)) = post.pointer("/imagePost/images") {
                for (n, image) in images.iter().enumerate() {
                    if let Some(url) = str_at(image, "/imageURL/urlList/0") {
                        items.push(
                            RawItem::new(format!("{id}_{}", n + 1), url).with_extension("jpg"),
                        );
                    }
                }
            }
        }

        Ok(Extraction { items, author })
    }
}

fn author_of(author: &Value) -> RawAuthor {
    let text = |key: &str| author.as_object().and_then(|m| text_field(m, key));
    RawAuthor {
        id: text("id"),
        username: text("uniqueId"),
        nickname: text("nickname"),
        picture: text("avatarLarger"),
        header: None,
    }
}

fn video_url(post: &Value) -> Option<&str> {
    str_at(post, "/video/bitrateInfo/0/PlayAddr/UrlList/0")
        .or_else(|| str_at(post, "/video/downloadAddr"))
        .or_else(|| str_at(post, "/video/playAddr"))
}
