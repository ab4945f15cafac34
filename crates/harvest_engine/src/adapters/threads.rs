use std::collections::HashSet;

use harvest_core::{Extraction, RawAuthor, RawItem};
use harvest_logging::harvest_trace;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use super::walk::{number, text_field, walk_objects, Descend};
use super::Adapter;
use crate::{AdapterError, Payload};

/// Threads / Instagram style payloads: GraphQL JSON responses, or profile HTML
/// carrying `script[data-sjs]` JSON blobs and an `og:image` avatar.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadsAdapter;

impl Adapter for ThreadsAdapter {
    fn extract(&self, payload: &Payload) -> Result<Extraction, AdapterError> {
        if payload.is_html() {
            return Ok(extract_html(&payload.text(), &payload.source));
        }
        let text = payload.text();
        // Some endpoints prefix JSON with an anti-hijacking guard.
        let body = text.trim_start().trim_start_matches("for (;;);");
        let doc: Value = serde_json::from_str(body).map_err(|err| AdapterError::Malformed {
            origin: payload.source.clone(),
            expected: "json",
            message: err.to_string(),
        })?;
        let mut collector = Collector::default();
        collector.walk(&doc);
        Ok(collector.finish())
    }
}

fn extract_html(html: &str, source: &str) -> Extraction {
    let doc = Html::parse_document(html);
    let mut collector = Collector::default();

    if let Ok(sel) = Selector::parse("script[data-sjs]") {
        for script in doc.select(&sel) {
            let text = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&text) {
                Ok(blob) => collector.walk(&blob),
                Err(err) => harvest_trace!("Skipping data-sjs blob in {}: {}", source, err),
            }
        }
    }

    let og_image = Selector::parse(r#"meta[property="og:image"]"#)
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(str::to_string)
        })
        .filter(|url| !url.trim().is_empty());

    let mut extraction = collector.finish();
    if let Some(picture) = og_image {
        let author = extraction.author.get_or_insert_with(RawAuthor::default);
        author.picture = Some(picture);
    }
    extraction
}

#[derive(Default)]
struct Collector {
    seen: HashSet<String>,
    extraction: Extraction,
}

impl Collector {
    fn walk(&mut self, doc: &Value) {
        walk_objects(doc, &mut |obj| {
            if self.extraction.author.is_none() {
                self.extraction.author = author_of(obj);
            }
            if let Some(item) = media_node(obj) {
                if self.seen.insert(item.id.clone()) {
                    self.extraction.items.push(item);
                }
            }
            Descend::Except("user")
        });
    }

    fn finish(self) -> Extraction {
        self.extraction
    }
}

fn author_of(obj: &Map<String, Value>) -> Option<RawAuthor> {
    let user = obj.get("user")?.as_object()?;
    let username = text_field(user, "username")?;
    let picture = user
        .get("hd_profile_pic_versions")
        .and_then(Value::as_array)
        .and_then(|versions| largest(versions))
        .or_else(|| text_field(user, "profile_pic_url"));
    Some(RawAuthor {
        id: text_field(user, "id").or_else(|| text_field(user, "pk")),
        username: Some(username),
        nickname: text_field(user, "full_name"),
        picture,
        header: None,
    })
}

/// A post node with media; carousel parents yield nothing themselves, their children are visited.
fn media_node(obj: &Map<String, Value>) -> Option<RawItem> {
    let id = text_field(obj, "pk").or_else(|| text_field(obj, "id"))?;
    if obj.contains_key("carousel_media") {
        return None;
    }
    if let Some(video) = pick_best(obj, Candidates::Video) {
        return Some(RawItem::new(id, video).with_extension("mp4"));
    }
    let image = pick_best(obj, Candidates::Image)?;
    Some(RawItem::new(id, image).with_extension("jpg"))
}

#[derive(Clone, Copy)]
enum Candidates {
    Image,
    Video,
}

/// The candidate matching the original dimensions, else the largest by area.
fn pick_best(obj: &Map<String, Value>, which: Candidates) -> Option<String> {
    let list = match which {
        Candidates::Image => obj.get("image_versions2")?.get("candidates")?,
        Candidates::Video => obj.get("video_versions")?,
    }
    .as_array()?;
    if list.is_empty() {
        return None;
    }

    let original = (
        obj.get("original_width").and_then(number),
        obj.get("original_height").and_then(number),
    );
    if let (Some(ow), Some(oh)) = original {
        let exact = list.iter().find(|c| {
            c.get("width").and_then(number) == Some(ow)
                && c.get("height").and_then(number) == Some(oh)
        });
        if let Some(url) = exact.and_then(|c| c.get("url")).and_then(Value::as_str) {
            return Some(url.to_string());
        }
    }
    largest(list)
}

fn largest(list: &[Value]) -> Option<String> {
    list.iter()
        .filter_map(|c| {
            let url = c.get("url")?.as_str()?;
            let w = c.get("width").and_then(number).unwrap_or(0.0);
            let h = c.get("height").and_then(number).unwrap_or(0.0);
            Some((w * h, url))
        })
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, url)| url.to_string())
}
