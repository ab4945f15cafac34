use harvest_core::{Extraction, RawAuthor, RawItem};
use serde_json::Value;

use super::walk::{str_at, text_field};
use super::Adapter;
use crate::{AdapterError, Payload};

/// `UserActivityPinsResource` pages: `resource_response.data` is the pin list.
#[derive(Debug, Default, Clone, Copy)]
pub struct PinterestAdapter;

impl Adapter for PinterestAdapter {
    fn extract(&self, payload: &Payload) -> Result<Extraction, AdapterError> {
        let doc = payload.json()?;
        let pins = doc
            .pointer("/resource_response/data")
            .and_then(Value::as_array)
            .ok_or_else(|| AdapterError::UnexpectedShape {
                origin: payload.source.clone(),
            })?;

        let author = pins
            .iter()
            .find_map(|pin| pin.get("native_creator"))
            .map(author_of);

        let items = pins.iter().filter_map(pin_item).collect();
        Ok(Extraction { items, author })
    }
}

fn author_of(creator: &Value) -> RawAuthor {
    let text = |key: &str| creator.as_object().and_then(|m| text_field(m, key));
    RawAuthor {
        id: text("id"),
        username: text("username"),
        nickname: text("full_name"),
        picture: text("image_large_url").map(|url| upscale_avatar(&url)),
        header: None,
    }
}

fn pin_item(pin: &Value) -> Option<RawItem> {
    let id = pin.as_object().and_then(|m| text_field(m, "id"))?;
    if let Some(video) = video_url(pin) {
        return Some(RawItem::new(id, video).with_extension("mp4"));
    }
    let image = str_at(pin, "/images/orig/url").or_else(|| {
        str_at(
            pin,
            "/story_pin_data/pages/0/blocks/0/image/images/originals/url",
        )
    })?;
    Some(RawItem::new(id, image).with_extension("jpg"))
}

/// Video pins that embed their stream list; pins without one fall back to the cover image.
fn video_url(pin: &Value) -> Option<&str> {
    let list = pin
        .pointer("/videos/video_list")
        .or_else(|| pin.pointer("/story_pin_data/pages/0/blocks/0/video/video_list"))?;
    ["V_EXP7", "V_720P", "V_EXP6", "V_EXP5", "V_EXP4"]
        .iter()
        .find_map(|quality| str_at(list, &format!("/{quality}/url")))
        .filter(|url| url.ends_with(".mp4"))
}

/// Swap a sized avatar segment (`/140x140_RS/`, `/_60/`, ...) for `/originals/`.
fn upscale_avatar(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let (head, rest) = url.split_at(scheme_end + 3);
    let mut segments: Vec<&str> = rest.split('/').collect();
    // segment 0 is the host, the last one the file name
    let last = segments.len().saturating_sub(1);
    if let Some(seg) = segments
        .iter_mut()
        .enumerate()
        .skip(1)
        .find(|(i, seg)| *i < last && is_size_segment(seg))
        .map(|(_, seg)| seg)
    {
        *seg = "originals";
    }
    format!("{head}{}", segments.join("/"))
}

fn is_size_segment(segment: &str) -> bool {
    if ["_RS", "_60", "_140", "_280", "image_large_url"]
        .iter()
        .any(|p| segment.starts_with(p))
    {
        return true;
    }
    let digits_x_digits = |s: &str| {
        let mut parts = s.splitn(2, 'x');
        let w = parts.next().unwrap_or_default();
        let h = parts.next().unwrap_or_default();
        let h_digits: String = h.chars().take_while(char::is_ascii_digit).collect();
        !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()) && !h_digits.is_empty()
    };
    digits_x_digits(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pins_yield_originals_and_creator() {
        let doc = json!({"resource_response": {
            "bookmark": "Y2JVSG81V2sxcmNHRlpWM1J5VFVaU1ZscEhSbFJTYTNCNVZsZDRhMkZ0Um5K",
            "data": [
                {"id": "1001",
                 "native_creator": {"id": "55", "username": "someone", "full_name": "Some One",
                    "image_large_url": "https://i.pinimg.com/140x140_RS/ab/cd/ef/abcdef.jpg"},
                 "images": {"orig": {"url": "https://i.pinimg.com/originals/aa/1001.jpg"}}},
                {"id": "1002",
                 "story_pin_data": {"pages": [{"blocks": [{"image": {"images": {"originals":
                    {"url": "https://i.pinimg.com/originals/bb/1002.png"}}}}]}]}},
                {"id": "1003", "is_video": true,
                 "videos": {"video_list": {"V_720P": {"url": "https://v1.pinimg.com/videos/mc/720p/1003.mp4"}}},
                 "images": {"orig": {"url": "https://i.pinimg.com/originals/cc/1003.jpg"}}},
                {"type": "story", "id": "1004"}
            ]
        }});
        let extraction = PinterestAdapter
            .extract(&Payload::json_body("https://www.pinterest.com/resource/x", &doc))
            .unwrap();

        let found: Vec<_> = extraction
            .items
            .iter()
            .map(|i| (i.id.as_str(), i.url.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("1001", "https://i.pinimg.com/originals/aa/1001.jpg"),
                ("1002", "https://i.pinimg.com/originals/bb/1002.png"),
                ("1003", "https://v1.pinimg.com/videos/mc/720p/1003.mp4"),
            ]
        );
        let author = extraction.author.unwrap();
        assert_eq!(
            author.picture.as_deref(),
            Some("https://i.pinimg.com/originals/ab/cd/ef/abcdef.jpg")
        );
    }

    #[test]
    fn avatar_without_size_segment_is_kept() {
        let url = "https://i.pinimg.com/originals/ab/abcdef.jpg";
        assert_eq!(upscale_avatar(url), url);
        assert_eq!(
            upscale_avatar("https://i.pinimg.com/75x75_RS/ab/a.jpg"),
            "https://i.pinimg.com/originals/ab/a.jpg"
        );
    }

    #[test]
    fn missing_resource_response_is_unexpected_shape() {
        let payload = Payload::json_body("https://www.pinterest.com/resource/x", &json!({}));
        assert!(matches!(
            PinterestAdapter.extract(&payload),
            Err(AdapterError::UnexpectedShape { .. })
        ));
    }
}
