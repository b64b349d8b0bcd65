use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTUMN_URL: &str = "https://autumn.revolt.chat";

/// A file stored on the file server (icons, banners, avatars).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: String,

    /// Bucket the file lives in, e.g. `icons` or `avatars`
    pub tag: String,

    pub filename: String,

    pub metadata: Metadata,

    pub content_type: String,

    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Metadata {
    File,
    Text,
    Image { width: u32, height: u32 },
    Video { width: u32, height: u32 },
    Audio,
}

impl Attachment {
    /// Download URL on the given file server.
    pub fn url(&self, autumn_url: &str) -> String {
        format!("{}/{}/{}", autumn_url.trim_end_matches('/'), self.tag, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_metadata_is_tagged() {
        let attachment: Attachment = serde_json::from_value(serde_json::json!({
            "_id": "yQ5rTyOi0CaHLcqW7LcGz4jb4ebNDZ3Q6bnNmY8rNA",
            "tag": "icons",
            "filename": "crab.png",
            "metadata": {"type": "Image", "width": 256, "height": 128},
            "content_type": "image/png",
            "size": 4096
        }))
        .unwrap();

        assert_eq!(
            attachment.metadata,
            Metadata::Image {
                width: 256,
                height: 128
            }
        );
        assert_eq!(
            attachment.url(DEFAULT_AUTUMN_URL),
            "https://autumn.revolt.chat/icons/yQ5rTyOi0CaHLcqW7LcGz4jb4ebNDZ3Q6bnNmY8rNA"
        );
    }
}
