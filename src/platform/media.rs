//! Media side effects requested from the host
//!
//! Promoting an attribute is enough for the browser to fetch a resource.
//! Two things need an explicit call into the host: decoding an image ahead
//! of paint, and buffering a video without starting playback.

use crate::dom::NodeId;
use thiserror::Error;

/// Why an image could not be decoded ahead of paint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("image decode failed: {0}")]
    Failed(String),
}

/// Host hooks for media that needs more than an attribute change
#[cfg_attr(test, mockall::automock)]
pub trait MediaHost {
    /// Decode the image at `src` for `node` before it is painted
    fn decode_image(&mut self, node: NodeId, src: &str) -> Result<(), DecodeError>;

    /// Buffer the media element without starting playback
    fn load_media(&mut self, node: NodeId);
}

/// A request that reached a [`RecordingMediaHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRequest {
    Decode { node: NodeId, src: String },
    Load { node: NodeId },
}

/// Media host that records every request, optionally failing decodes
#[derive(Debug, Default)]
pub struct RecordingMediaHost {
    requests: Vec<MediaRequest>,
    fail_decodes: bool,
}

impl RecordingMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose every decode attempt is rejected
    pub fn failing_decodes() -> Self {
        Self {
            requests: Vec::new(),
            fail_decodes: true,
        }
    }

    pub fn requests(&self) -> &[MediaRequest] {
        &self.requests
    }
}

impl MediaHost for RecordingMediaHost {
    fn decode_image(&mut self, node: NodeId, src: &str) -> Result<(), DecodeError> {
        self.requests.push(MediaRequest::Decode {
            node,
            src: src.to_string(),
        });
        if self.fail_decodes {
            return Err(DecodeError::Failed(src.to_string()));
        }
        Ok(())
    }

    fn load_media(&mut self, node: NodeId) {
        self.requests.push(MediaRequest::Load { node });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_recording_host() {
        let mut doc = Document::with_skeleton();
        let img = doc.create_element("img");
        let mut host = RecordingMediaHost::failing_decodes();

        let result = host.decode_image(img, "a.jpg");
        assert_eq!(result, Err(DecodeError::Failed("a.jpg".into())));
        host.load_media(img);

        assert_eq!(
            host.requests(),
            &[
                MediaRequest::Decode {
                    node: img,
                    src: "a.jpg".into()
                },
                MediaRequest::Load { node: img },
            ]
        );
    }
}
