/// Where a decoded payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum PayloadSource {
    /// Decoded from a frame of a live camera stream.
    Live,
    /// Decoded from a single uploaded still image.
    StaticImage,
}

impl std::fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSource::Live => f.write_str("live"),
            PayloadSource::StaticImage => f.write_str("static-image"),
        }
    }
}

/// Text extracted from a successfully decoded visual code, tagged with its
/// source. Produced once per successful decode and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedPayload {
    text: String,
    source: PayloadSource,
}

impl DecodedPayload {
    /// Payload decoded from a live camera frame.
    pub fn live(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PayloadSource::Live,
        }
    }

    /// Payload decoded from an uploaded still image.
    pub fn static_image(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PayloadSource::StaticImage,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> PayloadSource {
        self.source
    }
}

impl std::fmt::Display for DecodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
