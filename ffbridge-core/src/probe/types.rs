//! Property bags for ffprobe's `format` and `streams` sections.

use serde_json::{Map, Value};

/// Container-level information reported by `-show_format`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Format {
    properties: Map<String, Value>,
}

impl Format {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.get("duration").and_then(as_f64)
    }

    pub fn format_name(&self) -> Option<&str> {
        self.get("format_name").and_then(Value::as_str)
    }
}

/// A single stream reported by `-show_streams`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    properties: Map<String, Value>,
}

impl Stream {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn codec_type(&self) -> Option<&str> {
        self.get("codec_type").and_then(Value::as_str)
    }

    pub fn codec_name(&self) -> Option<&str> {
        self.get("codec_name").and_then(Value::as_str)
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type() == Some("audio")
    }

    pub fn is_video(&self) -> bool {
        self.codec_type() == Some("video")
    }

    pub fn channels(&self) -> Option<u32> {
        self.get("channels")
            .and_then(Value::as_u64)
            .and_then(|c| u32::try_from(c).ok())
    }

    /// Duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.get("duration").and_then(as_f64)
    }
}

/// Streams of a media file, in the order ffprobe reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamCollection {
    streams: Vec<Stream>,
}

impl StreamCollection {
    pub fn new(streams: Vec<Stream>) -> Self {
        Self { streams }
    }

    pub fn first(&self) -> Option<&Stream> {
        self.streams.first()
    }

    pub fn audios(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter().filter(|s| s.is_audio())
    }

    pub fn videos(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter().filter(|s| s.is_video())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stream> {
        self.streams.iter()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl<'a> IntoIterator for &'a StreamCollection {
    type Item = &'a Stream;
    type IntoIter = std::slice::Iter<'a, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.iter()
    }
}

// ffprobe writes most numeric fields as JSON strings.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
