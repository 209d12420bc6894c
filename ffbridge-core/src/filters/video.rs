//! Video filters. Audio media reject them at registration.

/// A filter operating on the video stream.
pub trait VideoFilter: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// A raw `-vf` filter graph expression.
#[derive(Debug, Clone)]
pub struct CustomVideoFilter {
    expression: String,
}

impl CustomVideoFilter {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl VideoFilter for CustomVideoFilter {
    fn name(&self) -> &str {
        "custom-video"
    }
}
