use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCode {
    NoTableOnPage,
    OcrTextEmpty,
    OcrDisabled,
    LowConfidenceTable,
    PageReadFailed,
    OcrFailed,
    RepeatedHeaderDropped,
}

/// A diagnostic raised while walking the pages of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractEvent {
    pub severity: Severity,
    pub code: EventCode,
    pub message: String,
    pub page: Option<u32>,
    pub confidence: Option<f32>,
}

impl ExtractEvent {
    #[must_use]
    pub fn new(severity: Severity, code: EventCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            page: None,
            confidence: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Receives page-level diagnostics as they happen.
pub trait EventSink {
    fn emit(&mut self, event: &ExtractEvent);
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &ExtractEvent) {
        let page = event.page.unwrap_or_default();
        let code = event.code;
        match event.severity {
            Severity::Debug => tracing::debug!(page, ?code, "{}", event.message),
            Severity::Info => tracing::info!(page, ?code, "{}", event.message),
            Severity::Warning => tracing::warn!(page, ?code, "{}", event.message),
            Severity::Error => tracing::error!(page, ?code, "{}", event.message),
        }
    }
}

impl EventSink for Vec<ExtractEvent> {
    fn emit(&mut self, event: &ExtractEvent) {
        self.push(event.clone());
    }
}

pub(crate) struct Diagnostics<'a> {
    sink: &'a mut dyn EventSink,
    recorded: Vec<ExtractEvent>,
}

impl<'a> Diagnostics<'a> {
    pub(crate) fn new(sink: &'a mut dyn EventSink) -> Self {
        Self {
            sink,
            recorded: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, event: ExtractEvent) {
        self.sink.emit(&event);
        self.recorded.push(event);
    }

    pub(crate) fn into_events(self) -> Vec<ExtractEvent> {
        self.recorded
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostics, EventCode, ExtractEvent, Severity};

    #[test]
    fn diagnostics_forward_and_record() {
        let mut forwarded: Vec<ExtractEvent> = Vec::new();
        let mut diagnostics = Diagnostics::new(&mut forwarded);
        diagnostics.emit(
            ExtractEvent::new(Severity::Error, EventCode::OcrFailed, "tesseract crashed").with_page(3),
        );
        let recorded = diagnostics.into_events();

        assert_eq!(recorded.len(), 1);
        assert_eq!(forwarded, recorded);
        assert_eq!(forwarded[0].page, Some(3));
    }

    #[test]
    fn severity_orders_by_importance() {
        assert!(Severity::Error > Severity::Warning);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
