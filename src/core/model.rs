use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::DashboardEvent;

/// Severity of an alert; drives icon and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Critical,
    Warning,
    Info,
    Success,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[Self::Critical, Self::Warning, Self::Info, Self::Success]
    }

    /// Font Awesome icon name used by alert rows and toasts
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Critical => "exclamation-triangle",
            Self::Warning => "exclamation-circle",
            Self::Info => "info-circle",
            Self::Success => "check-circle",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem an alert originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    System,
    Hyperspectral,
    Illuminance,
    Wargaming,
    Audio,
    Cameras,
}

impl Source {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Hyperspectral => "Spectral analysis",
            Self::Illuminance => "Lighting",
            Self::Wargaming => "Simulation",
            Self::Audio => "Audio",
            Self::Cameras => "Cameras",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AlertId(u64);

impl AlertId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// A notification shown in the alert list.
///
/// Everything except the read flag is fixed at creation; fields are only
/// reachable through getters so the store is the sole writer of `read`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    id: AlertId,
    category: Category,
    title: String,
    description: String,
    source: Source,
    created_at: DateTime<Utc>,
    read: bool,
    payload: Option<DashboardEvent>,
}

impl Alert {
    pub(crate) fn new(id: AlertId, created_at: DateTime<Utc>, spec: NewAlert) -> Self {
        Self {
            id,
            category: spec.category,
            title: spec.title,
            description: spec.description,
            source: spec.source,
            created_at,
            read: false,
            payload: spec.payload,
        }
    }

    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn payload(&self) -> Option<&DashboardEvent> {
        self.payload.as_ref()
    }

    /// One-way: an alert never becomes unread again.
    pub(crate) fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }
}

/// Everything the caller supplies when raising an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub source: Source,
    pub payload: Option<DashboardEvent>,
}

impl NewAlert {
    pub fn new(
        category: Category,
        source: Source,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            description: description.into(),
            source,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: DashboardEvent) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_categories_have_icons() {
        for category in Category::all() {
            assert!(!category.icon().is_empty());
        }
    }

    #[test]
    fn test_mark_read_is_one_way() {
        let spec = NewAlert::new(Category::Info, Source::System, "t", "d");
        let mut alert = Alert::new(AlertId::new(1), Utc::now(), spec);
        assert!(!alert.is_read());
        assert!(alert.mark_read());
        assert!(!alert.mark_read());
        assert!(alert.is_read());
    }

    #[test]
    fn test_alert_id_display() {
        assert_eq!(AlertId::new(7).to_string(), "alert-7");
    }
}
