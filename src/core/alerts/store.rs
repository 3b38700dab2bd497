//! Capped, newest-first alert list with read state and category filtering.

use std::collections::VecDeque;

use chrono::Utc;

use crate::core::model::{Alert, AlertId, Category, NewAlert};

pub const DEFAULT_MAX_ALERTS: usize = 100;

/// Render target for the alert list and the unread badge.
pub trait AlertView {
    /// Redraw the list; `alerts` is already filtered and newest-first.
    fn render_alerts(&self, alerts: &[Alert]);
    fn update_badge(&self, unread: usize);
}

/// View that draws nothing.
pub struct NullView;

impl AlertView for NullView {
    fn render_alerts(&self, _alerts: &[Alert]) {}
    fn update_badge(&self, _unread: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFilter {
    #[default]
    All,
    Category(Category),
}

impl AlertFilter {
    /// Parse a filter button key: `all`, `critical`, `warning`, `info` or `success`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Self::All),
            other => Category::all()
                .iter()
                .find(|c| c.as_str() == other)
                .map(|c| Self::Category(*c)),
        }
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => alert.category() == *category,
        }
    }
}

pub struct AlertStore {
    /// Front is the newest alert.
    alerts: VecDeque<Alert>,
    max_alerts: usize,
    next_id: u64,
    filter: AlertFilter,
    view: Box<dyn AlertView>,
}

impl AlertStore {
    pub fn new(max_alerts: usize, view: Box<dyn AlertView>) -> Self {
        Self {
            alerts: VecDeque::new(),
            max_alerts: max_alerts.max(1),
            next_id: 0,
            filter: AlertFilter::All,
            view,
        }
    }

    pub fn max_alerts(&self) -> usize {
        self.max_alerts
    }

    /// Create an alert, put it at the head and evict from the tail past the cap.
    pub fn add_alert(&mut self, spec: NewAlert) -> Alert {
        self.next_id += 1;
        let alert = Alert::new(AlertId::new(self.next_id), Utc::now(), spec);
        log::info!(
            "[{}] {} - {} ({:?})",
            alert.category(),
            alert.title(),
            alert.description(),
            alert.source()
        );

        self.alerts.push_front(alert.clone());
        if self.alerts.len() > self.max_alerts {
            let evicted = self.alerts.len() - self.max_alerts;
            self.alerts.truncate(self.max_alerts);
            log::debug!("evicted {} oldest alert(s)", evicted);
        }

        self.refresh();
        alert
    }

    /// Unknown ids are ignored.
    pub fn mark_as_read(&mut self, id: AlertId) {
        let changed = self
            .alerts
            .iter_mut()
            .find(|a| a.id() == id)
            .map(Alert::mark_read)
            .unwrap_or(false);
        if changed {
            self.refresh();
        }
    }

    /// Unknown ids are ignored.
    pub fn dismiss(&mut self, id: AlertId) {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id() != id);
        if self.alerts.len() != before {
            self.refresh();
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for alert in self.alerts.iter_mut() {
            alert.mark_read();
        }
        self.refresh();
    }

    pub fn clear_all(&mut self) {
        self.alerts.clear();
        self.refresh();
    }

    /// Fresh newest-first copy of the alerts passing `filter`.
    pub fn list_filtered(&self, filter: AlertFilter) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read()).count()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id() == id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn filter(&self) -> AlertFilter {
        self.filter
    }

    /// Switch the filter used when redrawing the list.
    pub fn set_filter(&mut self, filter: AlertFilter) {
        self.filter = filter;
        self.view.render_alerts(&self.list_filtered(filter));
    }

    fn refresh(&self) {
        self.view.render_alerts(&self.list_filtered(self.filter));
        self.view.update_badge(self.unread_count());
    }
}
