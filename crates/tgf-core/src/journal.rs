//! In-memory record of recent relay attempts, feeding the dashboard.
//!
//! Bounded ring of records plus running totals. Nothing here is persisted;
//! the journal exists so the dashboard can show what the relay has been doing
//! since startup.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::domain::ChatId;

const PREVIEW_MAX: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    Success,
    Error,
}

/// One relay attempt, shaped for the dashboard's message feed.
#[derive(Clone, Debug, Serialize)]
pub struct RelayRecord {
    pub time: String,
    pub date: String,
    pub source: String,
    pub target: String,
    pub preview: String,
    pub status: RelayStatus,
}

#[derive(Debug, Default)]
struct JournalInner {
    history: VecDeque<RelayRecord>,
    labels: HashMap<ChatId, String>,
    total_attempts: u64,
    connected: bool,
    started_at: Option<DateTime<Utc>>,
}

/// Shared, mutex-guarded journal. Lock holds are short and never span an await.
#[derive(Debug)]
pub struct Journal {
    capacity: usize,
    inner: Mutex<JournalInner>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JournalStats {
    pub connected: bool,
    pub uptime: String,
    pub total_messages: u64,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(JournalInner::default()),
        }
    }

    /// Remember a resolved endpoint label so records and the dashboard show
    /// names instead of bare ids.
    pub fn set_label(&self, id: ChatId, label: impl Into<String>) {
        let mut inner = self.inner.lock().expect("journal lock poisoned");
        inner.labels.insert(id, label.into());
    }

    pub fn label(&self, id: ChatId) -> String {
        let inner = self.inner.lock().expect("journal lock poisoned");
        inner
            .labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn mark_connected(&self) {
        let mut inner = self.inner.lock().expect("journal lock poisoned");
        inner.connected = true;
        inner.started_at = Some(Utc::now());
    }

    pub fn mark_disconnected(&self) {
        let mut inner = self.inner.lock().expect("journal lock poisoned");
        inner.connected = false;
    }

    pub fn record(&self, source: ChatId, target: ChatId, text: Option<&str>, status: RelayStatus) {
        let now = Local::now();
        let record = RelayRecord {
            time: now.format("%H:%M:%S").to_string(),
            date: now.format("%Y-%m-%d").to_string(),
            source: self.label(source),
            target: self.label(target),
            preview: preview(text),
            status,
        };

        let mut inner = self.inner.lock().expect("journal lock poisoned");
        inner.history.push_back(record);
        if inner.history.len() > self.capacity {
            inner.history.pop_front();
        }
        inner.total_attempts += 1;
    }

    /// Most recent `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<RelayRecord> {
        let inner = self.inner.lock().expect("journal lock poisoned");
        inner.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn stats(&self) -> JournalStats {
        let inner = self.inner.lock().expect("journal lock poisoned");
        let uptime = inner
            .started_at
            .map(|t| uptime_label(Utc::now().signed_duration_since(t).num_seconds().max(0)))
            .unwrap_or_default();

        JournalStats {
            connected: inner.connected,
            uptime,
            total_messages: inner.total_attempts,
        }
    }
}

/// Text preview for the dashboard feed: first 80 chars, `[media]` when the
/// message carries no text.
fn preview(text: Option<&str>) -> String {
    match text {
        None | Some("") => "[media]".to_string(),
        Some(t) if t.chars().count() > PREVIEW_MAX => {
            let cut: String = t.chars().take(PREVIEW_MAX).collect();
            format!("{cut}...")
        }
        Some(t) => t.to_string(),
    }
}

fn uptime_label(total_sec: i64) -> String {
    let (d, rem) = (total_sec / 86_400, total_sec % 86_400);
    let (h, rem) = (rem / 3_600, rem % 3_600);
    let (m, s) = (rem / 60, rem % 60);

    if d > 0 {
        format!("{d}d {h}h {m}m")
    } else if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m {s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let j = Journal::new(3);
        for i in 0..5 {
            j.record(ChatId(1), ChatId(2), Some(&format!("msg {i}")), RelayStatus::Success);
        }

        let recent = j.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].preview, "msg 4");
        assert_eq!(recent[2].preview, "msg 2");
        assert_eq!(j.stats().total_messages, 5);
    }

    #[test]
    fn records_use_labels_when_known() {
        let j = Journal::new(10);
        j.set_label(ChatId(-100), "News Channel");
        j.record(ChatId(-100), ChatId(2), Some("hi"), RelayStatus::Error);

        let rec = &j.recent(1)[0];
        assert_eq!(rec.source, "News Channel");
        assert_eq!(rec.target, "2");
        assert_eq!(rec.status, RelayStatus::Error);
    }

    #[test]
    fn preview_truncates_and_marks_media() {
        assert_eq!(preview(None), "[media]");
        assert_eq!(preview(Some("")), "[media]");
        assert_eq!(preview(Some("short")), "short");

        let long = "x".repeat(100);
        let p = preview(Some(&long));
        assert_eq!(p.chars().count(), 83);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn uptime_label_formats() {
        assert_eq!(uptime_label(42), "0m 42s");
        assert_eq!(uptime_label(3_660), "1h 1m");
        assert_eq!(uptime_label(90_061), "1d 1h 1m");
    }
}
