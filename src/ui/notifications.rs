use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Local>,
    expires_at: Instant,
}

/// Transient messages shown at the top of the screen.
pub struct Notifications {
    items: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message.into());
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Failure, message.into());
    }

    fn push(&mut self, kind: NotificationKind, message: String) {
        self.items.push_back(Notification {
            kind,
            message,
            created_at: Local::now(),
            expires_at: Instant::now() + self.ttl,
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drops every notification whose time is up.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn render_notifications<B: Backend>(frame: &mut Frame<B>, area: Rect, notifications: &Notifications) {
    if notifications.is_empty() {
        return;
    }

    let width = area.width.saturating_sub(4).min(70);
    let mut y = area.y + 1;

    for notification in notifications.iter() {
        let height = 3;
        if y + height > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + (area.width - width) / 2, y, width, height);
        let (title, color) = match notification.kind {
            NotificationKind::Success => ("Success", Color::Green),
            NotificationKind::Failure => ("Error", Color::Red),
        };
        let text = Spans::from(format!(
            "[{}] {}",
            notification.created_at.format("%H:%M:%S"),
            notification.message.replace('\n', " ")
        ));
        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(color).bg(Color::Black))
            .block(Block::default().title(title).borders(Borders::ALL));

        frame.render_widget(Clear, rect);
        frame.render_widget(popup, rect);
        y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_expire() {
        let mut notifications = Notifications::new(Duration::from_secs(4));
        notifications.success("Client saved. ID: 1");
        assert_eq!(notifications.latest().unwrap().kind, NotificationKind::Success);

        notifications.prune(Instant::now());
        assert!(!notifications.is_empty());

        notifications.prune(Instant::now() + Duration::from_secs(5));
        assert!(notifications.is_empty());
    }

    #[test]
    fn only_the_most_recent_are_kept() {
        let mut notifications = Notifications::new(Duration::from_secs(4));
        for i in 0..5 {
            notifications.failure(format!("failure {i}"));
        }
        let messages: Vec<_> = notifications.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["failure 2", "failure 3", "failure 4"]);
    }
}
