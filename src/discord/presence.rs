//! Presence rotation: cycles a fixed status table on a timer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::gateway::ActivityData;
use tokio::time::{interval, sleep};

/// Presentation kind for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Watching,
    Playing,
    Listening,
    Streaming,
    Competing,
}

/// One entry of the rotating status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDescriptor {
    pub kind: StatusKind,
    pub text: &'static str,
    pub url: Option<&'static str>,
}

const fn status(kind: StatusKind, text: &'static str) -> StatusDescriptor {
    StatusDescriptor {
        kind,
        text,
        url: None,
    }
}

/// The rotating status table. Immutable; only the rotator's index moves.
pub static STATUS_TABLE: &[StatusDescriptor] = &[
    status(StatusKind::Watching, "your files 📁"),
    status(StatusKind::Playing, "with Discord files 🎮"),
    status(StatusKind::Listening, "your commands 🎧"),
    status(StatusKind::Watching, "avatars & banners 👀"),
    status(StatusKind::Playing, "hide and seek with files 🕵️"),
    StatusDescriptor {
        kind: StatusKind::Streaming,
        text: "your content 📺",
        url: Some("https://www.twitch.tv/discord"),
    },
    status(StatusKind::Watching, "user profiles 👤"),
    status(StatusKind::Playing, "file detective 🔍"),
    status(StatusKind::Listening, "Discord's heartbeat 💓"),
    status(StatusKind::Watching, "the matrix 🔴"),
    status(StatusKind::Playing, "with 1s and 0s 💾"),
    status(StatusKind::Competing, "file conversion race 🏃‍♂️"),
];

/// Shown once at ready, before rotation begins.
pub static STARTUP_TABLE: &[StatusDescriptor] = &[
    status(StatusKind::Playing, "🚀 Booting up..."),
    status(StatusKind::Watching, "🔧 System initialization"),
    status(StatusKind::Listening, "🎵 Startup sequence"),
    status(StatusKind::Playing, "⚡ Powering up cores"),
];

/// Pick a startup status by the subsecond clock.
pub fn startup_status() -> &'static StatusDescriptor {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as usize)
        .unwrap_or(0);
    &STARTUP_TABLE[nanos % STARTUP_TABLE.len()]
}

/// Cyclic index into a status table. Owned by a single rotator task; no
/// synchronization needed since nothing else writes it.
#[derive(Debug, Default)]
pub struct RotationState {
    index: usize,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index, i.e. ticks-so-far mod table length.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Return the descriptor for this tick and advance, wrapping after the
    /// last entry.
    pub fn tick<'a>(&mut self, table: &'a [StatusDescriptor]) -> &'a StatusDescriptor {
        let current = &table[self.index % table.len()];
        self.index = (self.index + 1) % table.len();
        current
    }
}

/// Descriptor at a rotating-table index, wrapping past the end. Used to
/// re-apply the last shown status after a gateway resume.
pub fn descriptor_at(index: usize) -> &'static StatusDescriptor {
    &STATUS_TABLE[index % STATUS_TABLE.len()]
}

/// Convert a descriptor into a gateway activity.
pub fn to_activity(descriptor: &StatusDescriptor) -> ActivityData {
    match descriptor.kind {
        StatusKind::Playing => ActivityData::playing(descriptor.text),
        StatusKind::Watching => ActivityData::watching(descriptor.text),
        StatusKind::Listening => ActivityData::listening(descriptor.text),
        StatusKind::Competing => ActivityData::competing(descriptor.text),
        StatusKind::Streaming => descriptor
            .url
            .and_then(|url| ActivityData::streaming(descriptor.text, url).ok())
            .unwrap_or_else(|| ActivityData::watching(descriptor.text)),
    }
}

/// Rotate the presence forever: initial delay, then one advance per tick.
/// Runs independently of all command handling. The index of each applied
/// descriptor is published through `last_applied`; only this task writes it.
pub async fn run_presence_rotator(
    ctx: serenity::client::Context,
    initial_delay: Duration,
    period: Duration,
    last_applied: Arc<AtomicUsize>,
) {
    sleep(initial_delay).await;

    let mut state = RotationState::new();
    let mut timer = interval(period);
    loop {
        timer.tick().await;
        let applied = state.position();
        let descriptor = state.tick(STATUS_TABLE);
        last_applied.store(applied, Ordering::Relaxed);
        tracing::info!("Status updated: {:?} {}", descriptor.kind, descriptor.text);
        ctx.set_activity(Some(to_activity(descriptor)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_modulo_table_length() {
        let mut state = RotationState::new();
        let n = STATUS_TABLE.len() * 2 + 3;
        for _ in 0..n {
            state.tick(STATUS_TABLE);
        }
        assert_eq!(state.position(), n % STATUS_TABLE.len());
    }

    #[test]
    fn rotation_visits_entries_in_order() {
        let mut state = RotationState::new();
        let first = state.tick(STATUS_TABLE);
        let second = state.tick(STATUS_TABLE);
        assert_eq!(first, &STATUS_TABLE[0]);
        assert_eq!(second, &STATUS_TABLE[1]);
    }

    #[test]
    fn descriptor_at_recovers_each_applied_status() {
        let mut state = RotationState::new();
        for _ in 0..STATUS_TABLE.len() + 5 {
            let applied = state.position();
            let descriptor = state.tick(STATUS_TABLE);
            assert_eq!(descriptor_at(applied), descriptor);
        }
    }

    #[test]
    fn descriptor_at_wraps_past_table_end() {
        assert_eq!(descriptor_at(STATUS_TABLE.len()), &STATUS_TABLE[0]);
        assert_eq!(
            descriptor_at(STATUS_TABLE.len() * 3 + 2),
            &STATUS_TABLE[2]
        );
    }

    #[test]
    fn streaming_entry_carries_url() {
        let streaming = STATUS_TABLE
            .iter()
            .find(|d| d.kind == StatusKind::Streaming)
            .unwrap();
        assert!(streaming.url.is_some());
    }

    #[test]
    fn startup_status_comes_from_table() {
        let status = startup_status();
        assert!(STARTUP_TABLE.iter().any(|d| d == status));
    }

    #[test]
    fn tables_are_nonempty() {
        assert_eq!(STATUS_TABLE.len(), 12);
        assert_eq!(STARTUP_TABLE.len(), 4);
    }
}
