//! Upload progress reporting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

/// Number of steps a simulated upload takes to reach 100%.
pub const SIMULATED_STEPS: u64 = 80;
pub const STEP_INTERVAL: Duration = Duration::from_millis(30);
/// How long a finished indicator stays visible before hiding.
pub const HIDE_DELAY: Duration = Duration::from_millis(600);

/// Something that displays upload progress.
pub trait ProgressIndicator: Send {
    fn show(&mut self);
    fn set(&mut self, percent: u8);
    fn hide(&mut self);
}

/// Animate `indicator` from 0 to 100% over a fixed number of steps,
/// independent of actual I/O, then hide it after a short delay.
pub async fn simulate_progress<I: ProgressIndicator + ?Sized>(total_bytes: u64, indicator: &mut I) {
    indicator.show();
    let mut last = 0u8;
    for step in 1..=SIMULATED_STEPS {
        tokio::time::sleep(STEP_INTERVAL).await;
        let loaded = total_bytes * step / SIMULATED_STEPS;
        let percent = if step == SIMULATED_STEPS {
            100
        } else if total_bytes == 0 {
            (step * 100 / SIMULATED_STEPS) as u8
        } else {
            (loaded * 100 / total_bytes).min(99) as u8
        };
        if percent != last {
            indicator.set(percent);
            last = percent;
        }
    }
    tokio::time::sleep(HIDE_DELAY).await;
    indicator.hide();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub percent: u8,
    pub visible: bool,
    pub done: bool,
}

/// Registry of in-flight uploads that clients can follow by id.
///
/// The client picks the id and may subscribe before or after the upload
/// starts. An entry is dropped once its upload hides the indicator, or once
/// its last subscriber goes away while no upload has claimed it.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    channels: HashMap<String, Channel>,
    next_serial: u64,
}

struct Channel {
    /// Tells a recreated entry apart from the one a handle was issued for.
    serial: u64,
    sender: watch::Sender<ProgressState>,
    subscribers: usize,
    tracked: bool,
}

impl Registry {
    fn channel(&mut self, id: &str) -> &mut Channel {
        let serial = self.next_serial;
        let channel = self.channels.entry(id.to_string()).or_insert_with(|| Channel {
            serial,
            sender: watch::channel(ProgressState::default()).0,
            subscribers: 0,
            tracked: false,
        });
        if channel.serial == serial {
            self.next_serial += 1;
        }
        channel
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(registry) => registry,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Follow the upload `id`. The entry lives at least as long as the
    /// returned [`Subscription`].
    pub fn subscribe(&self, id: &str) -> (watch::Receiver<ProgressState>, Subscription) {
        let mut registry = self.registry();
        let channel = registry.channel(id);
        channel.subscribers += 1;
        let subscription = Subscription {
            id: id.to_string(),
            serial: channel.serial,
            tracker: self.clone(),
        };
        (channel.sender.subscribe(), subscription)
    }

    /// Indicator that publishes to the channel for `id`.
    pub fn indicator(&self, id: &str) -> TrackedIndicator {
        let mut registry = self.registry();
        let channel = registry.channel(id);
        channel.tracked = true;
        TrackedIndicator {
            id: id.to_string(),
            serial: channel.serial,
            sender: channel.sender.clone(),
            tracker: self.clone(),
        }
    }

    fn finish(&self, id: &str, serial: u64) {
        let mut registry = self.registry();
        if registry.channels.get(id).is_some_and(|c| c.serial == serial) {
            registry.channels.remove(id);
        }
    }

    fn unsubscribe(&self, id: &str, serial: u64) {
        let mut registry = self.registry();
        let Some(channel) = registry.channels.get_mut(id) else {
            return;
        };
        if channel.serial != serial {
            return;
        }
        channel.subscribers = channel.subscribers.saturating_sub(1);
        if channel.subscribers == 0 && !channel.tracked {
            registry.channels.remove(id);
        }
    }

    pub fn active(&self) -> usize {
        self.registry().channels.len()
    }
}

/// Keeps a progress entry alive for one listener; dropping it lets the
/// entry go if no upload claimed it.
pub struct Subscription {
    id: String,
    serial: u64,
    tracker: ProgressTracker,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.tracker.unsubscribe(&self.id, self.serial);
    }
}

pub struct TrackedIndicator {
    id: String,
    serial: u64,
    sender: watch::Sender<ProgressState>,
    tracker: ProgressTracker,
}

impl ProgressIndicator for TrackedIndicator {
    fn show(&mut self) {
        self.sender.send_modify(|s| {
            s.visible = true;
            s.percent = 0;
        });
    }

    fn set(&mut self, percent: u8) {
        self.sender.send_modify(|s| s.percent = percent.min(100));
    }

    fn hide(&mut self) {
        self.sender.send_modify(|s| {
            s.visible = false;
            s.done = true;
        });
        self.tracker.finish(&self.id, self.serial);
    }
}
