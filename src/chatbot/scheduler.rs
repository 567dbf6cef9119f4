//! Daily quote scheduling.
//!
//! Subscriptions live in a min-heap ordered by next fire time. A dedicated
//! background task sleeps until the earliest entry is due, emits one quote
//! for it, and requeues the entry for the next calendar day. Outbound
//! messages go through an mpsc channel so firing never blocks message
//! handling; the Telegram side drains the channel on its own task.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::sync::{mpsc, Notify};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::chatbot::picker::Picker;
use crate::chatbot::quotes::QuoteCatalog;

/// Outbound message request, delivery owned by the Telegram gateway task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendText {
    pub chat_id: i64,
    pub text: String,
}

/// A registered daily recurring notification for one chat.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub chat_id: i64,
    pub fire_time: NaiveTime,
    pub next_fire: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    next_fire: DateTime<Utc>,
    fire_time: NaiveTime,
    chat_id: i64,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.next_fire
            .cmp(&other.next_fire)
            .then(self.chat_id.cmp(&other.chat_id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Recurring daily-quote scheduler.
pub struct DailyScheduler {
    queue: Arc<Mutex<BinaryHeap<Reverse<Entry>>>>,
    notify: Arc<Notify>,
    catalog: QuoteCatalog,
    picker: Arc<Picker>,
    tz: Tz,
    out: mpsc::Sender<SendText>,
}

impl DailyScheduler {
    pub fn new(
        catalog: QuoteCatalog,
        picker: Arc<Picker>,
        tz: Tz,
        out: mpsc::Sender<SendText>,
    ) -> Self {
        Self {
            queue: Arc::new(Mutex::new(BinaryHeap::new())),
            notify: Arc::new(Notify::new()),
            catalog,
            picker,
            tz,
            out,
        }
    }

    /// Register a daily subscription for `chat_id` at `fire_time` wall-clock
    /// in the scheduler's timezone. If the fire time has already passed
    /// today, the first fire is the next day's occurrence. Repeat calls for
    /// the same chat register additional independent entries.
    pub fn subscribe(&self, chat_id: i64, fire_time: NaiveTime) -> Subscription {
        let next_fire = next_occurrence(fire_time, Utc::now(), self.tz);
        self.queue
            .lock()
            .expect("schedule queue lock poisoned")
            .push(Reverse(Entry {
                next_fire,
                fire_time,
                chat_id,
            }));
        // Wake the worker: the new entry may be earlier than what it sleeps on.
        self.notify.notify_one();
        info!("Chat {chat_id} subscribed to daily quotes, next fire {next_fire}");
        Subscription {
            chat_id,
            fire_time,
            next_fire,
        }
    }

    /// Number of registered subscriptions.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .expect("schedule queue lock poisoned")
            .len()
    }

    /// Spawn the background firing task.
    pub fn start(&self) {
        let queue = Arc::clone(&self.queue);
        let notify = Arc::clone(&self.notify);
        let catalog = self.catalog.clone();
        let picker = Arc::clone(&self.picker);
        let tz = self.tz;
        let out = self.out.clone();

        tokio::spawn(async move {
            loop {
                let next_fire = {
                    let queue = queue.lock().expect("schedule queue lock poisoned");
                    queue.peek().map(|Reverse(entry)| entry.next_fire)
                };

                let Some(at) = next_fire else {
                    notify.notified().await;
                    continue;
                };

                let now = Utc::now();
                if at > now {
                    let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
                    tokio::select! {
                        _ = sleep(wait) => {}
                        _ = notify.notified() => {}
                    }
                    continue;
                }

                let due = {
                    let mut queue = queue.lock().expect("schedule queue lock poisoned");
                    queue.pop().map(|Reverse(entry)| entry)
                };
                let Some(mut entry) = due else {
                    continue;
                };

                let quote = catalog.pick(&picker).to_string();
                info!("Daily quote fired for chat {}", entry.chat_id);
                let request = SendText {
                    chat_id: entry.chat_id,
                    text: quote,
                };
                if out.send(request).await.is_err() {
                    warn!("Outbound channel closed, stopping daily schedule");
                    break;
                }

                entry.next_fire = next_occurrence(entry.fire_time, Utc::now(), tz);
                queue
                    .lock()
                    .expect("schedule queue lock poisoned")
                    .push(Reverse(entry));
            }
        });
    }
}

/// Next wall-clock occurrence of `fire_time` in `tz` strictly after `after`.
fn next_occurrence(fire_time: NaiveTime, after: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    // cron uses 7-field format: sec min hour day month dow year
    let expr = format!(
        "{} {} {} * * * *",
        fire_time.second(),
        fire_time.minute(),
        fire_time.hour()
    );
    let schedule = Schedule::from_str(&expr).expect("daily cron expression is well-formed");
    schedule
        .after(&after.with_timezone(&tz))
        .next()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| after + chrono::Duration::days(1))
}
