//! Ownership registry
//!
//! Records which timers and subscriptions each owner created so they can be
//! released together at teardown. The registry only holds a `Weak` to the
//! owner's identity token: dropping every `Owner` clone makes the entry an
//! orphan, which `sweep` later releases and prunes.
//!
//! Entries are keyed by the token's address. The `Weak` held here keeps the
//! allocation alive, so an address is never reused while its entry exists.

use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::timers::{Scheduler, SchedulerError, SubscriptionId, TimerId};

struct OwnerToken {
    label: String,
}

/// Reference identity of an entity that owns timers and subscriptions.
///
/// Clones share the identity. Equality compares identity, never labels.
#[derive(Clone)]
pub struct Owner {
    token: Rc<OwnerToken>,
}

impl Owner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            token: Rc::new(OwnerToken {
                label: label.into(),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.token.label
    }

    fn key(&self) -> usize {
        Rc::as_ptr(&self.token) as usize
    }
}

impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for Owner {}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Owner({}@{:#x})", self.token.label, self.key())
    }
}

/// A handle released together with its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Timer(TimerId),
    Subscription(SubscriptionId),
}

impl From<TimerId> for Attachment {
    fn from(id: TimerId) -> Self {
        Attachment::Timer(id)
    }
}

impl From<SubscriptionId> for Attachment {
    fn from(id: SubscriptionId) -> Self {
        Attachment::Subscription(id)
    }
}

/// Result of a liveness sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries whose owner was gone
    pub pruned_owners: usize,
    /// Handles released from those entries
    pub released: usize,
    /// Handles of live owners that no longer exist in the scheduler
    pub stale_dropped: usize,
}

struct OwnerEntry {
    owner: Weak<OwnerToken>,
    label: String,
    attachments: Vec<Attachment>,
}

/// Weak map from owner to the handles it registered
#[derive(Default)]
pub struct OwnershipRegistry {
    entries: HashMap<usize, OwnerEntry>,
}

impl fmt::Debug for OwnershipRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipRegistry")
            .field("owners", &self.entries.len())
            .field("attachments", &self.attachment_count())
            .finish()
    }
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handle under `owner`. Attaching the same handle twice is a no-op.
    pub fn attach(&mut self, owner: &Owner, attachment: impl Into<Attachment>) {
        let attachment = attachment.into();
        let entry = self.entries.entry(owner.key()).or_insert_with(|| OwnerEntry {
            owner: Rc::downgrade(&owner.token),
            label: owner.token.label.clone(),
            attachments: Vec::new(),
        });
        if !entry.attachments.contains(&attachment) {
            entry.attachments.push(attachment);
        }
    }

    pub fn attach_timer(&mut self, owner: &Owner, timer: TimerId) {
        self.attach(owner, Attachment::Timer(timer));
    }

    pub fn attach_subscription(&mut self, owner: &Owner, subscription: SubscriptionId) {
        self.attach(owner, Attachment::Subscription(subscription));
    }

    /// Forget a single handle without touching the scheduler
    pub fn detach(&mut self, owner: &Owner, attachment: impl Into<Attachment>) -> bool {
        let attachment = attachment.into();
        let Some(entry) = self.entries.get_mut(&owner.key()) else {
            return false;
        };
        let before = entry.attachments.len();
        entry.attachments.retain(|a| *a != attachment);
        before != entry.attachments.len()
    }

    /// Unsubscribe and destroy everything `owner` attached, then forget it.
    ///
    /// Returns the number of handles actually released. Calling it again (or
    /// for an owner that never attached anything) releases nothing.
    pub fn release_all(&mut self, owner: &Owner, scheduler: &mut Scheduler) -> usize {
        let Some(entry) = self.entries.remove(&owner.key()) else {
            return 0;
        };
        let released = release(&entry.attachments, scheduler);
        debug!(owner = %entry.label, released, "Owner released");
        released
    }

    /// Release and prune every entry whose owner is gone, and drop handles
    /// of live owners that the scheduler no longer knows.
    pub fn sweep(&mut self, scheduler: &mut Scheduler) -> SweepReport {
        let mut report = SweepReport::default();

        let orphans: Vec<usize> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.owner.strong_count() == 0)
            .map(|(&key, _)| key)
            .collect();

        for key in orphans {
            let Some(entry) = self.entries.remove(&key) else {
                continue;
            };
            let released = release(&entry.attachments, scheduler);
            warn!(
                owner = %entry.label,
                attachments = entry.attachments.len(),
                released,
                "Pruned orphaned owner (dropped without teardown)"
            );
            report.pruned_owners += 1;
            report.released += released;
        }

        for entry in self.entries.values_mut() {
            let before = entry.attachments.len();
            entry.attachments.retain(|attachment| match *attachment {
                Attachment::Timer(id) => scheduler.contains(id),
                Attachment::Subscription(id) => scheduler.is_subscribed(id),
            });
            report.stale_dropped += before - entry.attachments.len();
        }

        if report.pruned_owners > 0 {
            info!(
                pruned = report.pruned_owners,
                released = report.released,
                stale = report.stale_dropped,
                "Ownership sweep"
            );
        }
        report
    }

    /// Handles currently recorded for `owner`
    pub fn attachments(&self, owner: &Owner) -> &[Attachment] {
        self.entries
            .get(&owner.key())
            .map(|entry| entry.attachments.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_tracked(&self, owner: &Owner) -> bool {
        self.entries.contains_key(&owner.key())
    }

    /// Owners with an entry, including orphans not yet swept
    pub fn owner_count(&self) -> usize {
        self.entries.len()
    }

    pub fn attachment_count(&self) -> usize {
        self.entries.values().map(|e| e.attachments.len()).sum()
    }
}

/// Subscriptions first, so no handler of the owner runs while its timers go away
fn release(attachments: &[Attachment], scheduler: &mut Scheduler) -> usize {
    let mut released = 0;
    let subscriptions = attachments.iter().filter_map(|a| match *a {
        Attachment::Subscription(id) => Some(id),
        Attachment::Timer(_) => None,
    });
    for id in subscriptions {
        match scheduler.unsubscribe(id) {
            Ok(()) => released += 1,
            Err(e) => ignore_unknown(e),
        }
    }

    let timers = attachments.iter().filter_map(|a| match *a {
        Attachment::Timer(id) => Some(id),
        Attachment::Subscription(_) => None,
    });
    for id in timers {
        match scheduler.remove_timer(id) {
            Ok(_) => released += 1,
            Err(e) => ignore_unknown(e),
        }
    }
    released
}

fn ignore_unknown(error: SchedulerError) {
    if error.kind() == ErrorKind::UnknownHandle {
        debug!(error = %error, "Handle already gone");
    } else {
        warn!(error = %error, "Failed to release handle");
    }
}
