use crate::error::Result;
use crate::machine::{AppEvent, NotificationKind, NotificationOption, Timestamp, TimerId};

/// Arranges future wake-ups that deliver an event back into the dispatcher.
///
/// A wake-up is one-shot and keyed by [`TimerId`]: scheduling the same timer
/// again replaces the pending one. Delivery is best effort and may be late,
/// lost, or cleared by a reboot; recovery covers all of those.
pub trait Scheduler {
    fn schedule(&self, event: AppEvent, fire_at: Timestamp, timer: TimerId) -> Result<()>;

    /// Cancel one logical timer. Cancelling an idle timer is not an error.
    fn cancel(&self, timer: TimerId) -> Result<()>;
}

/// Shows and dismisses the user-facing prompt.
///
/// At most one notification is visible at a time; `show` replaces whatever
/// was there.
pub trait Notifier {
    fn show(&self, kind: NotificationKind, options: &[NotificationOption]) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

impl<T: Scheduler + ?Sized> Scheduler for &T {
    fn schedule(&self, event: AppEvent, fire_at: Timestamp, timer: TimerId) -> Result<()> {
        (**self).schedule(event, fire_at, timer)
    }

    fn cancel(&self, timer: TimerId) -> Result<()> {
        (**self).cancel(timer)
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn show(&self, kind: NotificationKind, options: &[NotificationOption]) -> Result<()> {
        (**self).show(kind, options)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
