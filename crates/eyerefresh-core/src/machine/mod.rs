mod effect;
mod recovery;
mod state;
mod timing;
mod transition;

pub use effect::{NotificationKind, NotificationOption, SideEffect, TimerId};
pub use recovery::{recover, Recovery, RecoveryAction, RecoveryTrigger};
pub use state::{now_ms, AppEvent, AppState, Timestamp, UnknownEvent};
pub use timing::TimingConfig;
pub use transition::{transition, Transition};
