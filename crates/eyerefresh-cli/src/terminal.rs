//! Notifier that mirrors prompts to the terminal.

use eyerefresh_core::error::Result;
use eyerefresh_core::{Database, NotificationKind, NotificationOption, Notifier};

/// Records the notification in the database and prints it to stderr.
///
/// The database row is what `reminder respond` answers; the printed copy is
/// for whoever is watching the daemon.
pub struct TerminalNotifier<'a> {
    db: &'a Database,
}

impl<'a> TerminalNotifier<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl Notifier for TerminalNotifier<'_> {
    fn show(&self, kind: NotificationKind, options: &[NotificationOption]) -> Result<()> {
        self.db.show(kind, options)?;
        eprintln!("\n  {}: {}", kind.title(), kind.text());
        for (i, option) in options.iter().enumerate() {
            eprintln!("    [{}] {}", i + 1, option.label);
        }
        eprintln!("  (answer with `eyerefresh reminder respond <n>`)\n");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Notifier::clear(self.db)
    }
}
