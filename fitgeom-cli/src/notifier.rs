//! Messages utilisateur routés vers tracing

use fitgeom::{MessageLevel, Notifier};
use tracing::{error, info, warn};

/// Journalise chaque message et le garde pour le rapport
#[derive(Debug, Default)]
pub struct TracingNotifier {
    messages: Vec<(MessageLevel, String)>,
}

impl TracingNotifier {
    pub fn messages(&self) -> &[(MessageLevel, String)] {
        &self.messages
    }
}

impl Notifier for TracingNotifier {
    fn push(&mut self, level: MessageLevel, title: &str, message: &str) {
        match level {
            MessageLevel::Info | MessageLevel::Success => info!(title, "{}", message),
            MessageLevel::Warning => warn!(title, "{}", message),
            MessageLevel::Critical => error!(title, "{}", message),
        }
        self.messages.push((level, message.to_string()));
    }
}
