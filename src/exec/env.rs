// src/exec/env.rs

//! Environment overlay applied to the child before spawn.

use std::collections::BTreeMap;

use tokio::process::Command;
use tracing::debug;

use crate::sink::OutputSink;

/// Apply `overlay` on top of the inherited environment of `cmd`.
///
/// Every entry produces a diagnostic on `sink`: either an overwrite notice
/// with old and new value, or a notice that a new variable is being set.
/// `inherited` looks up the current value of a variable.
pub fn apply_overlay<F>(
    cmd: &mut Command,
    overlay: &BTreeMap<String, String>,
    sink: &dyn OutputSink,
    inherited: F,
) where
    F: Fn(&str) -> Option<String>,
{
    for (name, value) in overlay {
        let message = match inherited(name) {
            Some(old) => format!(
                "Overwriting the value of environment variable '{name}'. Old value: {old}, new value: {value}"
            ),
            None => format!("Setting environment variable '{name}'. Value: {value}"),
        };
        debug!(var = %name, "applying environment overlay");
        sink.log_message(&message);
        cmd.env(name, value);
    }
}

/// Lookup against the bootstrapper's own environment, which the child
/// inherits.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Messages(Mutex<Vec<String>>);

    impl OutputSink for Messages {
        fn log_message(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
        fn log_output(&self, _line: &str) {}
        fn log_error(&self, _line: &str) {}
    }

    #[test]
    fn reports_overwrite_and_new_variables() {
        let sink = Messages::default();
        let mut cmd = Command::new("true");
        let overlay = BTreeMap::from([
            ("EXISTING".to_string(), "new".to_string()),
            ("FRESH".to_string(), "value".to_string()),
        ]);

        apply_overlay(&mut cmd, &overlay, &sink, |name| {
            (name == "EXISTING").then(|| "old".to_string())
        });

        let messages = sink.0.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("Overwriting"));
        assert!(messages[0].contains("Old value: old"));
        assert!(messages[0].contains("new value: new"));
        assert!(messages[1].contains("Setting environment variable 'FRESH'"));

        let envs: Vec<_> = cmd.as_std().get_envs().collect();
        assert_eq!(envs.len(), 2);
    }
}
