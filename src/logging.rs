//! Log output for generated reducer loggers, routed through `tracing`.

use std::fmt::Debug;

pub use tracing::Level;

/// Environment variable that marks the process as an interactive preview.
pub const PREVIEW_ENV_VAR: &str = "RUNNING_FOR_PREVIEWS";

/// Marker written in place of a diff when a transition leaves the state unchanged.
pub const NO_STATE_CHANGES: &str = "  (No state changes)";

/// Destination for log messages, identified by subsystem and category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogHandle {
    subsystem: &'static str,
    category: &'static str,
}

impl LogHandle {
    pub const fn new(subsystem: &'static str, category: &'static str) -> Self {
        Self {
            subsystem,
            category,
        }
    }

    pub fn subsystem(&self) -> &'static str {
        self.subsystem
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Emit `message` as a `tracing` event at `level`, tagged with this handle's subsystem and
    /// category.
    pub fn log(&self, level: Level, message: &str) {
        let Self {
            subsystem,
            category,
        } = *self;

        // `tracing` needs the level at compile time.
        match level {
            Level::ERROR => tracing::error!(subsystem, category, "{message}"),
            Level::WARN => tracing::warn!(subsystem, category, "{message}"),
            Level::INFO => tracing::info!(subsystem, category, "{message}"),
            Level::DEBUG => tracing::debug!(subsystem, category, "{message}"),
            _ => tracing::trace!(subsystem, category, "{message}"),
        }
    }
}

/// Whether [`PREVIEW_ENV_VAR`] is set to `1`.
pub fn is_running_for_previews() -> bool {
    std::env::var(PREVIEW_ENV_VAR).is_ok_and(|value| value == "1")
}

/// Pretty `Debug` rendering of `value`, with every line indented by `indent` spaces.
pub fn dump<T: Debug + ?Sized>(value: &T, indent: usize) -> String {
    let padding = " ".repeat(indent);

    format!("{value:#?}")
        .lines()
        .map(|line| format!("{padding}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line diff between the dumps of `old` and `new`, or `None` if they dump identically.
///
/// Removed lines are prefixed with `-`, added lines with `+`, and unchanged lines with a space.
pub fn diff<T: Debug + ?Sized>(old: &T, new: &T) -> Option<String> {
    let old = dump(old, 0);
    let new = dump(new, 0);

    if old == new {
        return None;
    }

    Some(
        diff::lines(&old, &new)
            .into_iter()
            .map(|line| match line {
                diff::Result::Left(removed) => format!("- {removed}"),
                diff::Result::Right(added) => format!("+ {added}"),
                diff::Result::Both(unchanged, _) => format!("  {unchanged}"),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Message logged for a single reducer transition.
pub fn render_transition<A, S>(action: &A, old_state: &S, new_state: &S) -> String
where
    A: Debug + ?Sized,
    S: Debug + ?Sized,
{
    let mut message = String::from("received action:\n");
    message.push_str(&dump(action, 2));
    message.push('\n');

    match diff(old_state, new_state) {
        Some(diff) => message.push_str(&diff),
        None => message.push_str(NO_STATE_CHANGES),
    }
    message.push('\n');

    message
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        count: u32,
    }

    #[derive(Debug)]
    enum Action {
        Increment,
    }

    #[test]
    fn dump_indents_every_line() {
        assert_eq!(
            dump(&Counter { count: 1 }, 2),
            "  Counter {\n      count: 1,\n  }"
        );
    }

    #[test]
    fn equal_values_have_no_diff() {
        assert_eq!(diff(&Counter { count: 1 }, &Counter { count: 1 }), None);
    }

    #[test]
    fn changed_line_marked() {
        let diff = diff(&Counter { count: 1 }, &Counter { count: 2 }).unwrap();

        assert_eq!(diff, "  Counter {\n-     count: 1,\n+     count: 2,\n  }");
    }

    #[test]
    fn transition_without_changes() {
        assert_eq!(
            render_transition(&Action::Increment, &Counter { count: 0 }, &Counter { count: 0 }),
            "received action:\n  Increment\n  (No state changes)\n"
        );
    }

    #[test]
    fn transition_with_changes() {
        let message =
            render_transition(&Action::Increment, &Counter { count: 0 }, &Counter { count: 1 });

        assert!(message.starts_with("received action:\n  Increment\n"));
        assert!(message.contains("+     count: 1,"));
        assert!(!message.contains(NO_STATE_CHANGES));
        assert!(message.ends_with("}\n"));
    }

    #[test]
    fn handle_parts() {
        const HANDLE: LogHandle = LogHandle::new("com.app", "feature");

        assert_eq!(HANDLE.subsystem(), "com.app");
        assert_eq!(HANDLE.category(), "feature");
    }
}
