//! Driver: a named input source and the action it most recently triggered.

/// A named input with the action it most recently triggered.
///
/// A faithful mirror of the wire format: `action == ""` is the wire's
/// sentinel for "no action". [`Driver::triggered_action`] exposes the
/// normalized form; display code must go through it rather than branch on
/// string emptiness itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    pub label: String,
    pub action: String,
    pub id: String,
}

impl Driver {
    pub fn new(
        label: impl Into<String>,
        action: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            id: id.into(),
        }
    }

    /// The triggered action, with the empty-string sentinel collapsed to `None`.
    pub fn triggered_action(&self) -> Option<&str> {
        if self.action.is_empty() {
            None
        } else {
            Some(&self.action)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_action_is_absent() {
        let driver = Driver::new("a-label", "", "a-id");
        assert_eq!(driver.triggered_action(), None);
    }

    #[test]
    fn nonempty_action_is_present() {
        let driver = Driver::new("a-label", "a-action", "a-id");
        assert_eq!(driver.triggered_action(), Some("a-action"));
    }
}
