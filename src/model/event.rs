//! Event: one recorded causal step.

use super::{Driver, NonEmpty};

/// One recorded causal step: which drivers were active, which one caused
/// the step, what effect resulted, and the contextual state at that point.
///
/// An event cannot exist without at least one driver; [`Event::new`] is the
/// only way to build one. `cause` is not required to be a member of
/// `drivers`: no referential check is made, and callers must not assume
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub drivers: NonEmpty<Driver>,
    pub cause: Driver,
    pub effect: String,
    pub context: String,
    pub pending_effect_edit: Option<String>,
}

impl Event {
    /// Builds an event from raw wire-shaped parts.
    ///
    /// Returns `None` when `drivers` is empty. An empty `pending_effect_edit`
    /// is the wire sentinel for "no pending edit" and collapses to `None`
    /// here, at construction time.
    pub fn new(
        drivers: Vec<Driver>,
        cause: Driver,
        effect: impl Into<String>,
        context: impl Into<String>,
        pending_effect_edit: impl Into<String>,
    ) -> Option<Self> {
        let edit = pending_effect_edit.into();
        Some(Self {
            drivers: NonEmpty::new(drivers)?,
            cause,
            effect: effect.into(),
            context: context.into(),
            pending_effect_edit: if edit.is_empty() { None } else { Some(edit) },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_driver() -> Driver {
        Driver::new("a-label", "a-action", "a-id")
    }

    #[test]
    fn rejects_zero_drivers() {
        let event = Event::new(vec![], sample_driver(), "effect", "context", "");
        assert_eq!(event, None);
    }

    #[test]
    fn empty_pending_edit_is_absent() {
        let event = Event::new(
            vec![sample_driver()],
            sample_driver(),
            "effect",
            "context",
            "",
        )
        .unwrap();
        assert_eq!(event.pending_effect_edit, None);
    }

    #[test]
    fn nonempty_pending_edit_is_present() {
        let event = Event::new(
            vec![sample_driver()],
            sample_driver(),
            "effect",
            "context",
            "pendingEffectEdit",
        )
        .unwrap();
        assert_eq!(
            event.pending_effect_edit.as_deref(),
            Some("pendingEffectEdit")
        );
    }

    #[test]
    fn cause_membership_is_not_validated() {
        let outsider = Driver::new("b-label", "", "b-id");
        let event = Event::new(
            vec![sample_driver()],
            outsider.clone(),
            "effect",
            "context",
            "",
        )
        .unwrap();
        assert_eq!(event.cause, outsider);
    }
}
