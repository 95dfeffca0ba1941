//! Lifecycle events broadcast by the machine.
//!
//! Observers subscribe to the machine and receive every event synchronously,
//! after the transition that produced it has fully completed. Per
//! transition the order is fixed: exited, entered, then the
//! changed/pushed/popped marker.

use std::fmt;
use std::rc::Rc;

/// Observer callback. Machines are single-threaded, so observers are plain
/// `Rc` closures.
pub type ObserverFn = Rc<dyn Fn(&FsmEvent)>;

/// A lifecycle notification. State names are in registry (lowercase) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsmEvent {
    /// A state became current.
    Entered { state: String },

    /// A state stopped being current.
    Exited { state: String },

    /// The top of the stack was replaced by `state`.
    Changed { state: String },

    /// `state` was pushed onto the stack.
    Pushed { state: String },

    /// The top of the stack was popped.
    Popped,
}

impl FsmEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Entered { .. } => "entered",
            Self::Exited { .. } => "exited",
            Self::Changed { .. } => "changed",
            Self::Pushed { .. } => "pushed",
            Self::Popped => "popped",
        }
    }

    /// The state the event refers to, if any.
    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::Entered { state }
            | Self::Exited { state }
            | Self::Changed { state }
            | Self::Pushed { state } => Some(state),
            Self::Popped => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self.state_name() {
            Some(state) => serde_json::json!({
                "kind": self.kind(),
                "state": state,
            }),
            None => serde_json::json!({
                "kind": self.kind(),
            }),
        }
    }
}

impl fmt::Display for FsmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state_name() {
            Some(state) => write!(f, "{}({})", self.kind(), state),
            None => write!(f, "{}", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_kind_and_state_name() {
        let entered = FsmEvent::Entered {
            state: "walk".to_string(),
        };
        assert_eq!(entered.kind(), "entered");
        assert_eq!(entered.state_name(), Some("walk"));

        assert_eq!(FsmEvent::Popped.kind(), "popped");
        assert_eq!(FsmEvent::Popped.state_name(), None);
    }

    #[test]
    fn test_display() {
        let changed = FsmEvent::Changed {
            state: "run".to_string(),
        };
        assert_eq!(format!("{}", changed), "changed(run)");
        assert_eq!(format!("{}", FsmEvent::Popped), "popped");
    }

    #[test]
    fn test_to_json() {
        let pushed = FsmEvent::Pushed {
            state: "jump".to_string(),
        };
        assert_eq!(
            pushed.to_json(),
            serde_json::json!({"kind": "pushed", "state": "jump"})
        );
        assert_eq!(
            FsmEvent::Popped.to_json(),
            serde_json::json!({"kind": "popped"})
        );
    }
}
