//! State behavior contract.
//!
//! A state is one behavioral unit (Idle, Walk, Jump). The machine calls its
//! hooks; the state asks for transitions through [`StateContext`] rather
//! than mutating the stack itself, so its transition logic can be tested by
//! asserting what it requested.

use std::fmt;

/// A transition requested by a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRequest {
    /// Replace the current state with the named one.
    Change { state: String },

    /// Suspend the current state and make the named one current.
    Push { state: String },

    /// Discard the current state and resume the one beneath it.
    Pop,
}

impl TransitionRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Change { .. } => "change",
            Self::Push { .. } => "push",
            Self::Pop => "pop",
        }
    }

    /// Target state name, if the request carries one.
    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::Change { state } | Self::Push { state } => Some(state),
            Self::Pop => None,
        }
    }
}

impl fmt::Display for TransitionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state_name() {
            Some(state) => write!(f, "{}({})", self.as_str(), state),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// Transition-request conduit handed to every state hook.
///
/// Requests are recorded in call order and executed by the machine after the
/// hook returns. Names are looked up case-insensitively; an unknown name is
/// reported when the request is executed, not when it is recorded.
#[derive(Debug, Default)]
pub struct StateContext {
    requests: Vec<TransitionRequest>,
}

impl StateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the machine to replace the current state with `state`.
    pub fn change_state(&mut self, state: &str) {
        self.requests.push(TransitionRequest::Change {
            state: state.to_string(),
        });
    }

    /// Ask the machine to push `state` on top of the current one.
    pub fn push_state(&mut self, state: &str) {
        self.requests.push(TransitionRequest::Push {
            state: state.to_string(),
        });
    }

    /// Ask the machine to pop the current state.
    pub fn pop_state(&mut self) {
        self.requests.push(TransitionRequest::Pop);
    }

    /// Requests recorded so far, in call order.
    pub fn requests(&self) -> &[TransitionRequest] {
        &self.requests
    }

    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Remove and return the oldest pending request.
    pub(crate) fn pop_request(&mut self) -> Option<TransitionRequest> {
        if self.requests.is_empty() {
            None
        } else {
            Some(self.requests.remove(0))
        }
    }
}

/// One behavioral unit owned by a machine.
///
/// `E` is the host's input-event type. All hooks are no-ops by default;
/// concrete states override only what they need. The same instance is
/// reused every time its state becomes current - it is registered once and
/// never recreated per transition.
pub trait State<E = ()> {
    /// Called once when this state becomes current, before any processing.
    fn enter(&mut self, _ctx: &mut StateContext) {}

    /// Called once when this state stops being current, after all processing.
    fn exit(&mut self, _ctx: &mut StateContext) {}

    /// Called for each input event while this state is current.
    fn handle_input(&mut self, _event: &E, _ctx: &mut StateContext) {}

    /// Called once per logic frame while this state is current.
    fn update(&mut self, _delta: f64, _ctx: &mut StateContext) {}

    /// Called once per physics frame while this state is current.
    fn update_physics(&mut self, _delta: f64, _ctx: &mut StateContext) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Falling {
        landed: bool,
    }

    impl State for Falling {
        fn update(&mut self, _delta: f64, ctx: &mut StateContext) {
            if self.landed {
                ctx.pop_state();
            }
        }
    }

    #[test]
    fn test_context_records_requests() {
        let mut ctx = StateContext::new();
        assert!(!ctx.has_requests());

        ctx.change_state("Walk");
        ctx.push_state("Jump");
        ctx.pop_state();

        assert_eq!(
            ctx.requests(),
            &[
                TransitionRequest::Change {
                    state: "Walk".to_string()
                },
                TransitionRequest::Push {
                    state: "Jump".to_string()
                },
                TransitionRequest::Pop,
            ]
        );
    }

    #[test]
    fn test_pop_request_is_fifo() {
        let mut ctx = StateContext::new();
        ctx.change_state("Walk");
        ctx.pop_state();

        assert_eq!(
            ctx.pop_request(),
            Some(TransitionRequest::Change {
                state: "Walk".to_string()
            })
        );
        assert_eq!(ctx.pop_request(), Some(TransitionRequest::Pop));
        assert_eq!(ctx.pop_request(), None);
    }

    #[test]
    fn test_state_requests_are_observable() {
        // Transition logic is testable without a machine: drive the hook
        // directly and assert what it asked for.
        let mut falling = Falling { landed: false };
        let mut ctx = StateContext::new();

        falling.update(0.016, &mut ctx);
        assert!(!ctx.has_requests());

        falling.landed = true;
        falling.update(0.016, &mut ctx);
        assert_eq!(ctx.requests(), &[TransitionRequest::Pop]);
    }

    #[test]
    fn test_default_hooks_are_noops() {
        struct Inert;
        impl State for Inert {}

        let mut state = Inert;
        let mut ctx = StateContext::new();

        state.enter(&mut ctx);
        state.handle_input(&(), &mut ctx);
        state.update(0.016, &mut ctx);
        state.update_physics(0.016, &mut ctx);
        state.exit(&mut ctx);

        assert!(!ctx.has_requests());
    }

    #[test]
    fn test_request_display() {
        let request = TransitionRequest::Push {
            state: "jump".to_string(),
        };
        assert_eq!(request.as_str(), "push");
        assert_eq!(request.state_name(), Some("jump"));
        assert_eq!(format!("{}", request), "push(jump)");
        assert_eq!(format!("{}", TransitionRequest::Pop), "pop");
    }
}
