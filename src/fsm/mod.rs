//! Stack-based state machine module.
//!
//! This module provides the core types for driving entity behavior:
//!
//! - `state` - The `State` trait and the transition-request context
//! - `machine` - The `Fsm` registry/stack container and its errors
//! - `event` - Lifecycle events broadcast to observers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Fsm                                │
//! │                                                              │
//! │  ┌──────────────────┐        ┌─────────────────────────┐     │
//! │  │     registry     │        │          stack          │     │
//! │  │                  │        │                         │     │
//! │  │ name →           │        │  [0] current state name │     │
//! │  │   Box<dyn State> │◀───────│  [1] suspended          │     │
//! │  │                  │ lookup │  [2] suspended          │     │
//! │  └──────────────────┘        └─────────────────────────┘     │
//! │                                                              │
//! │  host ──handle_input/update/update_physics──▶ stack[0]       │
//! │  state ──change/push/pop request──▶ stack mutation           │
//! │  transition ──exited/entered/...──▶ observers                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host drives the machine once per frame phase; the current state can
//! request a transition through its [`StateContext`], and the machine
//! executes it (exit hook, stack mutation, enter hook, event broadcast)
//! before the frame call returns.

pub mod event;
pub mod machine;
pub mod state;

// Re-export commonly used types
pub use event::{FsmEvent, ObserverFn};
pub use machine::{Fsm, FsmError};
pub use state::{State, StateContext, TransitionRequest};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    struct Idle;
    struct Walk;
    struct Jump;

    impl State for Idle {}
    impl State for Walk {}
    impl State for Jump {}

    fn make_fsm() -> Fsm {
        Fsm::new(vec![
            ("Idle".to_string(), Box::new(Idle) as Box<dyn State>),
            ("Walk".to_string(), Box::new(Walk)),
            ("Jump".to_string(), Box::new(Jump)),
        ])
        .unwrap()
    }

    #[test]
    fn test_push_pop_event_order() {
        let mut fsm = make_fsm();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        fsm.subscribe(move |event: &FsmEvent| sink.borrow_mut().push(event.clone()));

        fsm.push_state("Jump").unwrap();
        assert_eq!(fsm.stack_names(), vec!["jump", "idle"]);
        assert_eq!(
            *events.borrow(),
            vec![
                FsmEvent::Exited {
                    state: "idle".to_string()
                },
                FsmEvent::Entered {
                    state: "jump".to_string()
                },
                FsmEvent::Pushed {
                    state: "jump".to_string()
                },
            ]
        );

        events.borrow_mut().clear();
        fsm.pop_state().unwrap();
        assert_eq!(fsm.stack_names(), vec!["idle"]);
        assert_eq!(
            *events.borrow(),
            vec![
                FsmEvent::Exited {
                    state: "jump".to_string()
                },
                FsmEvent::Entered {
                    state: "idle".to_string()
                },
                FsmEvent::Popped,
            ]
        );
    }

    #[test]
    fn test_change_event_order() {
        let mut fsm = make_fsm();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        fsm.subscribe(move |event: &FsmEvent| sink.borrow_mut().push(event.clone()));

        fsm.change_state("Walk").unwrap();
        assert_eq!(fsm.stack_depth(), 1);
        assert_eq!(
            *events.borrow(),
            vec![
                FsmEvent::Exited {
                    state: "idle".to_string()
                },
                FsmEvent::Entered {
                    state: "walk".to_string()
                },
                FsmEvent::Changed {
                    state: "walk".to_string()
                },
            ]
        );
    }
}
