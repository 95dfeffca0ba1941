//! Behavior State Library
//!
//! This crate provides stack-based state machines for entity behavior.
//!
//! # Overview
//!
//! The fsm module provides:
//!
//! - **State Trait** - Behavioral units with enter/exit/update/input hooks,
//!   all no-ops by default so concrete states implement only what they need.
//!
//! - **Stack Machine** - A registry of named states plus a transition stack.
//!   The top of the stack is the current state; per-frame calls are forwarded
//!   to it. Sibling transitions replace the top, interrupt transitions
//!   push and pop it.
//!
//! - **Lifecycle Events** - Every transition broadcasts entered/exited/
//!   changed/pushed/popped events to subscribed observers, in a fixed order.
//!
//! # Design Principles
//!
//! 1. **The machine validates transitions** - Unknown state names and
//!    popping the last remaining state are rejected with clear errors
//!    before any hook runs.
//!
//! 2. **States request, the machine mutates** - A state never touches the
//!    stack directly; it records a request through its context and the
//!    machine executes it before the frame call returns.
//!
//! 3. **No engine coupling** - This crate is pure state logic. The host
//!    supplies the game loop, the delta times, and the input event type.
//!
//! 4. **Serialization-ready** - Machine snapshots and events can be
//!    converted to JSON for debug overlays and clients.
//!
//! # Example
//!
//! ```rust
//! use behavior_state::fsm::{Fsm, State, StateContext};
//!
//! struct Idle;
//! struct Walk;
//!
//! impl State for Idle {
//!     fn update(&mut self, _delta: f64, ctx: &mut StateContext) {
//!         ctx.change_state("Walk");
//!     }
//! }
//!
//! impl State for Walk {}
//!
//! let mut fsm = Fsm::new(vec![
//!     ("Idle".to_string(), Box::new(Idle) as Box<dyn State>),
//!     ("Walk".to_string(), Box::new(Walk)),
//! ])
//! .unwrap();
//!
//! assert_eq!(fsm.current_state_name(), "idle");
//!
//! fsm.update(0.016).unwrap();
//! assert_eq!(fsm.current_state_name(), "walk");
//! assert_eq!(fsm.stack_depth(), 1);
//! ```

pub mod fsm;

// Re-export everything from fsm module at crate root
pub use fsm::*;
