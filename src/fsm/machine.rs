//! The state machine container.
//!
//! An [`Fsm`] owns a registry of named states and a transition stack of
//! registry keys. Index 0 of the stack is the current state; every frame
//! call is forwarded to it. The registry is fixed at construction; the
//! stack is mutated only by the three transition operations.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::event::{FsmEvent, ObserverFn};
use super::state::{State, StateContext, TransitionRequest};

/// Error from machine construction or a transition operation.
///
/// All variants are programmer errors (misconfiguration or buggy state
/// logic). They are reported immediately and never recovered from; a failed
/// transition leaves the stack exactly as it was, with no hooks invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsmError {
    /// Construction was given zero states; the machine would have no
    /// dispatch target.
    NoStates,

    /// Two supplied states share a name (after case normalization).
    DuplicateState { name: String },

    /// A transition named a state that is not in the registry.
    UnknownState { name: String },

    /// A pop was attempted with only one state on the stack.
    StackUnderflow,
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStates => write!(f, "Cannot configure a machine with no states"),
            Self::DuplicateState { name } => {
                write!(f, "State '{}' is registered more than once", name)
            }
            Self::UnknownState { name } => write!(f, "No state named '{}' is registered", name),
            Self::StackUnderflow => write!(f, "Cannot pop the last remaining state"),
        }
    }
}

impl std::error::Error for FsmError {}

/// Registry keys are case-normalized so name lookups are case-insensitive.
fn canonical(name: &str) -> String {
    name.to_lowercase()
}

/// Stack-based state machine for one entity.
///
/// `E` is the host's input-event type. The host drives the machine once per
/// frame phase through [`handle_input`](Fsm::handle_input),
/// [`update`](Fsm::update), and [`update_physics`](Fsm::update_physics);
/// states request transitions through their [`StateContext`] and the
/// machine executes them before the frame call returns.
///
/// Single-threaded: all hooks, transitions, and observer notifications
/// run synchronously on the caller's thread.
pub struct Fsm<E = ()> {
    /// Named states, keyed by normalized name. Fixed after construction.
    registry: HashMap<String, Box<dyn State<E>>>,

    /// Transition stack of registry keys. Index 0 is the current state.
    /// Never empty; pushing does not remove a state from the registry, so
    /// the same name may appear more than once.
    stack: Vec<String>,

    /// Subscribed lifecycle observers, notified in subscription order.
    observers: Vec<ObserverFn>,

    /// When the current state last became current.
    entered_at: chrono::DateTime<chrono::Utc>,
}

impl<E> Fsm<E> {
    /// Build a machine from an ordered list of `(name, state)` pairs.
    ///
    /// The first pair is the initial state: the stack starts with exactly
    /// that entry and its `enter` hook runs once before `new` returns.
    /// Construction is the one-time configuration phase; states cannot be
    /// added afterwards.
    pub fn new(states: Vec<(String, Box<dyn State<E>>)>) -> Result<Self, FsmError> {
        if states.is_empty() {
            return Err(FsmError::NoStates);
        }

        let initial = canonical(&states[0].0);
        let mut registry: HashMap<String, Box<dyn State<E>>> =
            HashMap::with_capacity(states.len());
        for (name, state) in states {
            let key = canonical(&name);
            if registry.insert(key.clone(), state).is_some() {
                return Err(FsmError::DuplicateState { name: key });
            }
        }

        let mut fsm = Self {
            registry,
            stack: vec![initial.clone()],
            observers: Vec::new(),
            entered_at: chrono::Utc::now(),
        };
        tracing::debug!(initial = %initial, states = fsm.registry.len(), "machine configured");

        let mut ctx = StateContext::new();
        fsm.run_enter(&initial, &mut ctx);
        fsm.drain(ctx)?;
        Ok(fsm)
    }

    /// Forward an input event to the current state.
    pub fn handle_input(&mut self, event: &E) -> Result<(), FsmError> {
        let current = self.stack[0].clone();
        tracing::trace!(state = %current, "handle_input");
        let mut ctx = StateContext::new();
        if let Some(state) = self.registry.get_mut(&current) {
            state.handle_input(event, &mut ctx);
        }
        self.drain(ctx)
    }

    /// Forward a logic-frame tick to the current state.
    pub fn update(&mut self, delta: f64) -> Result<(), FsmError> {
        let current = self.stack[0].clone();
        tracing::trace!(state = %current, delta, "update");
        let mut ctx = StateContext::new();
        if let Some(state) = self.registry.get_mut(&current) {
            state.update(delta, &mut ctx);
        }
        self.drain(ctx)
    }

    /// Forward a physics-frame tick to the current state.
    pub fn update_physics(&mut self, delta: f64) -> Result<(), FsmError> {
        let current = self.stack[0].clone();
        tracing::trace!(state = %current, delta, "update_physics");
        let mut ctx = StateContext::new();
        if let Some(state) = self.registry.get_mut(&current) {
            state.update_physics(delta, &mut ctx);
        }
        self.drain(ctx)
    }

    /// Replace the current state with the named one. Stack depth is
    /// unchanged - this is the sibling transition (Idle ↔ Walk ↔ Run).
    ///
    /// Runs the old state's `exit`, then the new state's `enter`, then
    /// broadcasts exited/entered/changed. Changing to the current state is
    /// allowed and still runs both hooks on the same instance.
    pub fn change_state(&mut self, name: &str) -> Result<(), FsmError> {
        let mut ctx = StateContext::new();
        self.execute_change(name, &mut ctx)?;
        self.drain(ctx)
    }

    /// Suspend the current state and make the named one current. Pair with
    /// [`pop_state`](Fsm::pop_state) for interrupt-and-resume transitions
    /// (Jump pushed over Walk, popped back to Walk on landing). The machine
    /// does not enforce pairing.
    pub fn push_state(&mut self, name: &str) -> Result<(), FsmError> {
        let mut ctx = StateContext::new();
        self.execute_push(name, &mut ctx)?;
        self.drain(ctx)
    }

    /// Discard the current state and resume the one beneath it.
    ///
    /// The last remaining state can never be popped; that fails with
    /// [`FsmError::StackUnderflow`] and leaves the stack untouched. The
    /// failure is reported, never silently clamped.
    pub fn pop_state(&mut self) -> Result<(), FsmError> {
        let mut ctx = StateContext::new();
        self.execute_pop(&mut ctx)?;
        self.drain(ctx)
    }

    /// Subscribe an observer to lifecycle events. Observers are invoked
    /// synchronously, in subscription order, after each transition has
    /// fully completed.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&FsmEvent) + 'static,
    {
        self.observers.push(Rc::new(observer));
    }

    /// Name of the current state, in registry (lowercase) form.
    pub fn current_state_name(&self) -> &str {
        &self.stack[0]
    }

    /// Check whether the named state is current (case-insensitive).
    pub fn is_current(&self, name: &str) -> bool {
        self.stack[0] == canonical(name)
    }

    /// Number of states on the stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Names on the stack, current state first.
    pub fn stack_names(&self) -> Vec<&str> {
        self.stack.iter().map(String::as_str).collect()
    }

    /// Check whether a state is registered (case-insensitive).
    pub fn contains_state(&self, name: &str) -> bool {
        self.registry.contains_key(&canonical(name))
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.registry.len()
    }

    /// When the current state last became current.
    pub fn entered_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.entered_at
    }

    /// How long the current state has been current.
    pub fn time_in_state(&self) -> chrono::Duration {
        chrono::Utc::now() - self.entered_at
    }

    /// Serialization-ready snapshot of the machine for debug overlays.
    pub fn to_json(&self) -> serde_json::Value {
        let mut states: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        states.sort_unstable();

        serde_json::json!({
            "current": self.current_state_name(),
            "stack": self.stack_names(),
            "states": states,
            "entered_at": self.entered_at.to_rfc3339(),
        })
    }

    /// Resolve a name to its registry key, without touching the stack.
    fn lookup(&self, name: &str) -> Result<String, FsmError> {
        let key = canonical(name);
        if self.registry.contains_key(&key) {
            Ok(key)
        } else {
            Err(FsmError::UnknownState {
                name: name.to_string(),
            })
        }
    }

    fn execute_change(&mut self, name: &str, ctx: &mut StateContext) -> Result<(), FsmError> {
        let key = self.lookup(name)?;
        let old = self.stack[0].clone();

        self.run_exit(&old, ctx);
        self.stack[0] = key.clone();
        self.entered_at = chrono::Utc::now();
        self.run_enter(&key, ctx);
        tracing::debug!(from = %old, to = %key, "state changed");

        self.broadcast(&FsmEvent::Exited { state: old });
        self.broadcast(&FsmEvent::Entered { state: key.clone() });
        self.broadcast(&FsmEvent::Changed { state: key });
        Ok(())
    }

    fn execute_push(&mut self, name: &str, ctx: &mut StateContext) -> Result<(), FsmError> {
        let key = self.lookup(name)?;
        let old = self.stack[0].clone();

        self.run_exit(&old, ctx);
        self.stack.insert(0, key.clone());
        self.entered_at = chrono::Utc::now();
        self.run_enter(&key, ctx);
        tracing::debug!(from = %old, to = %key, depth = self.stack.len(), "state pushed");

        self.broadcast(&FsmEvent::Exited { state: old });
        self.broadcast(&FsmEvent::Entered { state: key.clone() });
        self.broadcast(&FsmEvent::Pushed { state: key });
        Ok(())
    }

    fn execute_pop(&mut self, ctx: &mut StateContext) -> Result<(), FsmError> {
        if self.stack.len() <= 1 {
            return Err(FsmError::StackUnderflow);
        }
        let removed = self.stack[0].clone();

        self.run_exit(&removed, ctx);
        self.stack.remove(0);
        let resumed = self.stack[0].clone();
        self.entered_at = chrono::Utc::now();
        self.run_enter(&resumed, ctx);
        tracing::debug!(from = %removed, to = %resumed, depth = self.stack.len(), "state popped");

        self.broadcast(&FsmEvent::Exited { state: removed });
        self.broadcast(&FsmEvent::Entered { state: resumed });
        self.broadcast(&FsmEvent::Popped);
        Ok(())
    }

    /// Execute recorded requests in FIFO order. Hooks that run while a
    /// request executes may record further requests; each one is a full,
    /// individually atomic transition. The first failure stops the chain
    /// and surfaces to the public caller.
    fn drain(&mut self, mut ctx: StateContext) -> Result<(), FsmError> {
        while let Some(request) = ctx.pop_request() {
            match request {
                TransitionRequest::Change { state } => self.execute_change(&state, &mut ctx)?,
                TransitionRequest::Push { state } => self.execute_push(&state, &mut ctx)?,
                TransitionRequest::Pop => self.execute_pop(&mut ctx)?,
            }
        }
        Ok(())
    }

    fn run_enter(&mut self, key: &str, ctx: &mut StateContext) {
        if let Some(state) = self.registry.get_mut(key) {
            state.enter(ctx);
        }
    }

    fn run_exit(&mut self, key: &str, ctx: &mut StateContext) {
        if let Some(state) = self.registry.get_mut(key) {
            state.exit(ctx);
        }
    }

    fn broadcast(&self, event: &FsmEvent) {
        // Observers subscribed mid-broadcast are not notified for the
        // in-flight event.
        for observer in self.observers.clone() {
            observer(event);
        }
    }
}
