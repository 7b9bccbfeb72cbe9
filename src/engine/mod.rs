//! The flow engine: builder operations, transition application, and
//! callback dispatch.

use crate::callbacks::{
    CallbackBinding, ErasedHandler, ErasedHook, FlowCallbacks, HookKind, ProviderSpec,
    ProviderToken,
};
use crate::core::{FlowError, Transition, TransitionHistory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// A provider identity together with its optionally bound handler.
struct ProviderEntry {
    token: ProviderToken,
    instance: Option<ErasedHandler>,
}

#[derive(Default)]
struct EngineInner {
    states: Vec<String>,
    transitions: Vec<Transition>,
    current: Option<String>,
    history: TransitionHistory,
    providers: Vec<ProviderEntry>,
    bindings: HashMap<String, Vec<CallbackBinding>>,
}

impl EngineInner {
    fn is_valid_for_transitions(&self) -> bool {
        self.current.is_some() && !self.states.is_empty() && !self.transitions.is_empty()
    }

    fn has_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s == name)
    }
}

/// A named state machine with an undoable transition history.
///
/// Configure via the builder calls (states, then transitions, then the
/// initial state, then callback providers), drive via
/// [`apply_transition`](Self::apply_transition) /
/// [`move_to`](Self::move_to), and undo via
/// [`move_to_previous`](Self::move_to_previous). Builder and transition
/// methods return the engine for chaining.
///
/// # Concurrency
///
/// Every state-mutating call is atomic under one coarse per-engine lock,
/// and that lock is held while callbacks run. Callbacks must be fast,
/// non-blocking, and must not call back into the same engine.
///
/// # Example
///
/// ```rust
/// use flowstate::engine::FlowEngine;
///
/// # fn main() -> Result<(), flowstate::core::FlowError> {
/// let engine = FlowEngine::new("checkout");
/// engine.add_state("cart").add_state("payment").add_state("done");
/// engine
///     .add_transition("cart", "payment")?
///     .add_transition("payment", "done")?
///     .set_initial_state("cart")?;
///
/// engine.move_to("payment")?.move_to("done")?;
/// assert_eq!(engine.current_state().as_deref(), Some("done"));
///
/// engine.move_to_previous()?;
/// assert_eq!(engine.current_state().as_deref(), Some("payment"));
/// # Ok(())
/// # }
/// ```
pub struct FlowEngine {
    identifier: String,
    inner: Mutex<EngineInner>,
}

impl std::fmt::Debug for FlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("FlowEngine");
        dbg.field("identifier", &self.identifier);
        match self.inner.try_lock() {
            Some(inner) => {
                dbg.field("current", &inner.current);
                dbg.field("states", &inner.states);
            }
            None => {
                dbg.field("inner", &"<locked>");
            }
        }
        dbg.finish()
    }
}

impl FlowEngine {
    /// Create an empty, unconfigured engine under `identifier`.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            inner: Mutex::new(EngineInner::default()),
        }
    }

    /// The identifier this engine was created under.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Append a state. Duplicates are logged no-ops; never fails.
    pub fn add_state(&self, name: &str) -> &Self {
        let mut inner = self.inner.lock();
        if inner.has_state(name) {
            debug!(flow = %self.identifier, state = name, "duplicate state not added");
        } else {
            inner.states.push(name.to_string());
        }
        self
    }

    /// Append a transition between two previously added states.
    ///
    /// Fails with [`FlowError::NotInitialized`] when no states exist yet
    /// or either endpoint is unknown. Duplicates are logged no-ops.
    pub fn add_transition(&self, from: &str, to: &str) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if inner.states.is_empty() || !inner.has_state(from) || !inner.has_state(to) {
            return Err(FlowError::NotInitialized);
        }

        let transition = Transition::new(from, to);
        if inner.transitions.contains(&transition) {
            debug!(flow = %self.identifier, transition = %transition, "duplicate transition not added");
        } else {
            inner.transitions.push(transition);
        }
        Ok(self)
    }

    /// Set the current state directly, without a transition.
    ///
    /// Fails with [`FlowError::NotInitialized`] when no states exist and
    /// [`FlowError::InvalidState`] when `name` is unknown. Expected to be
    /// called once, before any transition is applied; the engine does not
    /// enforce that, and the call never clears history.
    pub fn set_initial_state(&self, name: &str) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if inner.states.is_empty() {
            return Err(FlowError::NotInitialized);
        }
        if !inner.has_state(name) {
            return Err(FlowError::InvalidState {
                name: name.to_string(),
            });
        }
        inner.current = Some(name.to_string());
        Ok(self)
    }

    /// Replace the callback-provider set and rebuild the state bindings.
    ///
    /// All providers start unbound; attach live handlers afterwards with
    /// [`register`](Self::register). Fails with
    /// [`FlowError::NotInitialized`] unless states, transitions, and a
    /// current state are all established. Within one provider's table, a
    /// second same-kind declaration for the same state wins over the
    /// first; the conflict is logged, not raised.
    pub fn set_callback_providers(&self, specs: Vec<ProviderSpec>) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if !inner.is_valid_for_transitions() {
            return Err(FlowError::NotInitialized);
        }

        inner.providers = specs
            .iter()
            .map(|spec| ProviderEntry {
                token: spec.token,
                instance: None,
            })
            .collect();

        let mut bindings: HashMap<String, Vec<CallbackBinding>> = HashMap::new();
        for state in &inner.states {
            let mut state_bindings = Vec::new();
            for spec in &specs {
                let mut binding = CallbackBinding::new(spec.token);
                for raw in spec.entries.iter().filter(|raw| raw.state == *state) {
                    match raw.kind {
                        HookKind::Enter => {
                            if binding.on_enter.is_some() {
                                warn!(
                                    flow = %self.identifier,
                                    provider = spec.provider(),
                                    state = %state,
                                    "enter hook already declared, overwriting"
                                );
                            }
                            binding.on_enter = Some(raw.hook.clone());
                        }
                        HookKind::Exit => {
                            if binding.on_exit.is_some() {
                                warn!(
                                    flow = %self.identifier,
                                    provider = spec.provider(),
                                    state = %state,
                                    "exit hook already declared, overwriting"
                                );
                            }
                            binding.on_exit = Some(raw.hook.clone());
                        }
                    }
                }
                if binding.has_enter() || binding.has_exit() {
                    state_bindings.push(binding);
                }
            }
            if !state_bindings.is_empty() {
                bindings.insert(state.clone(), state_bindings);
            }
        }
        inner.bindings = bindings;
        Ok(self)
    }

    /// Bind a live handler instance for provider type `T`.
    ///
    /// The instance becomes the dispatch target for every binding `T`
    /// contributed, across all states. Registering a type outside the
    /// provider set is a logged no-op. The returned token is the key for
    /// [`unregister`](Self::unregister).
    pub fn register<T: FlowCallbacks>(&self, handler: &Arc<Mutex<T>>) -> ProviderToken {
        let token = ProviderToken::of::<T>();
        let erased: ErasedHandler = handler.clone();

        let mut inner = self.inner.lock();
        let matched = match inner
            .providers
            .iter_mut()
            .find(|entry| entry.token.type_id == token.type_id)
        {
            Some(entry) => {
                entry.instance = Some(erased.clone());
                true
            }
            None => false,
        };

        if matched {
            for state_bindings in inner.bindings.values_mut() {
                for binding in state_bindings
                    .iter_mut()
                    .filter(|binding| binding.token.type_id == token.type_id)
                {
                    binding.instance = Some(erased.clone());
                }
            }
        } else {
            debug!(
                flow = %self.identifier,
                provider = token.provider(),
                "register ignored: type is not in the provider set"
            );
        }
        token
    }

    /// Unbind the handler instance registered for `token`'s provider.
    ///
    /// A token whose provider was never configured or bound is a logged
    /// no-op.
    pub fn unregister(&self, token: ProviderToken) {
        let mut inner = self.inner.lock();
        let matched = match inner
            .providers
            .iter_mut()
            .find(|entry| entry.token.type_id == token.type_id)
        {
            Some(entry) => {
                entry.instance = None;
                true
            }
            None => false,
        };

        if matched {
            for state_bindings in inner.bindings.values_mut() {
                for binding in state_bindings
                    .iter_mut()
                    .filter(|binding| binding.token.type_id == token.type_id)
                {
                    binding.instance = None;
                }
            }
        } else {
            debug!(
                flow = %self.identifier,
                provider = token.provider(),
                "unregister ignored: type is not in the provider set"
            );
        }
    }

    /// Apply the transition with the given canonical name.
    ///
    /// Fails with [`FlowError::NotInitialized`] unless the engine is
    /// valid for transitions; with [`FlowError::InvalidTransition`] when
    /// the named transition exists but does not leave the current state,
    /// or when no transition has that name at all.
    pub fn apply_transition(&self, name: &str) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if !inner.is_valid_for_transitions() {
            return Err(FlowError::NotInitialized);
        }

        let current = inner.current.clone().unwrap_or_default();
        match inner
            .transitions
            .iter()
            .find(|transition| transition.name() == name)
            .cloned()
        {
            Some(transition) if transition.from() == current => {
                Self::apply(&mut inner, transition);
                Ok(self)
            }
            Some(transition) => Err(FlowError::InvalidTransition {
                current,
                attempted: Some(transition),
            }),
            None => Err(FlowError::InvalidTransition {
                current,
                attempted: None,
            }),
        }
    }

    /// Move to `target` using a registered transition from the current
    /// state.
    ///
    /// Fails with [`FlowError::NotInitialized`] unless the engine is
    /// valid for transitions; with [`FlowError::InvalidTransition`] when
    /// no transition from the current state reaches `target`. The error's
    /// attempted transition is synthesized from `(current, target)` for
    /// diagnostics and never corresponds to a registered edge.
    pub fn move_to(&self, target: &str) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if !inner.is_valid_for_transitions() {
            return Err(FlowError::NotInitialized);
        }

        let current = inner.current.clone().unwrap_or_default();
        match inner
            .transitions
            .iter()
            .find(|transition| transition.from() == current && transition.to() == target)
            .cloned()
        {
            Some(transition) => {
                Self::apply(&mut inner, transition);
                Ok(self)
            }
            None => Err(FlowError::InvalidTransition {
                current: current.clone(),
                attempted: Some(Transition::new(current, target)),
            }),
        }
    }

    /// Undo the most recent transition.
    ///
    /// Pops the top history record, restores its `from` state, and runs
    /// reverse dispatch. Fails with [`FlowError::NotInitialized`] unless
    /// the engine is valid for transitions and with
    /// [`FlowError::NoHistory`] when the stack is empty.
    pub fn move_to_previous(&self) -> Result<&Self, FlowError> {
        let mut inner = self.inner.lock();
        if !inner.is_valid_for_transitions() {
            return Err(FlowError::NotInitialized);
        }
        if inner.history.is_empty() {
            return Err(FlowError::NoHistory);
        }

        // The NoHistory guard above makes an empty pop unreachable; treat
        // it as a no-op all the same.
        if let Some(record) = inner.history.pop() {
            inner.current = Some(record.transition.from().to_string());
            Self::dispatch(&inner, &record.transition, true);
        }
        Ok(self)
    }

    /// Shared effect of a successful forward match: commit the new state,
    /// dispatch, then record the move.
    fn apply(inner: &mut EngineInner, transition: Transition) {
        inner.current = Some(transition.to().to_string());
        Self::dispatch(inner, &transition, false);
        inner.history.push(transition);
    }

    /// Resolve and invoke callbacks for `transition`.
    ///
    /// Forward: `from`'s exit hooks and `to`'s enter hooks. Reverse: the
    /// roles invert, so leaving `from` during an undo re-enters it and
    /// the undone `to` state is re-exited. Every bound candidate across
    /// all providers fires; all exits run before all enters.
    fn dispatch(inner: &EngineInner, transition: &Transition, reverse: bool) {
        let mut exits: Vec<(ErasedHook, ErasedHandler, &'static str)> = Vec::new();
        let mut enters: Vec<(ErasedHook, ErasedHandler, &'static str)> = Vec::new();

        let mut collect = |state: &str, want_enter: bool, out: &mut Vec<_>| {
            let Some(state_bindings) = inner.bindings.get(state) else {
                return;
            };
            for binding in state_bindings {
                let hook = if want_enter {
                    &binding.on_enter
                } else {
                    &binding.on_exit
                };
                let Some(hook) = hook else { continue };
                match &binding.instance {
                    Some(instance) => {
                        out.push((hook.clone(), instance.clone(), binding.provider()));
                    }
                    None => {
                        trace!(
                            provider = binding.provider(),
                            state,
                            "callback skipped: no handler registered"
                        );
                    }
                }
            }
        };

        // On reverse, leaving `from` is modeled as re-entering it and the
        // undone `to` state is re-exited.
        collect(transition.from(), reverse, if reverse { &mut enters } else { &mut exits });
        collect(transition.to(), !reverse, if reverse { &mut exits } else { &mut enters });

        for (hook, instance, provider) in exits.iter().chain(enters.iter()) {
            Self::invoke(hook, instance, provider, transition);
        }
    }

    /// Invoke one callback, isolating panics from the transition caller.
    fn invoke(
        hook: &ErasedHook,
        instance: &ErasedHandler,
        provider: &'static str,
        transition: &Transition,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = instance.lock();
            hook(&mut *guard);
        }));
        if outcome.is_err() {
            error!(provider, transition = %transition, "callback panicked during dispatch");
        }
    }

    /// State names in insertion order.
    pub fn states(&self) -> Vec<String> {
        self.inner.lock().states.clone()
    }

    /// Registered transitions in insertion order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.inner.lock().transitions.clone()
    }

    /// The current state, or `None` before an initial state is set.
    pub fn current_state(&self) -> Option<String> {
        self.inner.lock().current.clone()
    }

    /// A copy of the undo history, most recent entry last.
    pub fn history(&self) -> TransitionHistory {
        self.inner.lock().history.clone()
    }

    /// Names of the configured callback-provider types.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .providers
            .iter()
            .map(|entry| entry.token.provider())
            .collect()
    }

    /// Bindings contributed for `state`, for diagnostics and tests.
    pub fn bindings_for(&self, state: &str) -> Vec<CallbackBinding> {
        self.inner
            .lock()
            .bindings
            .get(state)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn replace_configuration(
        &self,
        states: Vec<String>,
        transitions: Vec<Transition>,
        current: Option<String>,
        history: TransitionHistory,
    ) {
        let mut inner = self.inner.lock();
        inner.states = states;
        inner.transitions = transitions;
        inner.current = current;
        inner.history = history;
    }
}
