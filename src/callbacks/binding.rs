//! Type-erased provider descriptions and per-state bindings.
//!
//! [`ProviderSpec`] carries a provider type's declaration table with the
//! concrete type erased, so the engine can store heterogeneous providers
//! side by side. [`CallbackBinding`] is the per-state record the engine
//! builds from those specs; [`ProviderToken`] is the handle `register`
//! hands back for later unregistration.

use super::table::{FlowCallbacks, HookKind};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Erased hook: downcasts the handler and calls the declared method.
pub(crate) type ErasedHook = Arc<dyn Fn(&mut (dyn Any + Send)) + Send + Sync>;

/// Erased live handler instance, shared with the registering caller.
pub(crate) type ErasedHandler = Arc<Mutex<dyn Any + Send>>;

/// Opaque handle identifying a provider type within an engine.
///
/// Returned by [`register`](crate::engine::FlowEngine::register) and
/// consumed by [`unregister`](crate::engine::FlowEngine::unregister), so
/// unbinding never has to re-derive identity from a handler value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProviderToken {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

impl ProviderToken {
    pub(crate) fn of<T: FlowCallbacks>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The provider type's name, for diagnostics.
    pub fn provider(&self) -> &'static str {
        self.type_name
    }
}

pub(crate) struct RawHook {
    pub(crate) state: String,
    pub(crate) kind: HookKind,
    pub(crate) hook: ErasedHook,
}

/// A provider type's declaration table, erased for engine storage.
///
/// Build one per provider type and pass the lot to
/// [`set_callback_providers`](crate::engine::FlowEngine::set_callback_providers):
///
/// ```rust
/// use flowstate::callbacks::{CallbackTable, FlowCallbacks, ProviderSpec};
///
/// struct Audit;
///
/// impl FlowCallbacks for Audit {
///     fn callbacks() -> CallbackTable<Self> {
///         CallbackTable::new().on_enter("done", |_| {})
///     }
/// }
///
/// let spec = ProviderSpec::of::<Audit>();
/// assert!(spec.provider().ends_with("Audit"));
/// ```
pub struct ProviderSpec {
    pub(crate) token: ProviderToken,
    pub(crate) entries: Vec<RawHook>,
}

impl ProviderSpec {
    /// Erase `T`'s callback table into an engine-storable spec.
    pub fn of<T: FlowCallbacks>() -> Self {
        let entries = T::callbacks()
            .into_entries()
            .into_iter()
            .map(|entry| {
                let hook = entry.hook;
                RawHook {
                    state: entry.state,
                    kind: entry.kind,
                    hook: Arc::new(move |any: &mut (dyn Any + Send)| {
                        if let Some(target) = any.downcast_mut::<T>() {
                            hook(target);
                        }
                    }),
                }
            })
            .collect();

        Self {
            token: ProviderToken::of::<T>(),
            entries,
        }
    }

    /// The provider type's name, for diagnostics.
    pub fn provider(&self) -> &'static str {
        self.token.type_name
    }
}

/// Association between a state, a provider type, its declared hooks, and
/// the currently bound handler instance (if any).
///
/// One binding exists per `(state, provider)` pair that declares at least
/// one hook for that state.
#[derive(Clone)]
pub struct CallbackBinding {
    pub(crate) token: ProviderToken,
    pub(crate) on_enter: Option<ErasedHook>,
    pub(crate) on_exit: Option<ErasedHook>,
    pub(crate) instance: Option<ErasedHandler>,
}

impl CallbackBinding {
    pub(crate) fn new(token: ProviderToken) -> Self {
        Self {
            token,
            on_enter: None,
            on_exit: None,
            instance: None,
        }
    }

    /// The owning provider type's name.
    pub fn provider(&self) -> &'static str {
        self.token.type_name
    }

    /// Whether an enter hook is declared for this state.
    pub fn has_enter(&self) -> bool {
        self.on_enter.is_some()
    }

    /// Whether an exit hook is declared for this state.
    pub fn has_exit(&self) -> bool {
        self.on_exit.is_some()
    }

    /// Whether a live handler instance is currently bound.
    pub fn is_bound(&self) -> bool {
        self.instance.is_some()
    }
}
