//! End-to-end scenarios across the registry, builder, transitions,
//! callbacks, snapshots, and declarative configuration.

use flowstate::{
    CallbackTable, FlowCallbacks, FlowDecl, FlowError, FlowRegistry, ProviderSpec, Transition,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct GateObserver {
    entered_a: usize,
    exited_a: usize,
}

impl FlowCallbacks for GateObserver {
    fn callbacks() -> CallbackTable<Self> {
        CallbackTable::new()
            .on_enter("A", |this: &mut Self| this.entered_a += 1)
            .on_exit("A", |this| this.exited_a += 1)
    }
}

#[derive(Default)]
struct AuditObserver {
    exited_a: usize,
}

impl FlowCallbacks for AuditObserver {
    fn callbacks() -> CallbackTable<Self> {
        CallbackTable::new().on_exit("A", |this| this.exited_a += 1)
    }
}

#[test]
fn registry_hands_out_one_engine_per_identifier() {
    let registry = FlowRegistry::new();
    assert!(registry.list_all().is_none());

    let first = registry.get_or_create("x");
    let again = registry.get_or_create("x");
    assert!(Arc::ptr_eq(&first, &again));

    let other = registry.get_or_create("y");
    assert!(!Arc::ptr_eq(&first, &other));

    registry.remove("x");
    let fresh = registry.get_or_create("x");
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert!(fresh.states().is_empty());
    assert!(fresh.current_state().is_none());

    registry.clear_all();
    assert!(registry.list_all().is_none());
}

#[test]
fn derived_name_moves_follow_the_graph() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("letters");

    flow.add_state("A").add_state("B").add_state("C");
    flow.add_transition("A", "B")
        .unwrap()
        .add_transition("B", "B")
        .unwrap()
        .add_transition("B", "C")
        .unwrap()
        .set_initial_state("A")
        .unwrap();

    match flow.move_to("C") {
        Err(FlowError::InvalidTransition { current, attempted }) => {
            assert_eq!(current, "A");
            assert_eq!(attempted, Some(Transition::new("A", "C")));
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }

    flow.move_to("B").unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("B"));
    flow.move_to("C").unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("C"));
}

#[test]
fn history_round_trip_with_undo_exhaustion() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("history");

    flow.add_state("A").add_state("B").add_state("C");
    flow.add_transition("A", "B")
        .unwrap()
        .add_transition("B", "C")
        .unwrap()
        .set_initial_state("A")
        .unwrap();

    flow.move_to("B").unwrap().move_to("C").unwrap();

    let entries = flow.history();
    let entries = entries.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].transition, Transition::new("B", "C"));
    assert_eq!(entries[0].transition, Transition::new("A", "B"));

    flow.move_to_previous().unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("B"));
    assert_eq!(
        flow.history().peek().unwrap().transition,
        Transition::new("A", "B")
    );

    flow.move_to_previous().unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("A"));
    assert!(flow.history().is_empty());

    assert!(matches!(flow.move_to_previous(), Err(FlowError::NoHistory)));
}

#[test]
fn callback_lifecycle_through_the_registry() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("gate");

    flow.add_state("A").add_state("B");
    flow.add_transition("A", "B")
        .unwrap()
        .add_transition("B", "A")
        .unwrap()
        .set_initial_state("A")
        .unwrap()
        .set_callback_providers(vec![ProviderSpec::of::<GateObserver>()])
        .unwrap();

    let observer = Arc::new(Mutex::new(GateObserver::default()));

    // Unregistered: nothing fires.
    flow.move_to("B").unwrap();
    flow.move_to("A").unwrap();
    assert_eq!(observer.lock().exited_a, 0);
    assert_eq!(observer.lock().entered_a, 0);

    let token = flow.register(&observer);
    flow.move_to("B").unwrap();
    assert_eq!(observer.lock().exited_a, 1);

    flow.move_to("A").unwrap();
    assert_eq!(observer.lock().entered_a, 1);

    flow.unregister(token);
    flow.move_to("B").unwrap();
    flow.move_to("A").unwrap();
    assert_eq!(observer.lock().exited_a, 1);
    assert_eq!(observer.lock().entered_a, 1);
}

#[test]
fn two_providers_both_observe_the_same_state() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("fanout");

    flow.add_state("A").add_state("B");
    flow.add_transition("A", "B")
        .unwrap()
        .set_initial_state("A")
        .unwrap()
        .set_callback_providers(vec![
            ProviderSpec::of::<GateObserver>(),
            ProviderSpec::of::<AuditObserver>(),
        ])
        .unwrap();

    let gate = Arc::new(Mutex::new(GateObserver::default()));
    let audit = Arc::new(Mutex::new(AuditObserver::default()));
    let gate_token = flow.register(&gate);
    flow.register(&audit);

    flow.move_to("B").unwrap();
    assert_eq!(gate.lock().exited_a, 1);
    assert_eq!(audit.lock().exited_a, 1);

    flow.move_to_previous().unwrap();
    flow.unregister(gate_token);

    // Only the still-registered provider observes the second exit.
    flow.move_to("B").unwrap();
    assert_eq!(gate.lock().exited_a, 1);
    assert_eq!(audit.lock().exited_a, 2);
}

#[test]
fn undo_dispatches_the_reverse_callback_set() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("reverse");

    flow.add_state("A").add_state("B");
    flow.add_transition("A", "B")
        .unwrap()
        .set_initial_state("A")
        .unwrap()
        .set_callback_providers(vec![ProviderSpec::of::<GateObserver>()])
        .unwrap();

    let observer = Arc::new(Mutex::new(GateObserver::default()));
    flow.register(&observer);

    flow.move_to("B").unwrap();
    assert_eq!(observer.lock().exited_a, 1);
    assert_eq!(observer.lock().entered_a, 0);

    // Undoing A -> B re-enters A; the forward set must not fire again.
    flow.move_to_previous().unwrap();
    assert_eq!(observer.lock().entered_a, 1);
    assert_eq!(observer.lock().exited_a, 1);
}

#[test]
fn rehydrated_engine_accepts_fresh_providers() {
    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("persisted");

    flow.add_state("A").add_state("B");
    flow.add_transition("A", "B")
        .unwrap()
        .add_transition("B", "A")
        .unwrap()
        .set_initial_state("A")
        .unwrap();
    flow.move_to("B").unwrap();

    let snapshot = flow.snapshot();
    registry.clear_all();

    let restored = registry.rehydrate(&snapshot).unwrap();
    assert_eq!(restored.current_state().as_deref(), Some("B"));

    // Bindings are not persisted; wire them up again after restoring.
    restored
        .set_callback_providers(vec![ProviderSpec::of::<GateObserver>()])
        .unwrap();
    let observer = Arc::new(Mutex::new(GateObserver::default()));
    restored.register(&observer);

    restored.move_to("A").unwrap();
    assert_eq!(observer.lock().entered_a, 1);

    restored.move_to_previous().unwrap();
    assert_eq!(restored.current_state().as_deref(), Some("B"));
    assert_eq!(observer.lock().exited_a, 1);
}

#[test]
fn declarative_configuration_drives_a_registry_engine() {
    let decl = FlowDecl {
        states: vec!["draft".into(), "review".into(), "published".into()],
        transitions: vec![
            ("draft".into(), "review".into()),
            ("review".into(), "draft".into()),
            ("review".into(), "published".into()),
        ],
        initial: "draft".into(),
    };

    let registry = FlowRegistry::new();
    let flow = registry.get_or_create("article");
    decl.configure(&flow).unwrap();

    flow.apply_transition("draft_review").unwrap();
    flow.apply_transition("review_published").unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("published"));

    flow.move_to_previous().unwrap();
    assert_eq!(flow.current_state().as_deref(), Some("review"));
}
