//! Random add/remove/emit interleavings against a simple model.
//!
//! After every step, each (target, type) pair must have exactly one native
//! listener when it has bindings and none otherwise.
#![cfg(not(target_arch = "wasm32"))]

use std::collections::BTreeMap;

use mkr_signals::{listener, Context, Listener, LocalEvent, LocalTarget, TriggerMatrix};
use proptest::prelude::*;

const TARGETS: usize = 3;
const TYPES: [&str; 3] = ["click", "mouseover", "touchstart"];
const LISTENERS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Add { t: usize, ty: usize, l: usize, once: bool },
    Remove { t: usize, ty: usize, l: usize },
    RemoveAll { t: usize, ty: usize },
    Delete { t: usize },
    Emit { t: usize, ty: usize },
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    let t = 0..TARGETS;
    let ty = 0..TYPES.len();
    let l = 0..LISTENERS;
    prop_oneof![
        4 => (t.clone(), ty.clone(), l.clone(), any::<bool>())
            .prop_map(|(t, ty, l, once)| Op::Add { t, ty, l, once }),
        2 => (t.clone(), ty.clone(), l).prop_map(|(t, ty, l)| Op::Remove { t, ty, l }),
        1 => (t.clone(), ty.clone()).prop_map(|(t, ty)| Op::RemoveAll { t, ty }),
        1 => t.clone().prop_map(|t| Op::Delete { t }),
        3 => (t, ty).prop_map(|(t, ty)| Op::Emit { t, ty }),
        1 => Just(Op::Clear),
    ]
}

/// (target, type, listener) -> once flag
type Model = BTreeMap<(usize, usize, usize), bool>;

fn check(matrix: &TriggerMatrix<LocalTarget>, targets: &[LocalTarget], model: &Model) {
    for (t, target) in targets.iter().enumerate() {
        for (ty, event_type) in TYPES.iter().enumerate() {
            let expected = model.keys().filter(|k| k.0 == t && k.1 == ty).count();
            assert_eq!(matrix.listener_count(target, event_type), expected);

            let natives = target.native_listener_count(event_type);
            assert_eq!(natives, usize::from(expected > 0));
            assert_eq!(matrix.has_trigger(target, event_type), expected > 0);
        }
    }
}

proptest! {
    #[test]
    fn at_most_one_native_trigger_per_pair(ops in prop::collection::vec(op(), 1..80)) {
        let matrix = TriggerMatrix::new();
        let targets: Vec<LocalTarget> =
            (0..TARGETS).map(|i| LocalTarget::new(format!("t{i}"))).collect();
        let listeners: Vec<Listener<LocalEvent>> =
            (0..LISTENERS).map(|_| listener(|_| {})).collect();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Add { t, ty, l, once } => {
                    let (target, handler) = (&targets[t], listeners[l].clone());
                    let result = if once {
                        matrix.add_once(target, TYPES[ty], handler, Context::none(), 0)
                    } else {
                        matrix.add(target, TYPES[ty], handler, Context::none(), 0)
                    };
                    match model.get(&(t, ty, l)) {
                        Some(&existing) if existing != once => prop_assert!(result.is_err()),
                        _ => {
                            prop_assert!(result.is_ok());
                            model.insert((t, ty, l), once);
                        }
                    }
                }
                Op::Remove { t, ty, l } => {
                    matrix.remove(&targets[t], TYPES[ty], &listeners[l], &Context::none());
                    model.remove(&(t, ty, l));
                }
                Op::RemoveAll { t, ty } => {
                    matrix.remove_all(&targets[t], TYPES[ty]);
                    model.retain(|k, _| !(k.0 == t && k.1 == ty));
                }
                Op::Delete { t } => {
                    matrix.delete(&targets[t]);
                    model.retain(|k, _| k.0 != t);
                }
                Op::Emit { t, ty } => {
                    targets[t].emit(&LocalEvent::new(TYPES[ty]));
                    model.retain(|k, once| !(k.0 == t && k.1 == ty && *once));
                }
                Op::Clear => {
                    matrix.clear();
                    model.clear();
                }
            }
            check(&matrix, &targets, &model);
        }
    }
}
