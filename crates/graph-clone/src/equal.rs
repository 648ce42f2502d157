//! Deep structural equality over value graphs.

use std::collections::HashSet;
use std::rc::Rc;

use crate::value::GraphValue;

/// Performs a deep equality check between two value graphs.
///
/// Compares values recursively: primitives by value, containers entry by
/// entry, leaves by state. Tokens compare by their underlying token; map
/// keys by identity; patterns by source and flag text (the match cursor is
/// transient state and does not participate). Sets and maps compare in
/// insertion order.
///
/// Cyclic graphs terminate: a pair of containers already being compared
/// higher up the stack is assumed equal, so equality is decided by the rest
/// of the structure.
///
/// # Examples
///
/// ```
/// use graph_clone::{deep_equal, GraphValue};
///
/// let a = GraphValue::obj_from([("x", GraphValue::arr_from([GraphValue::Int(1)]))]);
/// let b = GraphValue::obj_from([("x", GraphValue::arr_from([GraphValue::Int(1)]))]);
/// let c = GraphValue::obj_from([("x", GraphValue::arr_from([GraphValue::Int(2)]))]);
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &GraphValue, b: &GraphValue) -> bool {
    let mut in_progress = HashSet::new();
    deep_equal_inner(a, b, &mut in_progress)
}

fn deep_equal_inner(
    a: &GraphValue,
    b: &GraphValue,
    in_progress: &mut HashSet<(usize, usize)>,
) -> bool {
    // Identical handles and equal primitives
    if a.same(b) {
        return true;
    }

    match (a, b) {
        (GraphValue::Obj(x), GraphValue::Obj(y)) => {
            let pair = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
            if !in_progress.insert(pair) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            if x.len() != y.len() {
                return false;
            }
            for (key, val_a) in x.iter() {
                match y.get(key) {
                    Some(val_b) => {
                        if !deep_equal_inner(val_a, val_b, in_progress) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        (GraphValue::Arr(x), GraphValue::Arr(y))
        | (GraphValue::Set(x), GraphValue::Set(y))
        | (GraphValue::Tup(x), GraphValue::Tup(y)) => {
            let pair = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
            if !in_progress.insert(pair) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            if x.len() != y.len() {
                return false;
            }
            for i in 0..x.len() {
                if !deep_equal_inner(&x[i], &y[i], in_progress) {
                    return false;
                }
            }
            true
        }

        (GraphValue::Map(x), GraphValue::Map(y)) => {
            let pair = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
            if !in_progress.insert(pair) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            if x.len() != y.len() {
                return false;
            }
            for i in 0..x.len() {
                let (key_a, val_a) = &x[i];
                let (key_b, val_b) = &y[i];
                if !key_a.same(key_b) {
                    return false;
                }
                if !deep_equal_inner(val_a, val_b, in_progress) {
                    return false;
                }
            }
            true
        }

        (GraphValue::Date(x), GraphValue::Date(y)) => x.epoch_ms() == y.epoch_ms(),
        (GraphValue::Pattern(x), GraphValue::Pattern(y)) => {
            x.source() == y.source() && x.flags() == y.flags()
        }
        (GraphValue::WrapBool(x), GraphValue::WrapBool(y)) => x == y,
        (GraphValue::WrapNum(x), GraphValue::WrapNum(y)) => x == y,
        (GraphValue::WrapStr(x), GraphValue::WrapStr(y)) => x == y,
        (GraphValue::Error(x), GraphValue::Error(y)) => x.message() == y.message(),
        (GraphValue::Token(x), GraphValue::Token(y)) => x.refers_to(y),

        // Different categories are never equal
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaves::UniqueToken;

    #[test]
    fn test_equal_primitives() {
        assert!(deep_equal(&GraphValue::Int(1), &GraphValue::Int(1)));
        assert!(!deep_equal(&GraphValue::Int(1), &GraphValue::Int(2)));
        assert!(!deep_equal(&GraphValue::Int(1), &GraphValue::Float(1.0)));
        assert!(!deep_equal(&GraphValue::Int(1), &GraphValue::empty_arr()));
    }

    #[test]
    fn test_equal_nested() {
        let a = GraphValue::obj_from([
            ("list", GraphValue::arr_from([GraphValue::Int(1), GraphValue::Int(2)])),
            ("flag", GraphValue::Bool(true)),
        ]);
        let b = GraphValue::obj_from([
            ("list", GraphValue::arr_from([GraphValue::Int(1), GraphValue::Int(2)])),
            ("flag", GraphValue::Bool(true)),
        ]);
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_unequal_object_keys() {
        let a = GraphValue::obj_from([("x", GraphValue::Int(1))]);
        let b = GraphValue::obj_from([("y", GraphValue::Int(1))]);
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_arr_and_tup_are_distinct_categories() {
        let arr = GraphValue::arr_from([GraphValue::Int(1)]);
        let tup = GraphValue::tup_from([GraphValue::Int(1)]);
        assert!(!deep_equal(&arr, &tup));
    }

    #[test]
    fn test_equal_cycles() {
        let a = GraphValue::empty_obj();
        a.set_key("me", a.clone());
        let b = GraphValue::empty_obj();
        b.set_key("me", b.clone());

        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_unequal_cycles() {
        let a = GraphValue::empty_obj();
        a.set_key("me", a.clone());
        a.set_key("n", GraphValue::Int(1));

        let b = GraphValue::empty_obj();
        b.set_key("me", b.clone());
        b.set_key("n", GraphValue::Int(2));

        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_equal_mutual_cycles() {
        let a1 = GraphValue::empty_obj();
        let a2 = GraphValue::empty_obj();
        a1.set_key("next", a2.clone());
        a2.set_key("next", a1.clone());

        let b1 = GraphValue::empty_obj();
        let b2 = GraphValue::empty_obj();
        b1.set_key("next", b2.clone());
        b2.set_key("next", b1.clone());

        assert!(deep_equal(&a1, &b1));
    }

    #[test]
    fn test_equal_dates_and_patterns() {
        assert!(deep_equal(&GraphValue::date(5), &GraphValue::date(5)));
        assert!(!deep_equal(&GraphValue::date(5), &GraphValue::date(6)));

        let p = GraphValue::pattern("a+", "i").unwrap();
        let q = GraphValue::pattern("a+", "i").unwrap();
        let r = GraphValue::pattern("a+", "g").unwrap();
        assert!(deep_equal(&p, &q));
        assert!(!deep_equal(&p, &r));
    }

    #[test]
    fn test_pattern_equality_ignores_cursor() {
        let p = GraphValue::pattern("a", "g").unwrap();
        let q = GraphValue::pattern("a", "g").unwrap();
        p.as_pattern().unwrap().find_next("aaa");
        assert_ne!(
            p.as_pattern().unwrap().last_index(),
            q.as_pattern().unwrap().last_index()
        );
        assert!(deep_equal(&p, &q));
    }

    #[test]
    fn test_token_equality_follows_inner_token() {
        let token = UniqueToken::new(None);
        let a = GraphValue::token_of(&token);
        let b = GraphValue::token_of(&token);
        let c = GraphValue::token(None);

        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_map_keys_compare_by_identity() {
        let key = GraphValue::empty_obj();
        let a = GraphValue::map_from([(key.clone(), GraphValue::Int(1))]);
        let b = GraphValue::map_from([(key.clone(), GraphValue::Int(1))]);
        assert!(deep_equal(&a, &b));

        // Structurally equal but distinct key containers differ
        let c = GraphValue::map_from([(GraphValue::empty_obj(), GraphValue::Int(1))]);
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_wrapped_primitives() {
        assert!(deep_equal(&GraphValue::wrap_bool(true), &GraphValue::wrap_bool(true)));
        assert!(!deep_equal(&GraphValue::wrap_bool(true), &GraphValue::wrap_bool(false)));
        assert!(deep_equal(&GraphValue::wrap_str("x"), &GraphValue::wrap_str("x")));
        assert!(!deep_equal(&GraphValue::wrap_str("x"), &GraphValue::Str("x".to_string())));
        assert!(deep_equal(&GraphValue::error("e"), &GraphValue::error("e")));
    }
}
