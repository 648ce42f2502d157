//! Deep clone with shared-reference and cycle preservation.
//!
//! Containers are copied structurally; leaves are reconstructed from their
//! state; primitives pass through. A per-invocation [`IdentityMap`] records
//! each source container's clone so that aliased references stay aliased in
//! the output and cyclic graphs terminate. Every container is registered in
//! the map *before* its contents are populated; a cycle therefore resolves
//! to the in-progress clone instead of recursing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::leaves::TokenRef;
use crate::value::GraphValue;

/// Source-container-to-clone correspondence, scoped to one top-level
/// [`clone`] invocation. Keys are the source allocation addresses; only deep
/// containers are ever entered.
#[derive(Default)]
pub struct IdentityMap {
    entries: HashMap<usize, GraphValue>,
}

impl IdentityMap {
    pub fn new() -> IdentityMap {
        IdentityMap::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, source: usize) -> Option<GraphValue> {
        self.entries.get(&source).cloned()
    }

    fn register(&mut self, source: usize, target: GraphValue) {
        self.entries.insert(source, target);
    }
}

/// Creates a deep clone of a value graph.
///
/// Shared references are preserved: if two edges in the input reach the same
/// container, the corresponding output edges reach the same fresh container.
/// Leaf values (dates, patterns, boxed primitives, errors) come out
/// reference-distinct but state-equal; tokens come out as new wrappers
/// around the same underlying token.
///
/// # Examples
///
/// ```
/// use graph_clone::{clone, deep_equal, GraphValue};
///
/// let shared = GraphValue::arr_from([GraphValue::Int(1)]);
/// let root = GraphValue::obj_from([("a", shared.clone()), ("b", shared.clone())]);
///
/// let copy = clone(&root);
/// assert!(deep_equal(&root, &copy));
///
/// // The two output edges alias each other, not the input
/// let a = copy.get_key("a").unwrap();
/// let b = copy.get_key("b").unwrap();
/// assert!(a.same(&b));
/// assert!(!a.same(&shared));
/// ```
pub fn clone(value: &GraphValue) -> GraphValue {
    let mut map = IdentityMap::new();
    clone_with(value, &mut map)
}

/// Like [`clone`], but with a caller-supplied identity map.
///
/// Reusing one map across several calls extends the aliasing guarantee
/// across them: a container cloned by an earlier call resolves to that same
/// clone again.
pub fn clone_with(value: &GraphValue, map: &mut IdentityMap) -> GraphValue {
    match value {
        // Inline primitives are already values
        GraphValue::Null
        | GraphValue::Bool(_)
        | GraphValue::Int(_)
        | GraphValue::Float(_)
        | GraphValue::Str(_) => value.clone(),

        GraphValue::Obj(source) => {
            let id = Rc::as_ptr(source) as usize;
            if let Some(existing) = map.get(id) {
                return existing;
            }
            let target: Rc<RefCell<IndexMap<String, GraphValue>>> =
                Rc::new(RefCell::new(IndexMap::new()));
            // Register before populating so self-references resolve to the
            // in-progress clone
            map.register(id, GraphValue::Obj(Rc::clone(&target)));
            let entries = source.borrow();
            for (key, val) in entries.iter() {
                let cloned = clone_with(val, map);
                target.borrow_mut().insert(key.clone(), cloned);
            }
            GraphValue::Obj(target)
        }

        GraphValue::Arr(source) => clone_seq(source, GraphValue::Arr, map),
        GraphValue::Set(source) => clone_seq(source, GraphValue::Set, map),
        GraphValue::Tup(source) => clone_seq(source, GraphValue::Tup, map),

        GraphValue::Map(source) => {
            let id = Rc::as_ptr(source) as usize;
            if let Some(existing) = map.get(id) {
                return existing;
            }
            let target: Rc<RefCell<Vec<(GraphValue, GraphValue)>>> =
                Rc::new(RefCell::new(Vec::with_capacity(source.borrow().len())));
            map.register(id, GraphValue::Map(Rc::clone(&target)));
            let entries = source.borrow();
            for (key, val) in entries.iter() {
                // Keys are copied by handle, never structurally cloned
                let cloned = clone_with(val, map);
                target.borrow_mut().push((key.clone(), cloned));
            }
            GraphValue::Map(target)
        }

        // Leaves: fresh instance, same state, no identity-map entry
        GraphValue::Date(d) => GraphValue::Date(Rc::new(d.as_ref().clone())),
        GraphValue::Pattern(p) => GraphValue::Pattern(Rc::new(p.as_ref().clone())),
        GraphValue::WrapBool(b) => GraphValue::WrapBool(Rc::new(**b)),
        GraphValue::WrapNum(n) => GraphValue::WrapNum(Rc::new(**n)),
        GraphValue::WrapStr(s) => GraphValue::WrapStr(Rc::new(s.as_ref().clone())),
        GraphValue::Error(e) => GraphValue::Error(Rc::new(e.as_ref().clone())),
        GraphValue::Token(t) => GraphValue::Token(Rc::new(TokenRef::new(Rc::clone(t.token())))),
    }
}

fn clone_seq(
    source: &Rc<RefCell<Vec<GraphValue>>>,
    wrap: fn(Rc<RefCell<Vec<GraphValue>>>) -> GraphValue,
    map: &mut IdentityMap,
) -> GraphValue {
    let id = Rc::as_ptr(source) as usize;
    if let Some(existing) = map.get(id) {
        return existing;
    }
    let target: Rc<RefCell<Vec<GraphValue>>> =
        Rc::new(RefCell::new(Vec::with_capacity(source.borrow().len())));
    map.register(id, wrap(Rc::clone(&target)));
    let items = source.borrow();
    for item in items.iter() {
        let cloned = clone_with(item, map);
        target.borrow_mut().push(cloned);
    }
    wrap(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equal::deep_equal;
    use crate::leaves::UniqueToken;

    #[test]
    fn test_clone_primitives_pass_through() {
        assert!(clone(&GraphValue::Null).same(&GraphValue::Null));
        assert!(clone(&GraphValue::Int(3)).same(&GraphValue::Int(3)));
        assert!(clone(&GraphValue::Float(1.5)).same(&GraphValue::Float(1.5)));
        assert!(
            clone(&GraphValue::Str("hi".to_string())).same(&GraphValue::Str("hi".to_string()))
        );
    }

    #[test]
    fn test_clone_object_is_fresh() {
        let original = GraphValue::obj_from([
            ("a", GraphValue::Int(1)),
            ("b", GraphValue::obj_from([("c", GraphValue::Int(2))])),
        ]);
        let copy = clone(&original);

        assert!(deep_equal(&original, &copy));
        assert!(!copy.same(&original));
        assert!(!copy.get_key("b").unwrap().same(&original.get_key("b").unwrap()));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = GraphValue::obj_from([("list", GraphValue::arr_from([GraphValue::Int(1)]))]);
        let copy = clone(&original);

        copy.get_key("list").unwrap().push(GraphValue::Int(2));
        assert_eq!(original.get_key("list").unwrap().len(), Some(1));
        assert_eq!(copy.get_key("list").unwrap().len(), Some(2));
    }

    #[test]
    fn test_clone_shared_reference() {
        let shared = GraphValue::obj_from([("n", GraphValue::Int(1))]);
        let root = GraphValue::obj_from([("x", shared.clone()), ("y", shared.clone())]);

        let copy = clone(&root);
        let x = copy.get_key("x").unwrap();
        let y = copy.get_key("y").unwrap();

        assert!(x.same(&y));
        assert!(!x.same(&shared));
    }

    #[test]
    fn test_clone_self_cycle() {
        let obj = GraphValue::empty_obj();
        obj.set_key("me", obj.clone());

        let copy = clone(&obj);
        let inner = copy.get_key("me").unwrap();
        assert!(inner.same(&copy));
        assert!(!copy.same(&obj));
    }

    #[test]
    fn test_clone_mutual_cycle() {
        let a = GraphValue::empty_obj();
        let b = GraphValue::empty_obj();
        a.set_key("b", b.clone());
        b.set_key("a", a.clone());

        let copy_a = clone(&a);
        let copy_b = copy_a.get_key("b").unwrap();
        let back = copy_b.get_key("a").unwrap();

        assert!(back.same(&copy_a));
        assert!(!copy_b.same(&b));
    }

    #[test]
    fn test_clone_array_cycle() {
        let arr = GraphValue::empty_arr();
        arr.push(arr.clone());

        let copy = clone(&arr);
        assert!(copy.get_index(0).unwrap().same(&copy));
    }

    #[test]
    fn test_clone_map_keys_by_reference() {
        let key = GraphValue::obj_from([("id", GraphValue::Int(9))]);
        let val = GraphValue::arr_from([GraphValue::Int(1)]);
        let map = GraphValue::map_from([(key.clone(), val.clone())]);

        let copy = clone(&map);

        // The key handle is shared with the input; the value is a fresh clone
        let out = copy.map_lookup(&key).expect("key preserved by identity");
        assert!(!out.same(&val));
        assert!(deep_equal(&out, &val));
    }

    #[test]
    fn test_clone_set_members() {
        let member = GraphValue::obj_from([("m", GraphValue::Int(1))]);
        let set = GraphValue::set_from([member.clone(), GraphValue::Int(7)]);

        let copy = clone(&set);
        assert_eq!(copy.len(), Some(2));
        // Cloned member is a distinct container
        assert!(!copy.has_member(&member));
        assert!(copy.has_member(&GraphValue::Int(7)));
        assert!(deep_equal(&copy, &set));
    }

    #[test]
    fn test_clone_tuple() {
        let tup = GraphValue::tup_from([GraphValue::Int(1), GraphValue::Str("x".to_string())]);
        let copy = clone(&tup);

        assert!(matches!(copy, GraphValue::Tup(_)));
        assert!(deep_equal(&copy, &tup));
        assert!(!copy.same(&tup));
    }

    #[test]
    fn test_clone_leaves_fresh_but_equal() {
        let root = GraphValue::obj_from([
            ("when", GraphValue::date(1_700_000_000_000)),
            ("pat", GraphValue::pattern("a+", "gi").unwrap()),
            ("flag", GraphValue::wrap_bool(false)),
            ("num", GraphValue::wrap_num(6.5)),
            ("name", GraphValue::wrap_str("ada")),
            ("err", GraphValue::error("boom")),
        ]);
        let copy = clone(&root);

        for key in ["when", "pat", "flag", "num", "name", "err"] {
            let a = root.get_key(key).unwrap();
            let b = copy.get_key(key).unwrap();
            assert!(!a.same(&b), "leaf {} should be reference-distinct", key);
            assert!(deep_equal(&a, &b), "leaf {} should be state-equal", key);
        }

        // A false boxed boolean stays false
        match copy.get_key("flag").unwrap() {
            GraphValue::WrapBool(b) => assert!(!*b),
            other => panic!("expected WrapBool, got {:?}", other),
        }
    }

    #[test]
    fn test_clone_pattern_copies_cursor() {
        let pat = GraphValue::pattern("a", "g").unwrap();
        pat.as_pattern().unwrap().find_next("aaa");
        assert_eq!(pat.as_pattern().unwrap().last_index(), 1);

        let copy = clone(&pat);
        assert_eq!(copy.as_pattern().unwrap().last_index(), 1);
    }

    #[test]
    fn test_clone_shared_leaf_duplicates() {
        // Leaves take no identity-map entry: a date aliased under two keys
        // comes out as two distinct dates
        let when = GraphValue::date(42);
        let root = GraphValue::obj_from([("a", when.clone()), ("b", when.clone())]);

        let copy = clone(&root);
        let a = copy.get_key("a").unwrap();
        let b = copy.get_key("b").unwrap();
        assert!(!a.same(&b));
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_clone_token_shares_inner_token() {
        let token = UniqueToken::new(Some("session"));
        let wrapper = GraphValue::token_of(&token);

        let copy = clone(&wrapper);
        assert!(!copy.same(&wrapper)); // new wrapper
        let (a, b) = (wrapper.as_token().unwrap(), copy.as_token().unwrap());
        assert!(a.refers_to(b)); // same token
    }

    #[test]
    fn test_clone_with_shared_map_across_calls() {
        let shared = GraphValue::obj_from([("n", GraphValue::Int(1))]);
        let mut map = IdentityMap::new();

        let first = clone_with(&shared, &mut map);
        let second = clone_with(&shared, &mut map);
        assert!(first.same(&second));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_identity_map_counts_containers_only() {
        let root = GraphValue::obj_from([
            ("list", GraphValue::arr_from([GraphValue::Int(1)])),
            ("when", GraphValue::date(0)),
            ("n", GraphValue::Int(3)),
        ]);
        let mut map = IdentityMap::new();
        assert!(map.is_empty());

        clone_with(&root, &mut map);
        // Root object and the nested array; the date and int take no entry
        assert_eq!(map.len(), 2);
    }
}
