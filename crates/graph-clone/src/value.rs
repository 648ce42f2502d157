//! The value-graph model.
//!
//! [`GraphValue`] represents one node of a dynamically-typed value graph.
//! Primitives are inline. Deep containers (objects, arrays, maps, sets,
//! tuples) sit behind `Rc<RefCell<..>>`, so copying a `GraphValue` handle is
//! the analog of copying a reference: both handles reach the same container,
//! and graphs may share structure or contain cycles. Leaf values (dates,
//! patterns, boxed primitives, errors, tokens) sit behind plain `Rc` and are
//! reconstructed, not traversed, by the clone engine.
//!
//! There is deliberately no `PartialEq` impl: a derived one would recurse
//! forever on cyclic graphs. Identity comparison is [`GraphValue::same`];
//! structural comparison is [`deep_equal`](crate::equal::deep_equal).

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::leaves::{DateValue, ErrorValue, PatternError, PatternValue, TokenRef, UniqueToken};

/// One node of a value graph.
#[derive(Clone)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Keyed container, insertion-ordered.
    Obj(Rc<RefCell<IndexMap<String, GraphValue>>>),
    /// Growable sequence.
    Arr(Rc<RefCell<Vec<GraphValue>>>),
    /// Association container; keys are compared by identity, kept in
    /// insertion order.
    Map(Rc<RefCell<Vec<(GraphValue, GraphValue)>>>),
    /// Membership container; members are compared by identity, kept in
    /// insertion order.
    Set(Rc<RefCell<Vec<GraphValue>>>),
    /// Fixed-shape positional container (an argument-list analog).
    Tup(Rc<RefCell<Vec<GraphValue>>>),
    Date(Rc<DateValue>),
    Pattern(Rc<PatternValue>),
    WrapBool(Rc<bool>),
    WrapNum(Rc<f64>),
    WrapStr(Rc<String>),
    Error(Rc<ErrorValue>),
    Token(Rc<TokenRef>),
}

// ── Constructors ─────────────────────────────────────────────────────────

impl GraphValue {
    pub fn empty_obj() -> GraphValue {
        GraphValue::Obj(Rc::new(RefCell::new(IndexMap::new())))
    }

    pub fn empty_arr() -> GraphValue {
        GraphValue::Arr(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn empty_map() -> GraphValue {
        GraphValue::Map(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn empty_set() -> GraphValue {
        GraphValue::Set(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn empty_tup() -> GraphValue {
        GraphValue::Tup(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn obj_from<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, GraphValue)>,
    ) -> GraphValue {
        let map: IndexMap<String, GraphValue> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        GraphValue::Obj(Rc::new(RefCell::new(map)))
    }

    pub fn arr_from(items: impl IntoIterator<Item = GraphValue>) -> GraphValue {
        GraphValue::Arr(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn set_from(members: impl IntoIterator<Item = GraphValue>) -> GraphValue {
        let set = GraphValue::empty_set();
        for member in members {
            set.add_member(member);
        }
        set
    }

    pub fn map_from(
        entries: impl IntoIterator<Item = (GraphValue, GraphValue)>,
    ) -> GraphValue {
        let map = GraphValue::empty_map();
        for (key, value) in entries {
            map.map_insert(key, value);
        }
        map
    }

    pub fn tup_from(items: impl IntoIterator<Item = GraphValue>) -> GraphValue {
        GraphValue::Tup(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn date(epoch_ms: i64) -> GraphValue {
        GraphValue::Date(Rc::new(DateValue::new(epoch_ms)))
    }

    pub fn pattern(source: &str, flags: &str) -> Result<GraphValue, PatternError> {
        Ok(GraphValue::Pattern(Rc::new(PatternValue::new(
            source, flags,
        )?)))
    }

    pub fn wrap_bool(value: bool) -> GraphValue {
        GraphValue::WrapBool(Rc::new(value))
    }

    pub fn wrap_num(value: f64) -> GraphValue {
        GraphValue::WrapNum(Rc::new(value))
    }

    pub fn wrap_str(value: impl Into<String>) -> GraphValue {
        GraphValue::WrapStr(Rc::new(value.into()))
    }

    pub fn error(message: impl Into<String>) -> GraphValue {
        GraphValue::Error(Rc::new(ErrorValue::new(message)))
    }

    /// A wrapper around a freshly minted token.
    pub fn token(description: Option<&str>) -> GraphValue {
        GraphValue::Token(Rc::new(TokenRef::new(UniqueToken::new(description))))
    }

    /// A new wrapper around an existing token.
    pub fn token_of(token: &Rc<UniqueToken>) -> GraphValue {
        GraphValue::Token(Rc::new(TokenRef::new(Rc::clone(token))))
    }
}

// ── Identity ─────────────────────────────────────────────────────────────

impl GraphValue {
    /// Identity comparison: value equality for inline primitives, handle
    /// equality for everything reference-backed.
    pub fn same(&self, other: &GraphValue) -> bool {
        match (self, other) {
            (GraphValue::Null, GraphValue::Null) => true,
            (GraphValue::Bool(a), GraphValue::Bool(b)) => a == b,
            (GraphValue::Int(a), GraphValue::Int(b)) => a == b,
            (GraphValue::Float(a), GraphValue::Float(b)) => a == b,
            (GraphValue::Str(a), GraphValue::Str(b)) => a == b,
            (GraphValue::Obj(a), GraphValue::Obj(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Arr(a), GraphValue::Arr(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Map(a), GraphValue::Map(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Set(a), GraphValue::Set(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Tup(a), GraphValue::Tup(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Date(a), GraphValue::Date(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Pattern(a), GraphValue::Pattern(b)) => Rc::ptr_eq(a, b),
            (GraphValue::WrapBool(a), GraphValue::WrapBool(b)) => Rc::ptr_eq(a, b),
            (GraphValue::WrapNum(a), GraphValue::WrapNum(b)) => Rc::ptr_eq(a, b),
            (GraphValue::WrapStr(a), GraphValue::WrapStr(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Error(a), GraphValue::Error(b)) => Rc::ptr_eq(a, b),
            (GraphValue::Token(a), GraphValue::Token(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Allocation address of a deep container's backing cell. `None` for
    /// primitives and leaves.
    pub(crate) fn container_id(&self) -> Option<usize> {
        match self {
            GraphValue::Obj(rc) => Some(Rc::as_ptr(rc) as usize),
            GraphValue::Arr(rc) | GraphValue::Set(rc) | GraphValue::Tup(rc) => {
                Some(Rc::as_ptr(rc) as usize)
            }
            GraphValue::Map(rc) => Some(Rc::as_ptr(rc) as usize),
            _ => None,
        }
    }
}

// ── Accessors ────────────────────────────────────────────────────────────

impl GraphValue {
    pub fn as_obj(&self) -> Option<&Rc<RefCell<IndexMap<String, GraphValue>>>> {
        match self {
            GraphValue::Obj(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_arr(&self) -> Option<&Rc<RefCell<Vec<GraphValue>>>> {
        match self {
            GraphValue::Arr(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Rc<RefCell<Vec<(GraphValue, GraphValue)>>>> {
        match self {
            GraphValue::Map(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Rc<RefCell<Vec<GraphValue>>>> {
        match self {
            GraphValue::Set(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_tup(&self) -> Option<&Rc<RefCell<Vec<GraphValue>>>> {
        match self {
            GraphValue::Tup(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            GraphValue::Date(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&PatternValue> {
        match self {
            GraphValue::Pattern(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&TokenRef> {
        match self {
            GraphValue::Token(rc) => Some(rc),
            _ => None,
        }
    }

    /// Read an object key; a handle copy of the slot's value.
    pub fn get_key(&self, key: &str) -> Option<GraphValue> {
        match self {
            GraphValue::Obj(rc) => rc.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Write an object key. Returns false if this is not an object.
    pub fn set_key(&self, key: impl Into<String>, value: GraphValue) -> bool {
        match self {
            GraphValue::Obj(rc) => {
                rc.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Read an array or tuple element.
    pub fn get_index(&self, index: usize) -> Option<GraphValue> {
        match self {
            GraphValue::Arr(rc) | GraphValue::Tup(rc) => rc.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Append to an array. Returns false if this is not an array.
    pub fn push(&self, value: GraphValue) -> bool {
        match self {
            GraphValue::Arr(rc) => {
                rc.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Add a member to a set, deduplicating by identity. Returns false if
    /// this is not a set.
    pub fn add_member(&self, member: GraphValue) -> bool {
        match self {
            GraphValue::Set(rc) => {
                if !rc.borrow().iter().any(|m| m.same(&member)) {
                    rc.borrow_mut().push(member);
                }
                true
            }
            _ => false,
        }
    }

    /// Whether a set holds `member` (by identity).
    pub fn has_member(&self, member: &GraphValue) -> bool {
        match self {
            GraphValue::Set(rc) => rc.borrow().iter().any(|m| m.same(member)),
            _ => false,
        }
    }

    /// Insert into a map, replacing the entry whose key is identical to
    /// `key` if one exists. Returns false if this is not a map.
    pub fn map_insert(&self, key: GraphValue, value: GraphValue) -> bool {
        match self {
            GraphValue::Map(rc) => {
                let mut entries = rc.borrow_mut();
                for entry in entries.iter_mut() {
                    if entry.0.same(&key) {
                        entry.1 = value;
                        return true;
                    }
                }
                entries.push((key, value));
                true
            }
            _ => false,
        }
    }

    /// Look up a map entry by key identity.
    pub fn map_lookup(&self, key: &GraphValue) -> Option<GraphValue> {
        match self {
            GraphValue::Map(rc) => rc
                .borrow()
                .iter()
                .find(|(k, _)| k.same(key))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Number of entries, elements, or members; `None` for non-containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            GraphValue::Obj(rc) => Some(rc.borrow().len()),
            GraphValue::Arr(rc) | GraphValue::Set(rc) | GraphValue::Tup(rc) => {
                Some(rc.borrow().len())
            }
            GraphValue::Map(rc) => Some(rc.borrow().len()),
            _ => None,
        }
    }
}

// ── Debug ────────────────────────────────────────────────────────────────

impl fmt::Debug for GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited = HashSet::new();
        debug_value(self, f, &mut visited)
    }
}

/// Cycle-safe formatter. Back-edges print as `<cycle>`; shared alias edges
/// that are not cycles print in full.
fn debug_value(
    value: &GraphValue,
    f: &mut fmt::Formatter<'_>,
    visited: &mut HashSet<usize>,
) -> fmt::Result {
    match value {
        GraphValue::Null => write!(f, "null"),
        GraphValue::Bool(b) => write!(f, "{}", b),
        GraphValue::Int(i) => write!(f, "{}", i),
        GraphValue::Float(x) => write!(f, "{}", x),
        GraphValue::Str(s) => write!(f, "{:?}", s),
        GraphValue::Obj(rc) => {
            let id = Rc::as_ptr(rc) as usize;
            if !visited.insert(id) {
                return write!(f, "<cycle>");
            }
            write!(f, "{{")?;
            let entries = rc.borrow();
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}: ", key)?;
                debug_value(val, f, visited)?;
            }
            write!(f, "}}")?;
            visited.remove(&id);
            Ok(())
        }
        GraphValue::Arr(rc) => debug_seq(rc, "[", "]", f, visited),
        GraphValue::Tup(rc) => debug_seq(rc, "Tup(", ")", f, visited),
        GraphValue::Set(rc) => debug_seq(rc, "Set{", "}", f, visited),
        GraphValue::Map(rc) => {
            let id = Rc::as_ptr(rc) as usize;
            if !visited.insert(id) {
                return write!(f, "<cycle>");
            }
            write!(f, "Map{{")?;
            let entries = rc.borrow();
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                debug_value(key, f, visited)?;
                write!(f, " => ")?;
                debug_value(val, f, visited)?;
            }
            write!(f, "}}")?;
            visited.remove(&id);
            Ok(())
        }
        GraphValue::Date(d) => write!(f, "Date({})", d.epoch_ms()),
        GraphValue::Pattern(p) => write!(f, "{:?}", p),
        GraphValue::WrapBool(b) => write!(f, "WrapBool({})", b),
        GraphValue::WrapNum(n) => write!(f, "WrapNum({})", n),
        GraphValue::WrapStr(s) => write!(f, "WrapStr({:?})", s),
        GraphValue::Error(e) => write!(f, "Error({:?})", e.message()),
        GraphValue::Token(t) => match t.description() {
            Some(d) => write!(f, "Token({:?})", d),
            None => write!(f, "Token"),
        },
    }
}

fn debug_seq(
    rc: &Rc<RefCell<Vec<GraphValue>>>,
    open: &str,
    close: &str,
    f: &mut fmt::Formatter<'_>,
    visited: &mut HashSet<usize>,
) -> fmt::Result {
    let id = Rc::as_ptr(rc) as usize;
    if !visited.insert(id) {
        return write!(f, "<cycle>");
    }
    write!(f, "{}", open)?;
    let items = rc.borrow();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        debug_value(item, f, visited)?;
    }
    write!(f, "{}", close)?;
    visited.remove(&id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_primitives() {
        assert!(GraphValue::Null.same(&GraphValue::Null));
        assert!(GraphValue::Int(1).same(&GraphValue::Int(1)));
        assert!(!GraphValue::Int(1).same(&GraphValue::Int(2)));
        assert!(!GraphValue::Int(1).same(&GraphValue::Float(1.0)));
        assert!(GraphValue::Str("a".to_string()).same(&GraphValue::Str("a".to_string())));
    }

    #[test]
    fn test_same_containers_by_handle() {
        let a = GraphValue::obj_from([("x", GraphValue::Int(1))]);
        let alias = a.clone();
        let twin = GraphValue::obj_from([("x", GraphValue::Int(1))]);

        assert!(a.same(&alias));
        assert!(!a.same(&twin)); // equal content, different allocation
    }

    #[test]
    fn test_obj_access() {
        let obj = GraphValue::empty_obj();
        assert!(obj.set_key("a", GraphValue::Int(1)));
        assert!(obj.get_key("a").unwrap().same(&GraphValue::Int(1)));
        assert_eq!(obj.len(), Some(1));

        assert!(!GraphValue::Null.set_key("a", GraphValue::Int(1)));
        assert!(GraphValue::Null.get_key("a").is_none());
    }

    #[test]
    fn test_set_dedup_by_identity() {
        let shared = GraphValue::empty_arr();
        let set = GraphValue::set_from([
            shared.clone(),
            shared.clone(),
            GraphValue::Int(1),
            GraphValue::Int(1),
        ]);
        // The aliased array and the equal ints each collapse to one member
        assert_eq!(set.len(), Some(2));
        assert!(set.has_member(&shared));
    }

    #[test]
    fn test_map_insert_replaces_by_key_identity() {
        let key = GraphValue::empty_obj();
        let map = GraphValue::empty_map();
        map.map_insert(key.clone(), GraphValue::Int(1));
        map.map_insert(key.clone(), GraphValue::Int(2));

        assert_eq!(map.len(), Some(1));
        assert!(map.map_lookup(&key).unwrap().same(&GraphValue::Int(2)));

        // A structurally equal but distinct key is a different entry
        let twin = GraphValue::empty_obj();
        assert!(map.map_lookup(&twin).is_none());
    }

    #[test]
    fn test_debug_plain() {
        let v = GraphValue::obj_from([
            ("a", GraphValue::Int(1)),
            ("b", GraphValue::arr_from([GraphValue::Bool(true)])),
        ]);
        assert_eq!(format!("{:?}", v), r#"{"a": 1, "b": [true]}"#);
    }

    #[test]
    fn test_debug_cycle_marker() {
        let obj = GraphValue::empty_obj();
        obj.set_key("me", obj.clone());
        let out = format!("{:?}", obj);
        assert!(out.contains("<cycle>"), "got: {}", out);
    }

    #[test]
    fn test_debug_shared_alias_prints_fully() {
        let shared = GraphValue::arr_from([GraphValue::Int(7)]);
        let v = GraphValue::obj_from([("a", shared.clone()), ("b", shared.clone())]);
        assert_eq!(format!("{:?}", v), r#"{"a": [7], "b": [7]}"#);
    }

    #[test]
    fn test_debug_leaves() {
        assert_eq!(format!("{:?}", GraphValue::date(5)), "Date(5)");
        assert_eq!(
            format!("{:?}", GraphValue::pattern("a+", "i").unwrap()),
            "/a+/i"
        );
        assert_eq!(format!("{:?}", GraphValue::token(Some("t"))), r#"Token("t")"#);
        assert_eq!(format!("{:?}", GraphValue::token(None)), "Token");
    }
}
