#[cfg(test)]
#[path = "./tree_tests.rs"]
mod tests;

use crate::value::{Table, Value};
use log::trace;

/// A dotted key: one or more segments identifying a position in the tree.
///
/// Segment identity is the exact string; how a segment is quoted or escaped
/// on the surface never matters here.
pub(crate) type KeyPath = Vec<String>;

/// Child of a table node.
enum Node {
    Table(TableNode),
    Array(TableArrayNode),
    /// A fully-assigned value. Nothing may ever reach through it.
    Leaf(Value),
}

/// Mutable table node in the tree being built.
///
/// `defined` records that an explicit `[header]` targeted this table;
/// `dotted` records that the table only exists as a key prefix on the
/// left-hand side of an assignment.
struct TableNode {
    entries: Vec<(String, Node)>,
    defined: bool,
    dotted: bool,
}

impl TableNode {
    fn new(defined: bool, dotted: bool) -> Self {
        Self {
            entries: Vec::new(),
            defined,
            dotted,
        }
    }

    fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn insert(&mut self, key: String, node: Node) {
        debug_assert!(!self.contains(&key), "duplicate key segment {key:?}");
        self.entries.push((key, node));
    }
}

/// An array of tables. Non-empty once created; the last element is the
/// implicit target for all further descent.
struct TableArrayNode {
    elems: Vec<TableNode>,
}

impl TableArrayNode {
    fn last(&self) -> &TableNode {
        self.elems.last().expect("table array is never empty")
    }

    fn last_mut(&mut self) -> &mut TableNode {
        self.elems.last_mut().expect("table array is never empty")
    }
}

/// Returns the table at `key` below `tbl`, creating any missing ancestors
/// as `defined=dotted` tables along the way. Descent through a table array
/// lands in its last element.
fn make_subtable<'a>(mut tbl: &'a mut TableNode, key: &[String], dotted: bool) -> &'a mut TableNode {
    for seg in key {
        if !tbl.contains(seg) {
            tbl.insert(seg.clone(), Node::Table(TableNode::new(dotted, dotted)));
        }
        tbl = match tbl.get_mut(seg).expect("segment just ensured") {
            Node::Table(t) => t,
            Node::Array(a) => a.last_mut(),
            Node::Leaf(_) => unreachable!("key path traverses a value at {seg:?}"),
        };
    }
    tbl
}

/// The evolving TOML tree plus the currently active table.
///
/// The grammar emitter consults the query methods to decide which keys and
/// headers are still legal, then mutates the tree in lock-step with every
/// emission. Precondition violations here are generator bugs and panic.
pub(crate) struct Context {
    root: TableNode,
    /// Key path of the active table; empty means the root table.
    active: KeyPath,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self {
            root: TableNode::new(true, false),
            active: Vec::new(),
        }
    }

    fn active_table(&self) -> &TableNode {
        let mut tbl = &self.root;
        for seg in &self.active {
            tbl = match tbl.get(seg).expect("active path segment missing") {
                Node::Table(t) => t,
                Node::Array(a) => a.last(),
                Node::Leaf(_) => unreachable!("active path reaches a value"),
            };
        }
        tbl
    }

    fn active_table_mut(&mut self) -> &mut TableNode {
        let Context { root, active } = self;
        let mut tbl = root;
        for seg in active.iter() {
            tbl = match tbl.get_mut(seg).expect("active path segment missing") {
                Node::Table(t) => t,
                Node::Array(a) => a.last_mut(),
                Node::Leaf(_) => unreachable!("active path reaches a value"),
            };
        }
        tbl
    }

    /// Defines and activates the table at `key`, creating implicit parents.
    ///
    /// The table must not already be defined, dotted, an array, or a value.
    pub(crate) fn open_table(&mut self, key: &[String]) {
        trace!("open table {key:?}");
        let (last, parents) = key.split_last().expect("header key is never empty");
        let tbl = make_subtable(&mut self.root, parents, false);
        if !tbl.contains(last) {
            tbl.insert(last.clone(), Node::Table(TableNode::new(false, false)));
        }
        let sub = match tbl.get_mut(last).expect("segment just ensured") {
            Node::Table(t) => t,
            Node::Array(_) => unreachable!("table header targets a table array"),
            Node::Leaf(_) => unreachable!("table header targets a value"),
        };
        assert!(!sub.dotted, "table header targets dotted table: {key:?}");
        assert!(!sub.defined, "table defined twice: {key:?}");
        sub.defined = true;
        self.active = key.to_vec();
        self.debug_validate();
    }

    /// Creates the table array at `key` if needed, appends a fresh element,
    /// and makes that element the active table.
    pub(crate) fn open_table_array(&mut self, key: &[String]) {
        trace!("open table array {key:?}");
        let (last, parents) = key.split_last().expect("header key is never empty");
        let tbl = make_subtable(&mut self.root, parents, false);
        if !tbl.contains(last) {
            tbl.insert(last.clone(), Node::Array(TableArrayNode { elems: Vec::new() }));
        }
        match tbl.get_mut(last).expect("segment just ensured") {
            Node::Array(a) => a.elems.push(TableNode::new(true, false)),
            Node::Table(_) => unreachable!("array header targets a plain table"),
            Node::Leaf(_) => unreachable!("array header targets a value"),
        }
        self.active = key.to_vec();
        self.debug_validate();
    }

    /// Inserts a key-value pair into the active table, materializing the
    /// dotted prefix of `key` as dotted tables.
    pub(crate) fn assign(&mut self, key: &[String], value: Value) {
        trace!("assign {key:?} = {value:?}");
        let (last, parents) = key.split_last().expect("assigned key is never empty");
        let tbl = make_subtable(self.active_table_mut(), parents, true);
        assert!(!tbl.contains(last), "key assigned twice: {key:?}");
        tbl.insert(last.clone(), Node::Leaf(value));
        self.debug_validate();
    }

    /// All fully-assigned leaf paths below the active table.
    pub(crate) fn active_item_keys(&self) -> Vec<KeyPath> {
        let mut keys = Vec::new();
        collect_item_keys(self.active_table(), &mut Vec::new(), &mut keys);
        keys
    }

    /// All dotted-table prefixes below the active table; these may be reused
    /// as prefixes by later assignments.
    pub(crate) fn active_item_prefixes(&self) -> Vec<KeyPath> {
        let mut keys = Vec::new();
        collect_dotted_prefixes(self.active_table(), &mut Vec::new(), &mut keys);
        keys
    }

    /// Direct children of the active table that are header-made tables or
    /// table arrays; forbidden ground for assignments.
    pub(crate) fn active_subtable_keys(&self) -> Vec<KeyPath> {
        let mut keys = Vec::new();
        for (p, node) in &self.active_table().entries {
            match node {
                Node::Table(t) if !t.dotted => keys.push(vec![p.clone()]),
                Node::Array(_) => keys.push(vec![p.clone()]),
                _ => {}
            }
        }
        keys
    }

    /// All fully-assigned leaf paths in the whole tree.
    pub(crate) fn all_item_keys(&self) -> Vec<KeyPath> {
        let mut keys = Vec::new();
        collect_item_keys(&self.root, &mut Vec::new(), &mut keys);
        keys
    }

    /// All table and table-array paths in the whole tree.
    ///
    /// `defined` filters plain tables by their defined flag; `array` selects
    /// only arrays (`Some(true)`) or only plain tables (`Some(false)`).
    pub(crate) fn all_table_keys(
        &self,
        defined: Option<bool>,
        array: Option<bool>,
    ) -> Vec<KeyPath> {
        let mut keys = Vec::new();
        collect_table_keys(&self.root, &mut Vec::new(), defined, array, &mut keys);
        keys
    }

    /// Converts the tree into the model [`Value`] a parser must recover.
    /// Pure; calling it twice yields identical values.
    pub(crate) fn finalize(&self) -> Value {
        Value::Table(simplify(&self.root))
    }

    fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        validate_table(&self.root);
    }
}

fn collect_item_keys(tbl: &TableNode, path: &mut KeyPath, out: &mut Vec<KeyPath>) {
    for (p, node) in &tbl.entries {
        path.push(p.clone());
        match node {
            Node::Table(t) => collect_item_keys(t, path, out),
            Node::Array(a) => collect_item_keys(a.last(), path, out),
            Node::Leaf(_) => out.push(path.clone()),
        }
        path.pop();
    }
}

fn collect_dotted_prefixes(tbl: &TableNode, path: &mut KeyPath, out: &mut Vec<KeyPath>) {
    for (p, node) in &tbl.entries {
        if let Node::Table(t) = node {
            if t.dotted {
                path.push(p.clone());
                out.push(path.clone());
                collect_dotted_prefixes(t, path, out);
                path.pop();
            }
        }
    }
}

fn collect_table_keys(
    tbl: &TableNode,
    path: &mut KeyPath,
    defined: Option<bool>,
    array: Option<bool>,
    out: &mut Vec<KeyPath>,
) {
    for (p, node) in &tbl.entries {
        path.push(p.clone());
        match node {
            Node::Table(t) => {
                if array != Some(true) && defined.is_none_or(|d| d == t.defined) {
                    out.push(path.clone());
                }
                collect_table_keys(t, path, defined, array, out);
            }
            Node::Array(a) => {
                if array != Some(false) {
                    out.push(path.clone());
                }
                collect_table_keys(a.last(), path, defined, array, out);
            }
            Node::Leaf(_) => {}
        }
        path.pop();
    }
}

fn simplify(tbl: &TableNode) -> Table {
    let mut out = Table::new();
    for (k, node) in &tbl.entries {
        let v = match node {
            Node::Table(t) => Value::Table(simplify(t)),
            Node::Array(a) => {
                Value::Array(a.elems.iter().map(|e| Value::Table(simplify(e))).collect())
            }
            Node::Leaf(v) => v.clone(),
        };
        out.insert(k.clone(), v);
    }
    out
}

#[cfg(debug_assertions)]
fn validate_table(tbl: &TableNode) {
    for (i, (k, _)) in tbl.entries.iter().enumerate() {
        for (other, _) in &tbl.entries[i + 1..] {
            assert!(k != other, "duplicate key segment {k:?}");
        }
    }
    for (k, node) in &tbl.entries {
        match node {
            Node::Table(t) => {
                if t.dotted {
                    assert!(
                        has_leaf_descendant(t),
                        "dotted table {k:?} holds no value"
                    );
                }
                validate_table(t);
            }
            Node::Array(a) => {
                assert!(!a.elems.is_empty(), "empty table array {k:?}");
                for elem in &a.elems {
                    validate_table(elem);
                }
            }
            Node::Leaf(_) => {}
        }
    }
}

#[cfg(debug_assertions)]
fn has_leaf_descendant(tbl: &TableNode) -> bool {
    tbl.entries.iter().any(|(_, node)| match node {
        Node::Leaf(_) => true,
        Node::Table(t) => has_leaf_descendant(t),
        Node::Array(_) => false,
    })
}
