//! Runtime objects for the interpreter
//!
//! Scalars are plain values. Strings and containers live behind
//! `Rc<RefCell<..>>` so that every binding of the same object observes
//! mutation by built-ins such as `push` and `pop`.

use super::{EnvRef, InterpResult, RuntimeError};
use crate::ast::{BlockStatement, HeapElement, write_list};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};
use std::fmt;
use std::rc::Rc;

/// Shared mutable cell used by strings and containers
pub type Shared<T> = Rc<RefCell<T>>;

/// Host function signature for built-ins
pub type BuiltinFn = fn(&[Object]) -> InterpResult<Object>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(Shared<String>),
    Null,
    /// Wraps the payload of a `return` until a call or the program unwraps it
    ReturnValue(Box<Object>),
    /// First-class runtime error, as returned from `Interpreter::eval_program`
    Error(String),
    Function(Rc<Function>),
    Builtin(Builtin),
    Array(Shared<Vec<Object>>),
    HashMap(Shared<BTreeMap<HashKey, (Object, Object)>>),
    HashSet(Shared<BTreeMap<HashKey, Object>>),
    /// Top of the stack is the last element
    Stack(Shared<Vec<Object>>),
    Queue(Shared<VecDeque<Object>>),
    Deque(Shared<VecDeque<Object>>),
    MaxHeap(Shared<Heap>),
    MinHeap(Shared<Heap>),
}

/// User-defined function closing over its defining environment
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: EnvRef,
}

// The captured environment usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Named host function
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Object {
    pub fn string(s: impl Into<String>) -> Self {
        Object::Str(Rc::new(RefCell::new(s.into())))
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn stack(elements: Vec<Object>) -> Self {
        Object::Stack(Rc::new(RefCell::new(elements)))
    }

    pub fn queue(elements: VecDeque<Object>) -> Self {
        Object::Queue(Rc::new(RefCell::new(elements)))
    }

    pub fn deque(elements: VecDeque<Object>) -> Self {
        Object::Deque(Rc::new(RefCell::new(elements)))
    }

    pub fn hashmap(entries: BTreeMap<HashKey, (Object, Object)>) -> Self {
        Object::HashMap(Rc::new(RefCell::new(entries)))
    }

    pub fn hashset(members: BTreeMap<HashKey, Object>) -> Self {
        Object::HashSet(Rc::new(RefCell::new(members)))
    }

    pub fn heap(heap: Heap) -> Self {
        let order = heap.order;
        let cell = Rc::new(RefCell::new(heap));
        match order {
            HeapOrder::Max => Object::MaxHeap(cell),
            HeapOrder::Min => Object::MinHeap(cell),
        }
    }

    /// Type tag used in error messages, `type()` and hash keys
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Array(_) => "ARRAY",
            Object::HashMap(_) => "HASHMAP",
            Object::HashSet(_) => "HASHSET",
            Object::Stack(_) => "STACK",
            Object::Queue(_) => "QUEUE",
            Object::Deque(_) => "DEQUE",
            Object::MaxHeap(_) => "MAXHEAP",
            Object::MinHeap(_) => "MINHEAP",
        }
    }

    /// Truthiness: `false`, `null` and integer zero are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(b) => *b,
            Object::Null => false,
            Object::Integer(n) => *n != 0,
            _ => true,
        }
    }

    /// Result of prefix `!`.
    ///
    /// Not the negation of [`Object::is_truthy`]: strings, containers and
    /// functions are truthy, yet `!` of them is also `false`.
    pub fn bang(&self) -> bool {
        match self {
            Object::Boolean(b) => !*b,
            Object::Null => true,
            Object::Integer(n) => *n == 0,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Reference identity, the fallback for `==` on non-scalar operands.
    ///
    /// Booleans and null compare by value, which matches singleton identity.
    pub fn same_identity(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => Rc::ptr_eq(a, b),
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
            (Object::HashMap(a), Object::HashMap(b)) => Rc::ptr_eq(a, b),
            (Object::HashSet(a), Object::HashSet(b)) => Rc::ptr_eq(a, b),
            (Object::Stack(a), Object::Stack(b)) => Rc::ptr_eq(a, b),
            (Object::Queue(a), Object::Queue(b)) => Rc::ptr_eq(a, b),
            (Object::Deque(a), Object::Deque(b)) => Rc::ptr_eq(a, b),
            (Object::MaxHeap(a), Object::MaxHeap(b)) => Rc::ptr_eq(a, b),
            (Object::MinHeap(a), Object::MinHeap(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural hash identity: type tag plus canonical string
    pub fn hash_key(&self) -> HashKey {
        HashKey {
            type_tag: self.type_name(),
            repr: self.inspect(),
        }
    }

    /// Canonical display string
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{n}"),
            Object::Boolean(b) => write!(f, "{b}"),
            Object::Str(s) => f.write_str(&s.borrow()),
            Object::Null => f.write_str("NULL"),
            Object::ReturnValue(value) => write!(f, "{value}"),
            Object::Error(message) => write!(f, "error: {message}"),
            Object::Function(func) => {
                f.write_str("def(")?;
                write_list(f, &func.parameters)?;
                write!(f, ") {}", func.body)
            }
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::Array(elements) => guarded(elements, f, "[...]", |f| {
                f.write_str("[")?;
                write_list(f, &elements.borrow())?;
                f.write_str("]")
            }),
            Object::HashMap(entries) => guarded(entries, f, "{...}", |f| {
                f.write_str("{")?;
                for (i, (key, value)) in entries.borrow().values().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }),
            Object::HashSet(members) => guarded(members, f, "hashset<>{...}", |f| {
                let members: Vec<_> = members.borrow().values().cloned().collect();
                write_tagged(f, "hashset<>", &members)
            }),
            Object::Stack(elements) => guarded(elements, f, "stack<>{...}", |f| {
                write_tagged(f, "stack<>", &elements.borrow())
            }),
            Object::Queue(elements) => guarded(elements, f, "queue<>{...}", |f| {
                let elements: Vec<_> = elements.borrow().iter().cloned().collect();
                write_tagged(f, "queue<>", &elements)
            }),
            Object::Deque(elements) => guarded(elements, f, "deque<>{...}", |f| {
                let elements: Vec<_> = elements.borrow().iter().cloned().collect();
                write_tagged(f, "deque<>", &elements)
            }),
            Object::MaxHeap(heap) | Object::MinHeap(heap) => {
                let heap = heap.borrow();
                let opener = format!("{}<{}>", heap.order.keyword(), heap.element);
                write_tagged(f, &opener, &heap.pop_order())
            }
        }
    }
}

thread_local! {
    /// Containers whose rendering is in progress, outermost first
    static RENDERING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Render `cell` unless it is already being rendered further up, in which
/// case `placeholder` stands in for it. Keeps `inspect` and `hash_key`
/// finite for a container pushed into itself.
fn guarded<T>(
    cell: &Shared<T>,
    f: &mut fmt::Formatter<'_>,
    placeholder: &str,
    render: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let ptr = Rc::as_ptr(cell) as *const ();
    let entered = RENDERING.with(|active| {
        let mut active = active.borrow_mut();
        if active.contains(&ptr) {
            false
        } else {
            active.push(ptr);
            true
        }
    });
    if !entered {
        return f.write_str(placeholder);
    }
    let result = render(f);
    RENDERING.with(|active| active.borrow_mut().pop());
    result
}

fn write_tagged(f: &mut fmt::Formatter<'_>, opener: &str, elements: &[Object]) -> fmt::Result {
    write!(f, "{opener}{{")?;
    write_list(f, elements)?;
    f.write_str("}")
}

/// Key for hash maps and hash sets.
///
/// Two objects collide exactly when their type tag and `inspect()` agree.
/// Ordering is by tag and then by string, which fixes display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey {
    pub type_tag: &'static str,
    pub repr: String,
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

/// Heap ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapOrder {
    Max,
    Min,
}

impl HeapOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            HeapOrder::Max => "maxheap",
            HeapOrder::Min => "minheap",
        }
    }
}

/// Element stored in a heap
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum HeapValue {
    Int(i64),
    Str(String),
}

impl HeapValue {
    fn to_object(&self) -> Object {
        match self {
            HeapValue::Int(n) => Object::Integer(*n),
            HeapValue::Str(s) => Object::string(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapSlot {
    value: HeapValue,
    order: HeapOrder,
}

impl Ord for HeapSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.order {
            HeapOrder::Max => self.value.cmp(&other.value),
            HeapOrder::Min => other.value.cmp(&self.value),
        }
    }
}

impl PartialOrd for HeapSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of integers or strings, typed at construction
#[derive(Debug, Clone)]
pub struct Heap {
    order: HeapOrder,
    element: HeapElement,
    slots: BinaryHeap<HeapSlot>,
}

impl Heap {
    pub fn new(order: HeapOrder, element: HeapElement) -> Self {
        Heap {
            order,
            element,
            slots: BinaryHeap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Push a value, rejecting anything but the declared element type
    pub fn push(&mut self, value: &Object) -> InterpResult<()> {
        let value = match (self.element, value) {
            (HeapElement::Int, Object::Integer(n)) => HeapValue::Int(*n),
            (HeapElement::Str, Object::Str(s)) => HeapValue::Str(s.borrow().clone()),
            _ => {
                let expected = match self.element {
                    HeapElement::Int => "INTEGER",
                    HeapElement::Str => "STRING",
                };
                return Err(RuntimeError::heap_element_mismatch(
                    expected,
                    value.type_name(),
                ));
            }
        };
        self.slots.push(HeapSlot {
            value,
            order: self.order,
        });
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Object> {
        self.slots.pop().map(|slot| slot.value.to_object())
    }

    /// Elements in the order successive pops would return them
    pub fn pop_order(&self) -> Vec<Object> {
        let mut sorted = self.slots.clone().into_sorted_vec();
        sorted.reverse();
        sorted.iter().map(|slot| slot.value.to_object()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Object> {
        values.iter().map(|n| Object::Integer(*n)).collect()
    }

    #[test]
    fn test_truthiness() {
        assert!(Object::Boolean(true).is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(!Object::Null.is_truthy());
        assert!(!Object::Integer(0).is_truthy());
        assert!(Object::Integer(-3).is_truthy());
        assert!(Object::string("").is_truthy());
        assert!(Object::array(vec![]).is_truthy());
    }

    #[test]
    fn test_bang_is_asymmetric_for_non_scalars() {
        assert!(!Object::Boolean(true).bang());
        assert!(Object::Boolean(false).bang());
        assert!(Object::Null.bang());
        assert!(Object::Integer(0).bang());
        assert!(!Object::Integer(5).bang());
        // truthy and `!` is false as well
        assert!(!Object::string("x").bang());
    }

    #[test]
    fn test_scalar_inspect() {
        assert_eq!(Object::Integer(-7).inspect(), "-7");
        assert_eq!(Object::Boolean(true).inspect(), "true");
        assert_eq!(Object::Null.inspect(), "NULL");
        assert_eq!(Object::string("hi there").inspect(), "hi there");
        assert_eq!(Object::Error("boom".to_string()).inspect(), "error: boom");
        assert_eq!(
            Object::ReturnValue(Box::new(Object::Integer(1))).inspect(),
            "1"
        );
    }

    #[test]
    fn test_container_inspect() {
        assert_eq!(Object::array(ints(&[1, 2, 3])).inspect(), "[1, 2, 3]");
        assert_eq!(Object::stack(ints(&[1, 2])).inspect(), "stack<>{1, 2}");
        assert_eq!(
            Object::queue(ints(&[3, 4]).into()).inspect(),
            "queue<>{3, 4}"
        );
        assert_eq!(Object::deque(VecDeque::new()).inspect(), "deque<>{}");
    }

    #[test]
    fn test_hashmap_inspect_orders_by_key() {
        let mut entries = BTreeMap::new();
        for (k, v) in [("b", 2), ("a", 1)] {
            let key = Object::string(k);
            entries.insert(key.hash_key(), (key, Object::Integer(v)));
        }
        assert_eq!(Object::hashmap(entries).inspect(), "{a: 1, b: 2}");
    }

    #[test]
    fn test_hash_key_is_type_and_repr() {
        assert_eq!(Object::Integer(1).hash_key(), Object::Integer(1).hash_key());
        assert_ne!(Object::Integer(1).hash_key(), Object::string("1").hash_key());
        assert_eq!(
            Object::array(ints(&[1])).hash_key(),
            Object::array(ints(&[1])).hash_key()
        );
    }

    #[test]
    fn test_same_identity() {
        let arr = Object::array(ints(&[1]));
        assert!(arr.same_identity(&arr.clone()));
        assert!(!arr.same_identity(&Object::array(ints(&[1]))));
        assert!(Object::Boolean(false).same_identity(&Object::Boolean(false)));
        assert!(!Object::Null.same_identity(&Object::Boolean(false)));
    }

    #[test]
    fn test_shared_cells_alias() {
        let a = Object::array(vec![]);
        let b = a.clone();
        if let Object::Array(cells) = &b {
            cells.borrow_mut().push(Object::Integer(9));
        }
        assert_eq!(a.inspect(), "[9]");
    }

    #[test]
    fn test_max_heap_pops_largest() {
        let mut heap = Heap::new(HeapOrder::Max, HeapElement::Int);
        for n in [3, 9, 1, 4] {
            heap.push(&Object::Integer(n)).unwrap();
        }
        assert_eq!(Object::heap(heap.clone()).inspect(), "maxheap<int>{9, 4, 3, 1}");
        assert_eq!(heap.pop().map(|o| o.inspect()), Some("9".to_string()));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn test_min_heap_of_strings() {
        let mut heap = Heap::new(HeapOrder::Min, HeapElement::Str);
        for s in ["pear", "apple", "fig"] {
            heap.push(&Object::string(s)).unwrap();
        }
        let obj = Object::heap(heap);
        assert_eq!(obj.type_name(), "MINHEAP");
        assert_eq!(obj.inspect(), "minheap<string>{apple, fig, pear}");
    }

    #[test]
    fn test_heap_rejects_wrong_element_type() {
        let mut heap = Heap::new(HeapOrder::Max, HeapElement::Int);
        let err = heap.push(&Object::string("x")).unwrap_err();
        assert_eq!(
            err.message,
            "heap element type mismatch -> expected INTEGER, got STRING"
        );
        assert!(heap.is_empty());
    }
}
