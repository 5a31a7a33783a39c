//! Built-in functions
//!
//! Every built-in checks its own argument count and types and reports
//! misuse as a [`RuntimeError`]; none of them can fault the host.
//! Hash keys are computed before a container is mutably borrowed, since
//! an object may be pushed into itself.

use super::{InterpResult, Object, RuntimeError};

fn expect_args(name: &str, args: &[Object], want: usize) -> InterpResult<()> {
    if args.len() == want {
        Ok(())
    } else {
        Err(RuntimeError::wrong_argument_count(name, want, args.len()))
    }
}

fn unsupported(name: &str, arg: &Object) -> RuntimeError {
    RuntimeError::unsupported_argument(name, arg.type_name())
}

/// print(a, ...) writes each argument separated by a space
pub(super) fn builtin_print(args: &[Object]) -> InterpResult<Object> {
    let line = args
        .iter()
        .map(Object::inspect)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(Object::Null)
}

/// len(x) and size(x)
pub(super) fn builtin_len(args: &[Object]) -> InterpResult<Object> {
    expect_args("len", args, 1)?;
    let len = match &args[0] {
        Object::Str(s) => s.borrow().chars().count(),
        Object::Array(items) | Object::Stack(items) => items.borrow().len(),
        Object::Queue(items) | Object::Deque(items) => items.borrow().len(),
        Object::HashMap(entries) => entries.borrow().len(),
        Object::HashSet(members) => members.borrow().len(),
        Object::MaxHeap(heap) | Object::MinHeap(heap) => heap.borrow().len(),
        other => return Err(unsupported("len", other)),
    };
    Ok(Object::Integer(len as i64))
}

/// push(c, v) appends to the natural end of any sequence
pub(super) fn builtin_push(args: &[Object]) -> InterpResult<Object> {
    expect_args("push", args, 2)?;
    let value = &args[1];
    match &args[0] {
        Object::Array(items) | Object::Stack(items) => items.borrow_mut().push(value.clone()),
        Object::Queue(items) | Object::Deque(items) => {
            items.borrow_mut().push_back(value.clone())
        }
        Object::Str(s) => {
            let Object::Str(suffix) = value else {
                return Err(unsupported("push", value));
            };
            let suffix = suffix.borrow().clone();
            s.borrow_mut().push_str(&suffix);
        }
        Object::MaxHeap(heap) | Object::MinHeap(heap) => heap.borrow_mut().push(value)?,
        Object::HashSet(members) => {
            let key = value.hash_key();
            members.borrow_mut().insert(key, value.clone());
        }
        other => return Err(unsupported("push", other)),
    }
    Ok(Object::Null)
}

pub(super) fn builtin_push_back(args: &[Object]) -> InterpResult<Object> {
    expect_args("push_back", args, 2)?;
    match &args[0] {
        Object::Deque(items) | Object::Queue(items) => {
            items.borrow_mut().push_back(args[1].clone())
        }
        Object::Array(items) => items.borrow_mut().push(args[1].clone()),
        other => return Err(unsupported("push_back", other)),
    }
    Ok(Object::Null)
}

pub(super) fn builtin_push_front(args: &[Object]) -> InterpResult<Object> {
    expect_args("push_front", args, 2)?;
    match &args[0] {
        Object::Deque(items) => items.borrow_mut().push_front(args[1].clone()),
        other => return Err(unsupported("push_front", other)),
    }
    Ok(Object::Null)
}

/// pop(c) removes and returns the element the container hands out next
pub(super) fn builtin_pop(args: &[Object]) -> InterpResult<Object> {
    expect_args("pop", args, 1)?;
    let target = &args[0];
    let popped = match target {
        Object::Array(items) | Object::Stack(items) => items.borrow_mut().pop(),
        Object::Queue(items) => items.borrow_mut().pop_front(),
        Object::Deque(items) => items.borrow_mut().pop_back(),
        Object::Str(s) => s.borrow_mut().pop().map(|c| Object::string(c)),
        Object::MaxHeap(heap) | Object::MinHeap(heap) => heap.borrow_mut().pop(),
        other => return Err(unsupported("pop", other)),
    };
    popped.ok_or_else(|| RuntimeError::empty_container("pop", target.type_name()))
}

pub(super) fn builtin_pop_back(args: &[Object]) -> InterpResult<Object> {
    expect_args("pop_back", args, 1)?;
    match &args[0] {
        Object::Deque(items) => items
            .borrow_mut()
            .pop_back()
            .ok_or_else(|| RuntimeError::empty_container("pop_back", "DEQUE")),
        other => Err(unsupported("pop_back", other)),
    }
}

pub(super) fn builtin_pop_front(args: &[Object]) -> InterpResult<Object> {
    expect_args("pop_front", args, 1)?;
    let target = &args[0];
    match target {
        Object::Deque(items) | Object::Queue(items) => items
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| RuntimeError::empty_container("pop_front", target.type_name())),
        other => Err(unsupported("pop_front", other)),
    }
}

/// insert(set, v) or insert(map, k, v); overwrites an equal key
pub(super) fn builtin_insert(args: &[Object]) -> InterpResult<Object> {
    match args.first() {
        Some(Object::HashSet(members)) => {
            expect_args("insert", args, 2)?;
            let key = args[1].hash_key();
            members.borrow_mut().insert(key, args[1].clone());
        }
        Some(Object::HashMap(entries)) => {
            expect_args("insert", args, 3)?;
            let key = args[1].hash_key();
            entries
                .borrow_mut()
                .insert(key, (args[1].clone(), args[2].clone()));
        }
        Some(other) => return Err(unsupported("insert", other)),
        None => return Err(RuntimeError::wrong_argument_count("insert", 2, 0)),
    }
    Ok(Object::Null)
}

/// remove(set, v) or remove(map, k); a missing key is an error
pub(super) fn builtin_remove(args: &[Object]) -> InterpResult<Object> {
    expect_args("remove", args, 2)?;
    let key = args[1].hash_key();
    let removed = match &args[0] {
        Object::HashSet(members) => members.borrow_mut().remove(&key).is_some(),
        Object::HashMap(entries) => entries.borrow_mut().remove(&key).is_some(),
        other => return Err(unsupported("remove", other)),
    };
    if removed {
        Ok(Object::Null)
    } else {
        Err(RuntimeError::missing_member("remove", &key.repr))
    }
}

/// find(c, v): index (or -1) in strings and arrays, membership in maps and sets
pub(super) fn builtin_find(args: &[Object]) -> InterpResult<Object> {
    expect_args("find", args, 2)?;
    let needle = &args[1];
    match &args[0] {
        Object::Str(haystack) => {
            let Object::Str(pattern) = needle else {
                return Err(unsupported("find", needle));
            };
            let haystack = haystack.borrow();
            let index = haystack
                .find(pattern.borrow().as_str())
                .map(|byte| haystack[..byte].chars().count() as i64)
                .unwrap_or(-1);
            Ok(Object::Integer(index))
        }
        Object::Array(items) => {
            let key = needle.hash_key();
            let index = items
                .borrow()
                .iter()
                .position(|item| item.hash_key() == key)
                .map(|i| i as i64)
                .unwrap_or(-1);
            Ok(Object::Integer(index))
        }
        Object::HashMap(entries) => Ok(Object::Boolean(
            entries.borrow().contains_key(&needle.hash_key()),
        )),
        Object::HashSet(members) => Ok(Object::Boolean(
            members.borrow().contains_key(&needle.hash_key()),
        )),
        other => Err(unsupported("find", other)),
    }
}

/// type(x) returns the type tag as a string
pub(super) fn builtin_type(args: &[Object]) -> InterpResult<Object> {
    expect_args("type", args, 1)?;
    Ok(Object::string(args[0].type_name()))
}
