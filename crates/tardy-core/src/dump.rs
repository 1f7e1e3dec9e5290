//! Diagnostic state dumps.
//!
//! A module describes its internal state by walking a [`StateDumper`]:
//! scalar fields are written with [`StateDumper::write`], nested state is
//! bracketed by `begin_object`/`end_object` and `begin_array`/`end_array`.
//! The dumper decides what to do with it. [`JsonDumper`] collects the walk
//! into a `serde_json::Value` tree, which is what tests and debug tooling use.
//!
//! ```ignore
//! let mut dumper = JsonDumper::new();
//! engine.dump(&mut dumper);
//! println!("{:#}", dumper.finish());
//! ```
//!
//! Dumping allocates and must never be triggered from the audio thread.

use serde_json::{Map, Value};

/// Receiver of a structured key/value state walk.
pub trait StateDumper {
    /// Write a scalar field. Inside an array, `name` is ignored.
    fn write(&mut self, name: &str, value: Value);

    /// Open a nested object. Inside an array, `name` is ignored.
    fn begin_object(&mut self, name: &str);

    /// Close the innermost object.
    fn end_object(&mut self);

    /// Open a nested array.
    fn begin_array(&mut self, name: &str);

    /// Close the innermost array.
    fn end_array(&mut self);
}

/// Anything that can describe its state to a [`StateDumper`].
pub trait Dumpable {
    fn dump(&self, v: &mut dyn StateDumper);
}

impl dyn StateDumper + '_ {
    /// Write `obj` as a nested object called `name`.
    pub fn write_object(&mut self, name: &str, obj: &dyn Dumpable) {
        self.begin_object(name);
        obj.dump(self);
        self.end_object();
    }
}

enum Frame {
    Object(String, Map<String, Value>),
    Array(String, Vec<Value>),
}

/// [`StateDumper`] that builds a JSON tree.
///
/// Unbalanced `end_*` calls are ignored; frames still open when
/// [`finish`](Self::finish) is called are closed implicitly.
pub struct JsonDumper {
    stack: Vec<Frame>,
}

impl JsonDumper {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::Object(String::new(), Map::new())],
        }
    }

    /// Close any open frames and return the root object.
    pub fn finish(mut self) -> Value {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(Frame::Object(_, map)) => Value::Object(map),
            Some(Frame::Array(_, items)) => Value::Array(items),
            None => Value::Null,
        }
    }

    fn insert(&mut self, name: &str, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::Object(_, map)) => {
                map.insert(name.to_owned(), value);
            }
            Some(Frame::Array(_, items)) => items.push(value),
            None => {}
        }
    }

    fn close(&mut self) {
        // The root frame is never popped here
        if self.stack.len() <= 1 {
            return;
        }
        let (name, value) = match self.stack.pop() {
            Some(Frame::Object(name, map)) => (name, Value::Object(map)),
            Some(Frame::Array(name, items)) => (name, Value::Array(items)),
            None => return,
        };
        self.insert(&name, value);
    }
}

impl Default for JsonDumper {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDumper for JsonDumper {
    fn write(&mut self, name: &str, value: Value) {
        self.insert(name, value);
    }

    fn begin_object(&mut self, name: &str) {
        self.stack.push(Frame::Object(name.to_owned(), Map::new()));
    }

    fn end_object(&mut self) {
        if matches!(self.stack.last(), Some(Frame::Object(..))) {
            self.close();
        }
    }

    fn begin_array(&mut self, name: &str) {
        self.stack.push(Frame::Array(name.to_owned(), Vec::new()));
    }

    fn end_array(&mut self) {
        if matches!(self.stack.last(), Some(Frame::Array(..))) {
            self.close();
        }
    }
}
