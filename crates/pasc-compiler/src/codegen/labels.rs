//! Label interning.
//!
//! Every named label is created once per compilation by the
//! [`LabelRegistry`]; later requests for the same name return a handle to the
//! same label, so all jumps and calls to it share one identity. Anonymous
//! labels get generated names of the form `__L{n}__`, which cannot collide
//! with a program path.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// A jump or call target. Cloning shares the label.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Label(Rc<str>);

impl Label {
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether both handles come from the same registry entry.
    pub fn same_as(&self, other: &Label) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-compilation label table.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    labels: FxHashMap<Rc<str>, Label>,
    next_anonymous: u32,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label called `name`, created on first request.
    pub fn named(&mut self, name: &str) -> Label {
        if let Some(label) = self.labels.get(name) {
            return label.clone();
        }
        let label = Label(Rc::from(name));
        self.labels.insert(label.0.clone(), label.clone());
        label
    }

    /// A label with a fresh generated name.
    pub fn fresh(&mut self) -> Label {
        loop {
            let name = format!("__L{}__", self.next_anonymous);
            self.next_anonymous += 1;
            if !self.labels.contains_key(name.as_str()) {
                return self.named(&name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
