use serde::{Deserialize, Serialize};

/// Keys `1`..`9` select classes, so more than nine cannot be reached.
pub const MAX_CLASSES: usize = 9;

const DEFAULT_CLASSES: [&str; 4] = ["RR Lyrae", "Eclipsing Binary", "Cepheid", "Other"];

/// Index into a [`ClassSet`]. Only constructed through [`ClassSet::class`],
/// so it is always in range for the set that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered class names available to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassSet {
    names: Vec<String>,
}

impl Default for ClassSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASSES.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

impl ClassSet {
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        if names.is_empty() {
            return Err("at least one label class is required".into());
        }
        if names.len() > MAX_CLASSES {
            return Err(format!("at most {MAX_CLASSES} label classes are supported"));
        }
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err("label class names must not be empty".into());
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn class(&self, index: usize) -> Option<ClassId> {
        (index < self.names.len()).then_some(ClassId(index))
    }

    /// Class bound to a number key; `'1'` is the first class.
    pub fn from_key(&self, key: char) -> Option<ClassId> {
        let digit = key.to_digit(10)? as usize;
        digit.checked_sub(1).and_then(|index| self.class(index))
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.names[id.0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
