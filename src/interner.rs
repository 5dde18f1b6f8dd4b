/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::collections::HashMap;

/// An interned string handle. Two labels that compare equal always intern to
/// the same `Label`, so downstream maps can key on this small integer instead
/// of the underlying string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

/// Canonicalizes every string seen during a single assembler run. Lives for
/// the lifetime of one `assemble()` call; nothing here is process-global.
#[derive(Debug, Default)]
pub struct StringInterner {
    strings: Vec<String>,
    lookup: HashMap<String, Label>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Label {
        if let Some(&label) = self.lookup.get(s) {
            return label;
        }
        let label = Label(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), label);
        label
    }

    pub fn resolve(&self, label: Label) -> &str {
        &self.strings[label.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_interns_to_same_label() {
        let mut interner = StringInterner::new();
        let a = interner.intern("main");
        let b = interner.intern("main");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_labels() {
        let mut interner = StringInterner::new();
        let a = interner.intern("main");
        let b = interner.intern("loop");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "main");
        assert_eq!(interner.resolve(b), "loop");
    }
}
