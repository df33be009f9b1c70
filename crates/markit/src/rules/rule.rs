//! Ordered, toggleable rule lists.

/// One named entry of a chain
#[derive(Clone)]
pub struct RuleEntry<F> {
    pub name: &'static str,
    pub enabled: bool,
    /// Terminator lists this rule also belongs to (`paragraph`, `list`, ...)
    pub alt: &'static [&'static str],
    pub func: F,
}

/// A chain of rules in registration order
///
/// Toggling only flips `enabled`; order never changes after registration.
#[derive(Clone)]
pub struct Ruler<F> {
    entries: Vec<RuleEntry<F>>,
}

impl<F: Copy> Ruler<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a disabled rule at the end of the chain
    pub fn push(&mut self, name: &'static str, func: F) -> &mut Self {
        self.push_alt(name, &[], func)
    }

    pub fn push_alt(
        &mut self,
        name: &'static str,
        alt: &'static [&'static str],
        func: F,
    ) -> &mut Self {
        self.entries.push(RuleEntry {
            name,
            enabled: false,
            alt,
            func,
        });
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Toggle every entry called `name`; returns whether one exists
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            entry.enabled = enabled;
            found = true;
        }
        found
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name && e.enabled)
    }

    /// Enabled functions in chain order
    pub fn active(&self) -> Vec<F> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.func)
            .collect()
    }

    /// Enabled functions tagged with the terminator list `alt`
    pub fn active_for(&self, alt: &str) -> Vec<F> {
        self.entries
            .iter()
            .filter(|e| e.enabled && e.alt.contains(&alt))
            .map(|e| e.func)
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn entries(&self) -> &[RuleEntry<F>] {
        &self.entries
    }
}

impl<F: Copy> Default for Ruler<F> {
    fn default() -> Self {
        Self::new()
    }
}
