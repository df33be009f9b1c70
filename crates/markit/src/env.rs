//! Per-parse tables shared between block and inline scanning

use std::collections::HashMap;

/// A link reference definition `[label]: destination "title"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub destination: String,
    pub title: Option<String>,
}

/// Footnote bookkeeping
///
/// Definitions are keyed by normalized label. Ids are assigned in order of
/// first reference, so `list[id]` is the note rendered as number `id + 1`.
#[derive(Debug, Clone, Default)]
pub struct FootnoteEnv {
    /// Normalized label -> footnote id, only for referenced definitions
    pub ids: HashMap<String, usize>,
    /// Labels that have a definition somewhere in the document
    pub defined: HashMap<String, String>,
    pub list: Vec<FootnoteEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct FootnoteEntry {
    /// Original label, `None` for inline notes
    pub label: Option<String>,
    /// Number of references seen so far
    pub count: usize,
    /// Tokens of an inline note (`^[...]`)
    pub inline: Option<Vec<markit_core::Token>>,
}

impl FootnoteEnv {
    /// Id of a defined label, registering it on first reference
    pub fn reference(&mut self, label: &str) -> Option<(usize, usize)> {
        let key = crate::utilities::normalize_reference(label);
        let original = self.defined.get(&key)?.clone();
        let id = match self.ids.get(&key) {
            Some(id) => *id,
            None => {
                self.list.push(FootnoteEntry {
                    label: Some(original),
                    ..Default::default()
                });
                let id = self.list.len() - 1;
                self.ids.insert(key, id);
                id
            }
        };
        let entry = &mut self.list[id];
        let ref_id = entry.count;
        entry.count += 1;
        Some((id, ref_id))
    }

    /// Reserve an id for an inline note; it is always referenced exactly
    /// once and its tokens are filled in after the body is scanned
    pub fn inline_note(&mut self) -> usize {
        self.list.push(FootnoteEntry {
            label: None,
            count: 1,
            inline: Some(Vec::new()),
        });
        self.list.len() - 1
    }
}

/// Environment of one parse call, discarded afterwards
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// Normalized label -> definition; the first definition of a label wins
    pub references: HashMap<String, LinkReference>,
    pub footnotes: FootnoteEnv,
}
