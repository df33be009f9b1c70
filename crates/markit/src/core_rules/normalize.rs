//! Line endings and NUL characters

use markit_core::LineIndex;

use super::CoreState;

pub fn rule(state: &mut CoreState) {
    if !state.src.contains(['\r', '\0']) {
        return;
    }
    state.src = state
        .src
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "\u{FFFD}");
    state.line_index = LineIndex::new(&state.src);
}
