//! `data-sourcepos="l:c-l:c"` on every tagged node that carries a span

use markit_core::RenderNode;

pub fn hook(node: &RenderNode) -> Option<(String, String)> {
    node.span
        .map(|span| ("data-sourcepos".to_string(), span.to_sourcepos()))
}

#[cfg(test)]
mod tests {
    use markit_core::{Attrs, LineIndex, Meta};

    use super::*;

    #[test]
    fn test_hook_needs_span() {
        let attrs = Attrs::new();
        let meta = Meta::new();
        let mut node = RenderNode::new("paragraph", &attrs, &meta, "");
        assert_eq!(hook(&node), None);
        node.span = Some(LineIndex::new("ab\ncd").span(3, 5));
        assert_eq!(
            hook(&node),
            Some(("data-sourcepos".to_string(), "2:1-2:2".to_string()))
        );
    }
}
