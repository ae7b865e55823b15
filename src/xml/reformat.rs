//! Cosmetic pass run after patching: one indent unit per nesting level and a
//! blank line between consecutive top-level records. Only whitespace-only
//! text between elements is rewritten.

use crate::xml::tree::{Document, Element, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformatOptions {
    pub indent: String,
    /// Children of the root with this name are separated by a blank line.
    pub record: String,
}

impl Default for ReformatOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            record: "ItemDefinition".to_string(),
        }
    }
}

pub fn reformat(doc: &mut Document, options: &ReformatOptions) {
    indent_element(&mut doc.root, 0, options);
}

fn indent_element(element: &mut Element, depth: usize, options: &ReformatOptions) {
    if !element.has_element_children() {
        return;
    }
    // Mixed content keeps its text untouched; only recurse.
    let mixed = element
        .children
        .iter()
        .any(|n| matches!(n, Node::Text(t) if !t.trim().is_empty()) || matches!(n, Node::CData(_)));
    if !mixed {
        let inner = format!("\n{}", options.indent.repeat(depth + 1));
        let outer = format!("\n{}", options.indent.repeat(depth));
        let separator = format!("\n{inner}");
        let children = std::mem::take(&mut element.children);
        let mut previous_record = false;
        for child in children.into_iter().filter(|n| !n.is_blank_text()) {
            let is_record =
                depth == 0 && matches!(&child, Node::Element(e) if e.name == options.record);
            let gap = if is_record && previous_record {
                separator.clone()
            } else {
                inner.clone()
            };
            element.children.push(Node::Text(gap));
            element.children.push(child);
            previous_record = is_record;
        }
        element.children.push(Node::Text(outer));
    }
    for child in element.elements_mut() {
        indent_element(child, depth + 1, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse::parse_document;
    use crate::xml::write::write_document;

    fn reformat_str(src: &str) -> String {
        let mut doc = parse_document(src).unwrap();
        reformat(&mut doc, &ReformatOptions::default());
        write_document(&doc).unwrap()
    }

    #[test]
    fn indents_nested_elements_and_separates_records() {
        let out = reformat_str(
            "<Items><ItemDefinition Id=\"A0\"><LevelVariations><Level Id=\"0\"><BaseDamage Min=\"1\" Max=\"2\"/></Level></LevelVariations></ItemDefinition>\n\n\n      <ItemDefinition Id=\"A1\"/></Items>",
        );
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<Items>\n  \
<ItemDefinition Id=\"A0\">\n    \
<LevelVariations>\n      \
<Level Id=\"0\">\n        \
<BaseDamage Min=\"1\" Max=\"2\"/>\n      \
</Level>\n    \
</LevelVariations>\n  \
</ItemDefinition>\n\n  \
<ItemDefinition Id=\"A1\"/>\n\
</Items>\n";
        pretty_assertions::assert_eq!(out, expected);
    }

    #[test]
    fn reformat_is_idempotent() {
        let once = reformat_str("<Items>\n<ItemDefinition Id=\"A0\"><X>1</X></ItemDefinition><!-- note --><ItemDefinition Id=\"A1\"/></Items>");
        let twice = reformat_str(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn leaf_text_and_mixed_content_are_preserved() {
        let out = reformat_str("<Items><BaseStatBonus Stat=\"Dodge\"> -20 </BaseStatBonus><P>keep <b>this</b> text</P></Items>");
        assert!(out.contains("<BaseStatBonus Stat=\"Dodge\"> -20 </BaseStatBonus>"));
        assert!(out.contains("<P>keep <b>this</b> text</P>"));
    }
}
