use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MigrationError, Result};
use crate::xml::tree::{Document, Element, Node};

/// Parse a whole document, keeping whitespace text so untouched regions
/// serialize back unchanged. The XML declaration is not kept; the writer
/// always emits its own.
pub fn parse_document(content: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let node = match reader.read_event()? {
            Event::Eof => break,
            Event::Decl(_) | Event::DocType(_) => continue,
            Event::Start(e) => {
                stack.push(start_element(&e)?);
                continue;
            }
            Event::End(_) => {
                let Some(done) = stack.pop() else {
                    return Err(MigrationError::MissingRoot);
                };
                Node::Element(done)
            }
            Event::Empty(e) => Node::Element(start_element(&e)?),
            Event::Text(e) => Node::Text(e.unescape()?.into_owned()),
            Event::CData(e) => Node::CData(String::from_utf8_lossy(&e).into_owned()),
            Event::Comment(e) => Node::Comment(String::from_utf8_lossy(&e).into_owned()),
            Event::PI(e) => Node::ProcessingInstruction(String::from_utf8_lossy(&e).into_owned()),
        };

        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
            continue;
        }
        match node {
            Node::Element(e) if root.is_none() => root = Some(e),
            // Whitespace between top-level nodes is regenerated by the writer.
            Node::Text(_) => {}
            other if root.is_none() => prolog.push(other),
            other => epilog.push(other),
        }
    }

    let root = root.ok_or(MigrationError::MissingRoot)?;
    Ok(Document {
        prolog,
        root,
        epilog,
    })
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_elements_attributes_and_text() {
        let doc = parse_document(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!-- items -->
<Items>
  <ItemDefinition Id="Pistol2" Name="A &amp; B">
    <BaseStatBonus Stat="Dodge">-20</BaseStatBonus>
  </ItemDefinition>
</Items>
"#,
        )
        .unwrap();

        assert_eq!(doc.prolog, vec![Node::Comment(" items ".into())]);
        assert_eq!(doc.root.name, "Items");
        let item = doc.root.child("ItemDefinition").unwrap();
        assert_eq!(item.attr("Id"), Some("Pistol2"));
        assert_eq!(item.attr("Name"), Some("A & B"));
        let bonus = item.child("BaseStatBonus").unwrap();
        assert_eq!(bonus.text(), "-20");
        assert!(doc.root.children[0].is_blank_text());
    }

    #[test]
    fn empty_input_has_no_root() {
        assert!(matches!(parse_document(""), Err(MigrationError::MissingRoot)));
        assert!(matches!(
            parse_document("<!-- only a comment -->"),
            Err(MigrationError::MissingRoot)
        ));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(parse_document("<a><b></a>").is_err());
    }
}
