use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::xml::tree::{Document, Element, Node};

/// Serialize with a UTF-8 declaration. Childless elements are written
/// self-closing; whitespace is written exactly as it appears in the tree.
pub fn write_document(doc: &Document) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    newline(&mut writer)?;
    for node in &doc.prolog {
        write_node(&mut writer, node)?;
        newline(&mut writer)?;
    }
    write_element(&mut writer, &doc.root)?;
    newline(&mut writer)?;
    for node in &doc.epilog {
        write_node(&mut writer, node)?;
        newline(&mut writer)?;
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn newline(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(e) => write_element(writer, e)?,
        Node::Text(t) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(t.as_str()))))?
        }
        Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
        Node::Comment(t) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
        }
        Node::ProcessingInstruction(t) => {
            writer.write_event(Event::PI(BytesPI::new(t.as_str())))?
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse::parse_document;

    #[test]
    fn writes_declaration_attributes_and_self_closing_tags() {
        let doc = Document::new(
            Element::new("Items").with_child(
                Element::new("BaseDamage")
                    .with_attr("Min", "3")
                    .with_attr("Note", "a<b & \"c\""),
            ),
        );
        let out = write_document(&doc).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Items><BaseDamage Min=\"3\" Note=\"a&lt;b &amp; &quot;c&quot;\"/></Items>\n"
        );
    }

    #[test]
    fn parse_write_is_stable() {
        let src = "<?xml version='1.0' encoding='UTF-8'?>\n<!--c-->\n<Items>\n  <Item Id=\"x\">a &amp; b</Item>\n  <Empty></Empty>\n  <![CDATA[raw <text>]]>\n</Items>\n";
        let first = write_document(&parse_document(src).unwrap()).unwrap();
        let second = write_document(&parse_document(&first).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("<Item Id=\"x\">a &amp; b</Item>"));
        assert!(first.contains("<Empty/>"));
        assert!(first.contains("<![CDATA[raw <text>]]>"));
        assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!--c-->\n<Items>"));
    }
}
