//! KiCad XML netlist reader.
//!
//! Components come from `<components>/<comp>` elements; attribute fields are
//! looked up by the names configured in [`FieldSettings`]. Sheet size and
//! document id are read from the schematic (`.kicad_sch` or legacy `.sch`)
//! and board (`.kicad_pcb`) files that sit next to the netlist.

use std::path::Path;

use regex::Regex;

use crate::error::Error;
use crate::model::{Component, Group, SheetInfo};
use crate::settings::FieldSettings;
use crate::source::{ComponentSource, group_components};

#[derive(Clone, Debug, Default)]
pub struct Netlist {
    pub components: Vec<Component>,
    pub schematic: SheetInfo,
    pub pcb: SheetInfo,
}

fn child<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Text of an element with KiCad's "~" placeholder treated as empty.
fn text_of(node: Option<roxmltree::Node>) -> String {
    match node.and_then(|n| n.text()).map(str::trim) {
        Some("~") | None => String::new(),
        Some(t) => t.to_string(),
    }
}

/// Custom field of a `<comp>`: `<fields><field name=..>` (KiCad 5+) or
/// `<property name=.. value=..>` (KiCad 6+).
fn comp_field(comp: roxmltree::Node, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let from_fields = child(comp, "fields").and_then(|fields| {
        fields
            .children()
            .find(|f| f.has_tag_name("field") && f.attribute("name") == Some(name))
    });
    if let Some(field) = from_fields {
        return text_of(Some(field));
    }
    comp.children()
        .find(|p| p.has_tag_name("property") && p.attribute("name") == Some(name))
        .and_then(|p| p.attribute("value"))
        .filter(|v| *v != "~")
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

impl Netlist {
    pub fn load(path: &Path, fields: &FieldSettings) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut netlist = Self::parse(&text, fields)?;

        let schematic_doc_id = std::mem::take(&mut netlist.schematic.doc_id);
        netlist.schematic = read_schematic_info(path).unwrap_or_default();
        if netlist.schematic.doc_id.is_empty() {
            netlist.schematic.doc_id = schematic_doc_id;
        }
        netlist.pcb = read_pcb_info(path).unwrap_or_default();

        log::info!(
            "Netlist {}: {} components, schematic {:?}, pcb {:?}",
            path.display(),
            netlist.components.len(),
            netlist.schematic,
            netlist.pcb,
        );
        Ok(netlist)
    }

    /// Parses the netlist text. Only the document id from the root sheet's
    /// title block is known at this point; the sheet sizes stay empty.
    pub fn parse(text: &str, fields: &FieldSettings) -> Result<Self, Error> {
        let xml = roxmltree::Document::parse(text)?;
        let root = xml.root_element();
        if !root.has_tag_name("export") {
            return Err(Error::Netlist(format!(
                "expected <export> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut schematic = SheetInfo::default();
        let root_sheet = child(root, "design").and_then(|design| {
            design
                .children()
                .find(|s| s.has_tag_name("sheet") && s.attribute("name") == Some("/"))
        });
        if let Some(title_block) = root_sheet.and_then(|s| child(s, "title_block")) {
            schematic.doc_id = title_block
                .children()
                .find(|c| c.has_tag_name("comment") && c.attribute("number") == Some("1"))
                .and_then(|c| c.attribute("value"))
                .unwrap_or_default()
                .to_string();
        }

        let mut components = Vec::new();
        if let Some(list) = child(root, "components") {
            for comp in list.children().filter(|n| n.has_tag_name("comp")) {
                let Some(reference) = comp.attribute("ref") else {
                    return Err(Error::Netlist("<comp> without ref attribute".into()));
                };
                let mut name = comp_field(comp, &fields.name);
                if name.is_empty() {
                    name = text_of(child(comp, "value"));
                }
                components.push(Component {
                    reference: reference.to_string(),
                    kind: comp_field(comp, &fields.kind),
                    name,
                    doc: comp_field(comp, &fields.doc),
                    dealer: comp_field(comp, &fields.dealer),
                    comment: comp_field(comp, &fields.comment),
                    excluded: !comp_field(comp, &fields.excluded).is_empty(),
                });
            }
        }

        Ok(Self {
            components,
            schematic,
            pcb: SheetInfo::default(),
        })
    }
}

impl ComponentSource for Netlist {
    fn grouped_components(&self) -> Option<Vec<Group>> {
        let groups = group_components(self.components.clone());
        if groups.is_empty() { None } else { Some(groups) }
    }

    fn schematic_info(&self) -> SheetInfo {
        self.schematic.clone()
    }

    fn pcb_info(&self) -> SheetInfo {
        self.pcb.clone()
    }
}

/// Scans `text` line by line; the first match of each pattern wins.
fn scan_sheet_info(text: &str, size: &Regex, number: &Regex) -> SheetInfo {
    let mut info = SheetInfo::default();
    for line in text.lines() {
        if info.size.is_empty()
            && let Some(caps) = size.captures(line)
        {
            info.size = caps[1].to_string();
        } else if info.doc_id.is_empty()
            && let Some(caps) = number.captures(line)
        {
            info.doc_id = caps[1].to_string();
        }
        if !info.size.is_empty() && !info.doc_id.is_empty() {
            break;
        }
    }
    info
}

fn read_schematic_info(netlist: &Path) -> Option<SheetInfo> {
    let kicad_sch = netlist.with_extension("kicad_sch");
    if let Ok(text) = std::fs::read_to_string(&kicad_sch) {
        let size = Regex::new(r#"^\s*\(paper "([^"\s]+)""#).ok()?;
        let number = Regex::new(r#"^\s*\(comment 1 "(.*)"\)\s*$"#).ok()?;
        return Some(scan_sheet_info(&text, &size, &number));
    }
    let legacy = netlist.with_extension("sch");
    let text = std::fs::read_to_string(legacy).ok()?;
    let size = Regex::new(r"^\$Descr ([^\s]+) \d").ok()?;
    let number = Regex::new(r#"^Comment1 "(.*)"\s*$"#).ok()?;
    Some(scan_sheet_info(&text, &size, &number))
}

fn read_pcb_info(netlist: &Path) -> Option<SheetInfo> {
    let text = std::fs::read_to_string(netlist.with_extension("kicad_pcb")).ok()?;
    let size = Regex::new(r#"^\s*\((?:page|paper) "?([^\s"]+)"?(?: portrait)?\)\s*$"#).ok()?;
    let number = Regex::new(r#"^\s*\(comment 1 "(.*)"\)\s*$"#).ok()?;
    Some(scan_sheet_info(&text, &size, &number))
}
