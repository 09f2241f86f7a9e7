use crate::model::{Component, ComponentRange, Group, SheetInfo};

/// Supplier of the components a specification is built from.
pub trait ComponentSource: Send {
    /// Components grouped by type, or `None` when no data is available.
    fn grouped_components(&self) -> Option<Vec<Group>>;
    fn schematic_info(&self) -> SheetInfo;
    fn pcb_info(&self) -> SheetInfo;
}

/// Source backed by groups held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    pub groups: Option<Vec<Group>>,
    pub schematic: SheetInfo,
    pub pcb: SheetInfo,
}

impl StaticSource {
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups: Some(groups),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ComponentSource for StaticSource {
    fn grouped_components(&self) -> Option<Vec<Group>> {
        self.groups.clone()
    }

    fn schematic_info(&self) -> SheetInfo {
        self.schematic.clone()
    }

    fn pcb_info(&self) -> SheetInfo {
        self.pcb.clone()
    }
}

/// Groups components by type and collapses neighbours with the same name,
/// document and comment into ranges.
///
/// Excluded components are dropped. Groups keep the order in which their
/// types first appear after sorting by designator; components without a type
/// go last.
pub fn group_components(mut components: Vec<Component>) -> Vec<Group> {
    components.retain(|c| !c.excluded);
    components.sort_by(|a, b| natord::compare(&a.reference, &b.reference));

    let mut kinds: Vec<&str> = Vec::new();
    for c in &components {
        if !kinds.contains(&c.kind.as_str()) {
            kinds.push(&c.kind);
        }
    }
    if let Some(i) = kinds.iter().position(|k| k.is_empty()) {
        let untyped = kinds.remove(i);
        kinds.push(untyped);
    }

    kinds
        .into_iter()
        .map(|kind| {
            let mut ranges: Vec<ComponentRange> = Vec::new();
            for c in components.iter().filter(|c| c.kind == kind) {
                match ranges.last_mut() {
                    Some(range) if range.accepts(c) => range.references.push(c.reference.clone()),
                    _ => ranges.push(ComponentRange::new(c)),
                }
            }
            Group {
                title: group_title(kind, &ranges),
                kind: kind.to_string(),
                ranges,
            }
        })
        .collect()
}

/// Title lines of a group: the type, followed by the document id when every
/// range refers to the same one.
fn group_title(kind: &str, ranges: &[ComponentRange]) -> Vec<String> {
    let shared_doc = ranges
        .first()
        .map(|r| r.doc.as_str())
        .filter(|doc| !doc.is_empty() && ranges.iter().all(|r| r.doc == *doc));
    let title = match (kind.is_empty(), shared_doc) {
        (false, Some(doc)) => format!("{kind} {doc}"),
        (false, None) => kind.to_string(),
        (true, Some(doc)) => doc.to_string(),
        (true, None) => String::new(),
    };
    if title.is_empty() { Vec::new() } else { vec![title] }
}
