#![allow(dead_code)]

use kispec::{Column, ComponentRange, Group, Settings, SpecDocument};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Characters that fit on one line of each column.
pub const CAPACITY: [usize; 7] = [3, 3, 3, 30, 25, 3, 20];

/// Width meter that counts characters against [`CAPACITY`].
pub fn char_meter() -> impl Fn(Column, &str) -> u32 + Send + 'static {
    |column: Column, text: &str| {
        let len = text.chars().count();
        let cap = CAPACITY[column.index()];
        if len <= cap {
            100
        } else {
            (cap * 100 / len) as u32
        }
    }
}

/// Meter under which everything fits.
pub fn roomy_meter() -> impl Fn(Column, &str) -> u32 + Send + 'static {
    |_: Column, _: &str| 100
}

pub fn range(refs: &[&str], name: &str, doc: &str, comment: &str) -> ComponentRange {
    ComponentRange {
        references: refs.iter().map(|r| r.to_string()).collect(),
        name: name.into(),
        doc: doc.into(),
        comment: comment.into(),
    }
}

pub fn group(kind: &str, title: &[&str], ranges: Vec<ComponentRange>) -> Group {
    Group {
        title: title.iter().map(|t| t.to_string()).collect(),
        kind: kind.into(),
        ranges,
    }
}

/// Settings with only the "Other parts" section enabled.
pub fn other_parts_only() -> Settings {
    let mut settings = Settings::default();
    let s = &mut settings.sections;
    s.documentation = false;
    s.details = false;
    s.standard_parts = false;
    s.materials = false;
    s.other_parts = true;
    settings
}

/// Cell texts of content rows (header skipped).
pub fn names(doc: &SpecDocument) -> Vec<String> {
    doc.rows()
        .iter()
        .skip(1)
        .map(|r| r.cells[Column::Name.index()].text.clone())
        .collect()
}
