//! Row layout of the specification table.
//!
//! [`Assembler`] turns the grouped components into the ordered rows of every
//! enabled section. Rows come out in batches; the builder writes each batch
//! to the document under one render lock.

pub mod balance;
pub mod paginate;

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{ComponentRange, Group, Row, RowStyle, Section};
use crate::settings::Settings;
use crate::source::ComponentSource;

const ASSEMBLY_DRAWING: &str = "Сборочный чертёж";
const SCHEMATIC: &str = "Схема электрическая принципиальная";
const INDEX: &str = "Перечень элементов";
const PCB: &str = "Плата печатная";

fn document_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([А-ЯA-Z0-9]+(?:[.\-]\d+)+\s?)(Э\d)").expect("document id pattern is valid")
    })
}

/// Document id of the parts index derived from the schematic id:
/// "ПАКБ.436122.001Э3" becomes "ПАКБ.436122.001ПЭ3". Ids that do not look
/// like a schematic designation are returned unchanged.
pub fn index_document_id(schematic_id: &str) -> String {
    match document_id_pattern().captures(schematic_id) {
        Some(caps) => format!("{}П{}", &caps[1], &caps[2]),
        None => schematic_id.to_string(),
    }
}

/// How a group of component ranges is printed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GroupLayout<'g> {
    /// A lone range written as one row with the type folded into its name
    /// and a quantity of one.
    InlineSingle { kind: &'g str, range: &'g ComponentRange },
    /// Title rows followed by one row per range.
    TitledGroup(&'g Group),
}

impl<'g> GroupLayout<'g> {
    pub fn choose(group: &'g Group, every_group_has_title: bool) -> Self {
        match group.ranges.as_slice() {
            [range] if !every_group_has_title => GroupLayout::InlineSingle {
                kind: &group.kind,
                range,
            },
            _ => GroupLayout::TitledGroup(group),
        }
    }
}

/// Designators of the range followed by its extra comment on a new line.
fn range_comment(range: &ComponentRange) -> String {
    let refs = range.range_string();
    match (refs.is_empty(), range.comment.is_empty()) {
        (false, false) => format!("{refs}\n{}", range.comment),
        (false, true) => refs,
        (true, _) => range.comment.clone(),
    }
}

fn part_row(name: &str, quantity: &str, comment: &str, increment: u32) -> Row {
    Row::new(["", "", "", "", name, quantity, comment]).with_increment(increment)
}

/// Ordered row batches under construction.
#[derive(Default)]
struct Batches {
    batches: Vec<Vec<Row>>,
}

impl Batches {
    fn begin(&mut self) {
        self.batches.push(Vec::new());
    }

    fn push(&mut self, row: Row) {
        match self.batches.last_mut() {
            Some(batch) => batch.push(row),
            None => self.batches.push(vec![row]),
        }
    }

    fn blank(&mut self) {
        self.push(Row::blank());
    }

    fn single(&mut self, row: Row) {
        self.begin();
        self.push(row);
    }

    fn section_title(&mut self, section: Section) {
        self.single(Row::new(["", "", "", "", section.title(), "", ""]).with_style(RowStyle::SectionTitle));
    }

    fn finish(self) -> Vec<Vec<Row>> {
        self.batches.into_iter().filter(|b| !b.is_empty()).collect()
    }
}

pub struct Assembler<'a> {
    settings: &'a Settings,
}

impl<'a> Assembler<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// All rows of the table in document order, grouped into write batches.
    pub fn assemble(&self, groups: &[Group], source: &dyn ComponentSource) -> Vec<Vec<Row>> {
        let sections = &self.settings.sections;
        let mut out = Batches::default();

        if sections.documentation {
            self.documentation(&mut out, source);
        }
        if sections.details {
            self.details(&mut out, source);
        }
        if sections.standard_parts {
            out.single(Row::blank());
            out.section_title(Section::StandardParts);
        }
        if sections.other_parts {
            self.other_parts(&mut out, groups);
        }
        if sections.materials {
            out.single(Row::blank());
            out.section_title(Section::Materials);
            out.single(Row::blank());
        }

        out.finish()
    }

    fn documentation(&self, out: &mut Batches, source: &dyn ComponentSource) {
        let sections = &self.settings.sections;
        if !self.settings.spec.prohibit_empty_rows_at_top {
            out.single(Row::blank());
        }
        out.section_title(Section::Documentation);

        if !(sections.assembly || sections.schematic || sections.index) {
            return;
        }
        out.single(Row::blank());

        let schematic = source.schematic_info();
        if sections.assembly {
            out.single(Row::new(["", "", "", "", ASSEMBLY_DRAWING, "", ""]));
        }
        if sections.schematic {
            out.single(Row::new([schematic.size.as_str(), "", "", schematic.doc_id.as_str(), SCHEMATIC, "", ""]));
        }
        if sections.index {
            let id = index_document_id(&schematic.doc_id);
            out.single(Row::new(["A4", "", "", id.as_str(), INDEX, "", ""]));
        }
    }

    fn details(&self, out: &mut Batches, source: &dyn ComponentSource) {
        out.single(Row::blank());
        out.section_title(Section::Details);

        if self.settings.sections.pcb {
            out.single(Row::blank());
            let pcb = source.pcb_info();
            let increment = if self.settings.spec.only_components_have_position_numbers {
                0
            } else {
                1
            };
            out.single(
                Row::new([pcb.size.as_str(), "", "", pcb.doc_id.as_str(), PCB, "", ""])
                    .with_increment(increment),
            );
        }
    }

    fn other_parts(&self, out: &mut Batches, groups: &[Group]) {
        let spec = &self.settings.spec;
        out.single(Row::blank());
        out.section_title(Section::OtherParts);
        out.single(Row::blank());

        for (i, group) in groups.iter().enumerate() {
            let mut increment = 1;
            out.begin();
            if i > 0 {
                for _ in 0..spec.empty_rows_between_groups {
                    out.blank();
                    if spec.reserve_position_numbers {
                        increment += 1;
                    }
                }
            }

            match GroupLayout::choose(group, spec.every_group_has_title) {
                GroupLayout::InlineSingle { kind, range } => {
                    let mut name = String::new();
                    if !kind.is_empty() {
                        name.push_str(kind);
                        name.push(' ');
                    }
                    name.push_str(&range.name);
                    if !range.doc.is_empty() {
                        name.push(' ');
                        name.push_str(&range.doc);
                    }
                    out.push(part_row(&name, "1", &range_comment(range), increment));
                }
                GroupLayout::TitledGroup(group) => {
                    for title in &group.title {
                        out.push(
                            Row::new(["", "", "", "", title.as_str(), "", ""])
                                .with_style(RowStyle::GroupTitle),
                        );
                    }
                    if spec.empty_row_after_group_title {
                        out.blank();
                        if spec.reserve_position_numbers {
                            increment += 1;
                        }
                    }
                    for range in &group.ranges {
                        let mut name = range.name.clone();
                        let doc_in_title = group.title.iter().any(|t| t.ends_with(&range.doc));
                        if !range.doc.is_empty() && !doc_in_title {
                            name.push(' ');
                            name.push_str(&range.doc);
                        }
                        let quantity = range.len().to_string();
                        out.push(part_row(&name, &quantity, &range_comment(range), increment));
                        increment = 1;
                    }
                }
            }
        }
    }
}
