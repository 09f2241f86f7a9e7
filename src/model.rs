/// Number of columns in the specification table.
pub const COLUMN_COUNT: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Format,
    Zone,
    Position,
    Designator,
    Name,
    Quantity,
    Comment,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Format,
        Column::Zone,
        Column::Position,
        Column::Designator,
        Column::Name,
        Column::Quantity,
        Column::Comment,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Printed width of the column in millimetres.
    pub fn width_mm(self) -> f32 {
        match self {
            Column::Format => 6.0,
            Column::Zone => 6.0,
            Column::Position => 8.0,
            Column::Designator => 70.0,
            Column::Name => 63.0,
            Column::Quantity => 10.0,
            Column::Comment => 22.0,
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Column::Format => "Формат",
            Column::Zone => "Зона",
            Column::Position => "Поз.",
            Column::Designator => "Обозначение",
            Column::Name => "Наименование",
            Column::Quantity => "Кол.",
            Column::Comment => "Приме-\nчание",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Component {
    pub reference: String,
    pub kind: String, // type category, e.g. "Резистор"
    pub name: String,
    pub doc: String,
    pub dealer: String,
    pub comment: String,
    pub excluded: bool,
}

impl Component {
    /// Splits "R12" into ("R", Some(12)). Designators without a trailing
    /// number yield `None`.
    pub fn reference_parts(&self) -> (&str, Option<u32>) {
        split_reference(&self.reference)
    }
}

pub(crate) fn split_reference(reference: &str) -> (&str, Option<u32>) {
    let digits_at = reference
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    match digits_at {
        Some(i) => (&reference[..i], reference[i..].parse().ok()),
        None => (reference, None),
    }
}

/// Run of components that print as a single row.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRange {
    pub references: Vec<String>,
    pub name: String,
    pub doc: String,
    pub comment: String,
}

impl ComponentRange {
    pub fn new(first: &Component) -> Self {
        Self {
            references: vec![first.reference.clone()],
            name: first.name.clone(),
            doc: first.doc.clone(),
            comment: first.comment.clone(),
        }
    }

    /// Whether `component` shares this range's name, document and comment.
    pub fn accepts(&self, component: &Component) -> bool {
        self.name == component.name && self.doc == component.doc && self.comment == component.comment
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Compact designator list: "R1, R3-R5". Three or more consecutive
    /// numbers with the same prefix collapse to `first-last`.
    pub fn range_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut i = 0;
        while i < self.references.len() {
            let (prefix, number) = split_reference(&self.references[i]);
            let mut j = i;
            if let Some(start) = number {
                while j + 1 < self.references.len() {
                    let (next_prefix, next_number) = split_reference(&self.references[j + 1]);
                    let expected = u32::try_from(j + 1 - i)
                        .ok()
                        .and_then(|step| start.checked_add(step));
                    if next_prefix == prefix && next_number.is_some() && next_number == expected {
                        j += 1;
                    } else {
                        break;
                    }
                }
            }
            if j - i >= 2 {
                parts.push(format!("{}-{}", self.references[i], self.references[j]));
            } else {
                parts.extend(self.references[i..=j].iter().cloned());
            }
            i = j + 1;
        }
        parts.join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub title: Vec<String>,
    pub kind: String, // singular type, used when the group is inlined
    pub ranges: Vec<ComponentRange>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Sheet size and document id of a design file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetInfo {
    pub size: String,
    pub doc_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowStyle {
    #[default]
    Normal,
    SectionTitle,
    GroupTitle,
}

impl RowStyle {
    pub fn is_title(self) -> bool {
        matches!(self, RowStyle::SectionTitle | RowStyle::GroupTitle)
    }
}

/// One table row before it is written to the document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub values: [String; COLUMN_COUNT],
    pub style: RowStyle,
    pub increment: u32,
}

impl Row {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn new(values: [&str; COLUMN_COUNT]) -> Self {
        Self {
            values: values.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: RowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_increment(mut self, increment: u32) -> Self {
        self.increment = increment;
        self
    }

    pub fn value(&self, column: Column) -> &str {
        &self.values[column.index()]
    }

    pub fn is_blank(&self) -> bool {
        self.increment == 0 && self.values.iter().all(String::is_empty)
    }
}

/// Text placed into one cell together with its horizontal scale (percent).
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub text: String,
    pub scale: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::new(),
            scale: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Documentation,
    Details,
    StandardParts,
    OtherParts,
    Materials,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Documentation => "Документация",
            Section::Details => "Детали",
            Section::StandardParts => "Стандартные изделия",
            Section::OtherParts => "Прочие изделия",
            Section::Materials => "Материалы",
        }
    }
}
