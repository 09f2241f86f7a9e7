//! Build parameters.
//!
//! Settings are read from a TOML file with `[sections]`, `[spec]`, `[fields]`
//! and `[render]` tables. Every key is optional; missing keys keep the
//! defaults below.

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub sections: SectionSettings,
    pub spec: SpecSettings,
    pub fields: FieldSettings,
    pub render: RenderSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml(&text)?;
        log::debug!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let settings: Settings = toml::from_str(text)?;
        if settings.spec.extreme_width_factor == 0 {
            return Err(Error::Settings(
                "spec.extreme-width-factor must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }
}

/// Which document sections are printed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SectionSettings {
    pub documentation: bool,
    pub assembly: bool,
    pub schematic: bool,
    pub index: bool,
    pub details: bool,
    pub pcb: bool,
    pub standard_parts: bool,
    pub other_parts: bool,
    pub materials: bool,
}

impl Default for SectionSettings {
    fn default() -> Self {
        Self {
            documentation: true,
            assembly: false,
            schematic: true,
            index: true,
            details: true,
            pcb: true,
            standard_parts: false,
            other_parts: true,
            materials: false,
        }
    }
}

/// Table layout parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SpecSettings {
    pub empty_rows_between_groups: u32,
    /// Smallest horizontal scale (percent) a cell may be printed with before
    /// its text is moved onto a continuation row.
    pub extreme_width_factor: u32,
    pub reserve_position_numbers: bool,
    pub prohibit_titles_at_bottom: bool,
    pub prohibit_empty_rows_at_top: bool,
    pub append_rev_table: bool,
    pub pages_rev_table: usize,
    pub every_group_has_title: bool,
    pub empty_row_after_group_title: bool,
    pub only_components_have_position_numbers: bool,
}

impl Default for SpecSettings {
    fn default() -> Self {
        Self {
            empty_rows_between_groups: 1,
            extreme_width_factor: 80,
            reserve_position_numbers: false,
            prohibit_titles_at_bottom: false,
            prohibit_empty_rows_at_top: false,
            append_rev_table: false,
            pages_rev_table: 3,
            every_group_has_title: false,
            empty_row_after_group_title: false,
            only_components_have_position_numbers: false,
        }
    }
}

/// Names of the schematic fields that carry component attributes.
/// An empty name disables the attribute.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FieldSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub doc: String,
    pub dealer: String,
    pub comment: String,
    pub excluded: String,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            kind: "Тип".into(),
            name: "Наименование".into(),
            doc: "Документ".into(),
            dealer: String::new(),
            comment: "Примечание".into(),
            excluded: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderSettings {
    /// Font family; several candidates may be separated by `;`.
    pub font: String,
    pub font_size: f32,
    /// Variant of the first-page layout (1-4). Variants 3 and 4 carry the
    /// customer columns and fit fewer rows.
    pub first_page_variant: u8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font: "OpenGost Type B TT; OpenGost Type A TT; DejaVu Sans".into(),
            font_size: 12.0,
            first_page_variant: 1,
        }
    }
}
