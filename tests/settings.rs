use kispec::{Error, Settings};

#[test]
fn defaults() {
    let settings = Settings::default();
    assert!(settings.sections.documentation);
    assert!(!settings.sections.assembly);
    assert!(settings.sections.other_parts);
    assert_eq!(settings.spec.empty_rows_between_groups, 1);
    assert_eq!(settings.spec.extreme_width_factor, 80);
    assert_eq!(settings.spec.pages_rev_table, 3);
    assert_eq!(settings.fields.kind, "Тип");
    assert_eq!(settings.render.first_page_variant, 1);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let settings = Settings::from_toml(
        r#"
[sections]
assembly = true
materials = true

[spec]
empty-rows-between-groups = 2
reserve-position-numbers = true
prohibit-titles-at-bottom = true

[fields]
type = "Вид"
excluded = "Исключить"

[render]
font = "PT Sans"
first-page-variant = 3
"#,
    )
    .unwrap();

    assert!(settings.sections.assembly);
    assert!(settings.sections.materials);
    assert!(settings.sections.details);
    assert_eq!(settings.spec.empty_rows_between_groups, 2);
    assert!(settings.spec.reserve_position_numbers);
    assert!(settings.spec.prohibit_titles_at_bottom);
    assert!(!settings.spec.prohibit_empty_rows_at_top);
    assert_eq!(settings.spec.extreme_width_factor, 80);
    assert_eq!(settings.fields.kind, "Вид");
    assert_eq!(settings.fields.excluded, "Исключить");
    assert_eq!(settings.fields.name, "Наименование");
    assert_eq!(settings.render.font, "PT Sans");
    assert_eq!(settings.render.font_size, 12.0);
    assert_eq!(settings.render.first_page_variant, 3);
}

#[test]
fn empty_file_is_default() {
    let settings = Settings::from_toml("").unwrap();
    assert_eq!(settings.spec.extreme_width_factor, 80);
    assert!(settings.sections.schematic);
}

#[test]
fn invalid_values_are_rejected() {
    let err = Settings::from_toml("[spec]\nextreme-width-factor = 0\n").unwrap_err();
    assert!(matches!(err, Error::Settings(_)));

    let err = Settings::from_toml("[spec]\nempty-rows-between-groups = \"two\"\n").unwrap_err();
    assert!(matches!(err, Error::Settings(_)));
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kispec.toml");
    std::fs::write(&path, "[spec]\nappend-rev-table = true\npages-rev-table = 5\n").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert!(settings.spec.append_rev_table);
    assert_eq!(settings.spec.pages_rev_table, 5);

    let err = Settings::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
