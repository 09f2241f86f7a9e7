mod table;

use std::collections::BTreeSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::document::{Document, SpecDocument, sheet_capacity};
use crate::error::Error;
use crate::fonts::{Font, embed_font};

use table::{TableStyle, draw_header, draw_rows};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TABLE_LEFT_MM: f32 = 20.0;
const TABLE_TOP_MM: f32 = 5.0;

const REVISION_SHEET_TITLE: &str = "Лист регистрации изменений";

/// Millimetres to points.
pub(crate) fn mm(v: f32) -> f32 {
    v * 72.0 / 25.4
}

fn used_chars(doc: &SpecDocument) -> BTreeSet<char> {
    let mut chars: BTreeSet<char> = doc
        .rows()
        .iter()
        .flat_map(|row| row.cells.iter())
        .flat_map(|cell| cell.text.chars())
        .filter(|c| !c.is_control())
        .collect();
    chars.extend('0'..='9');
    if doc.has_revision_table() {
        chars.extend(REVISION_SHEET_TITLE.chars());
    }
    chars
}

/// Prints the table on A4 sheets, repeating the header on every sheet.
pub fn render(doc: &SpecDocument, font: &Font, font_size: f32) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let rows = doc.rows();
    let Some((header, content_rows)) = rows.split_first() else {
        return Err(Error::Pdf("table has no header row".into()));
    };

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let embedded = embed_font(&mut pdf, font, "F1", &used_chars(doc), &mut alloc);
    let t_fonts = t0.elapsed();

    let style = TableStyle {
        font,
        embedded: &embedded,
        font_size,
        left: mm(TABLE_LEFT_MM),
    };
    let positions = doc.positions();
    let (first_rows, other_rows) = sheet_capacity(doc.first_page_variant());
    let page_top = mm(PAGE_HEIGHT_MM - TABLE_TOP_MM);

    let mut contents: Vec<Content> = Vec::new();
    let mut start = 0usize;
    loop {
        let capacity = if start == 0 { first_rows } else { other_rows };
        let end = (start + capacity).min(content_rows.len());
        let mut content = Content::new();
        let below_header = draw_header(&mut content, &style, header, page_top);
        draw_rows(
            &mut content,
            &style,
            &content_rows[start..end],
            &positions[1 + start..1 + end],
            below_header,
        );
        contents.push(content);
        start = end;
        if start >= content_rows.len() {
            break;
        }
    }

    if doc.has_revision_table() {
        let mut content = Content::new();
        let title_w = font.text_width_1000(REVISION_SHEET_TITLE) * font_size / 1000.0;
        content.begin_text();
        content.set_font(Name(embedded.pdf_name.as_bytes()), font_size);
        content.next_line((mm(PAGE_WIDTH_MM) - title_w) / 2.0, page_top - font_size * 2.0);
        content.show(Str(&embedded.encode(REVISION_SHEET_TITLE)));
        content.end_text();
        contents.push(content);
    }

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM)))
            .parent(pages_id)
            .contents(content_ids[i]);
        page.resources()
            .fonts()
            .pair(Name(embedded.pdf_name.as_bytes()), embedded.font_ref);
    }

    let bytes = pdf.finish();
    log::info!(
        "Render: {} pages, font_embed={:.1}ms, total={:.1}ms",
        n,
        t_fonts.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}
