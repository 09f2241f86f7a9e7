mod build;
mod document;
mod error;
mod fonts;
mod heights;
mod measure;
mod model;
mod netlist;
mod pdf;
mod settings;
mod source;
pub mod spec;

pub use build::{BuildOutcome, BuildState, BuildTicket, Builder, clean};
pub use document::{Batch, Document, SpecDocument, TableRow, sheet_capacity};
pub use error::Error;
pub use fonts::Font;
pub use heights::{RowHeights, SpecRowHeights};
pub use measure::{FontMeter, WidthMeter};
pub use model::{
    COLUMN_COUNT, Cell, Column, Component, ComponentRange, Group, Row, RowStyle, Section, SheetInfo,
};
pub use netlist::Netlist;
pub use pdf::render;
pub use settings::{FieldSettings, RenderSettings, SectionSettings, Settings, SpecSettings};
pub use source::{ComponentSource, StaticSource, group_components};

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Builds the specification table for `source` on a worker thread and waits
/// for it. The returned document is meaningful only for
/// [`BuildOutcome::Built`].
pub fn build_specification(
    source: Box<dyn ComponentSource>,
    meter: Box<dyn WidthMeter>,
    settings: &Settings,
) -> Result<(SpecDocument, BuildOutcome), Error> {
    let variant = settings.render.first_page_variant;
    let doc = Arc::new(Mutex::new(SpecDocument::new(variant)));
    let builder = Builder::new(
        settings.clone(),
        source,
        meter,
        Box::new(SpecRowHeights::new(variant)),
    );

    let outcome = match builder.spawn(Arc::clone(&doc)) {
        Some(handle) => handle
            .join()
            .map_err(|_| Error::Worker("build thread panicked".into()))?,
        None => BuildOutcome::Busy,
    };

    let doc = doc.lock().unwrap_or_else(PoisonError::into_inner).clone();
    Ok((doc, outcome))
}

/// Reads a KiCad XML netlist, builds its specification and writes it to
/// `output` as PDF. Nothing is written unless the table was built.
pub fn convert_netlist_to_pdf(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<BuildOutcome, Error> {
    let t0 = Instant::now();

    let netlist = Netlist::load(input, &settings.fields)?;
    let font = Font::find(&settings.render.font);
    let meter = FontMeter::new(font.clone(), settings.render.font_size);
    let t_load = t0.elapsed();

    let (doc, outcome) = build_specification(Box::new(netlist), Box::new(meter), settings)?;
    let t_build = t0.elapsed();
    if !matches!(outcome, BuildOutcome::Built { .. }) {
        return Ok(outcome);
    }

    let bytes = pdf::render(&doc, &font, settings.render.font_size)?;
    std::fs::write(output, &bytes).map_err(Error::Io)?;

    log::info!(
        "Timing: load={:.1}ms, build={:.1}ms, render+write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_load.as_secs_f64() * 1000.0,
        (t_build - t_load).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_build).as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(outcome)
}
