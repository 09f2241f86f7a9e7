//! Building the specification table.
//!
//! Only one build runs at a time. The flag lives in [`BuildState`], which is
//! shared by every builder and by [`clean`]; requests made while a build is
//! running are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::document::{Batch, Document};
use crate::heights::RowHeights;
use crate::measure::WidthMeter;
use crate::model::Column;
use crate::settings::Settings;
use crate::source::ComponentSource;
use crate::spec::Assembler;
use crate::spec::balance::{FittedRow, expand_row};
use crate::spec::paginate::{PageLayout, forbid_leading_blanks, forbid_trailing_titles};

#[derive(Clone, Debug, Default)]
pub struct BuildState {
    busy: Arc<AtomicBool>,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State shared by the whole process.
    pub fn global() -> &'static BuildState {
        static STATE: OnceLock<BuildState> = OnceLock::new();
        STATE.get_or_init(BuildState::new)
    }

    pub fn is_building(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Marks a build as started, or returns `None` when one is already running.
    pub fn try_begin(&self) -> Option<BuildTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BuildTicket {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Proof that a build is running. The state returns to idle when it drops.
#[derive(Debug)]
pub struct BuildTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for BuildTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { rows: usize, pages: usize },
    /// The component source had no data or no groups; the document was not
    /// touched.
    NoData,
    /// Another build was running; the request was ignored.
    Busy,
}

/// Clears the table down to its header and one empty row.
///
/// Ignored while a build is running unless `force` is set. Returns whether
/// the table was cleared.
pub fn clean<D: Document + ?Sized>(doc: &mut D, state: &BuildState, force: bool) -> bool {
    if !force && state.is_building() {
        log::debug!("Clean request ignored: build in progress");
        return false;
    }
    Batch::new(doc).reset();
    true
}

pub struct Builder {
    settings: Settings,
    source: Box<dyn ComponentSource>,
    meter: Box<dyn WidthMeter>,
    heights: Box<dyn RowHeights>,
    state: BuildState,
}

impl Builder {
    pub fn new(
        settings: Settings,
        source: Box<dyn ComponentSource>,
        meter: Box<dyn WidthMeter>,
        heights: Box<dyn RowHeights>,
    ) -> Self {
        Self {
            settings,
            source,
            meter,
            heights,
            state: BuildState::global().clone(),
        }
    }

    /// Uses `state` instead of the process-wide build flag.
    pub fn with_state(mut self, state: BuildState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// Builds the table on the calling thread.
    pub fn build<D: Document + ?Sized>(&self, doc: &mut D) -> BuildOutcome {
        let Some(ticket) = self.state.try_begin() else {
            log::info!("Build request ignored: build in progress");
            return BuildOutcome::Busy;
        };
        self.run(doc, ticket)
    }

    /// Builds the table on a worker thread. Returns `None` without spawning
    /// anything when a build is already running.
    pub fn spawn<D>(self, doc: Arc<Mutex<D>>) -> Option<JoinHandle<BuildOutcome>>
    where
        D: Document + 'static,
    {
        let Some(ticket) = self.state.try_begin() else {
            log::info!("Build request ignored: build in progress");
            return None;
        };
        let spawned = std::thread::Builder::new()
            .name("SpecBuildingThread".into())
            .spawn(move || {
                let mut doc = doc.lock().unwrap_or_else(PoisonError::into_inner);
                self.run(&mut *doc, ticket)
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Cannot start build thread: {e}");
                None
            }
        }
    }

    fn run<D: Document + ?Sized>(&self, doc: &mut D, _ticket: BuildTicket) -> BuildOutcome {
        let t0 = Instant::now();
        let Some(groups) = self
            .source
            .grouped_components()
            .filter(|groups| !groups.is_empty())
        else {
            log::warn!("No component data; specification not built");
            return BuildOutcome::NoData;
        };

        clean(doc, &self.state, true);
        let t_clean = t0.elapsed();

        // New rows go in front of the trailing scratch row, which is removed
        // once everything is written.
        let mut scratch = doc.row_count() - 1;
        let extreme = self.settings.spec.extreme_width_factor;
        let batches = Assembler::new(&self.settings).assemble(&groups, self.source.as_ref());
        for rows in batches {
            let mut batch = Batch::new(doc);
            for row in rows {
                for fitted in expand_row(self.meter.as_ref(), row, extreme) {
                    batch.insert_rows(scratch, 1);
                    write_fitted(&mut *batch, scratch, fitted);
                    scratch += 1;
                }
            }
        }
        Batch::new(doc).remove_rows(scratch, 1);
        let t_fill = t0.elapsed();

        let spec = &self.settings.spec;
        let variant = doc.first_page_variant();
        if spec.prohibit_titles_at_bottom {
            let inserted = forbid_trailing_titles(doc, PageLayout::last_rows(variant));
            log::debug!("Trailing titles: {inserted} rows inserted");
        }
        if spec.prohibit_empty_rows_at_top {
            let removed = forbid_leading_blanks(doc, PageLayout::first_rows(variant));
            log::debug!("Leading blanks: {removed} rows removed");
        }
        let t_repair = t0.elapsed();

        {
            let mut batch = Batch::new(doc);
            for row in 1..batch.row_count() {
                let height = self.heights.spec_row_height(row);
                batch.set_row_height(row, height);
            }
        }

        if spec.append_rev_table && doc.page_count() > spec.pages_rev_table {
            log::info!("{} pages, appending revision table", doc.page_count());
            doc.append_revision_table();
        }

        let outcome = BuildOutcome::Built {
            rows: doc.row_count().saturating_sub(1),
            pages: doc.page_count(),
        };
        log::info!(
            "Timing: clean={:.1}ms, fill={:.1}ms, repair={:.1}ms, total={:.1}ms ({outcome:?})",
            t_clean.as_secs_f64() * 1000.0,
            (t_fill - t_clean).as_secs_f64() * 1000.0,
            (t_repair - t_fill).as_secs_f64() * 1000.0,
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        outcome
    }
}

fn write_fitted<D: Document + ?Sized>(doc: &mut D, index: usize, row: FittedRow) {
    for (column, cell) in Column::ALL.into_iter().zip(row.cells) {
        doc.set_cell(column, index, cell);
    }
    doc.set_row_style(index, row.style);
    doc.set_position_increment(index, row.increment);
}
