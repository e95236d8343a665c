//! Catalog loading, card building and preview rendering.
//!
//! Every catalog entry ends up as exactly one card, in list order:
//!
//! - a rendered first-page preview,
//! - a click-to-open placeholder when the PDF library is missing or the
//!   document fails to load or render, or
//! - an error card when the card itself could not be built.
//!
//! Failures never stop the remaining entries from loading.

use crate::catalog::{Catalog, CertificateEntry};
use crate::config::{GalleryConfig, LoadStrategy};
use crate::engine::{render_first_page, EngineSurface, PdfEngine};
use crate::error::{GalleryError, Result};
use crate::layout::{fit_preview, Orientation};
use crate::view::{CardContent, GalleryView};
use futures::future::join_all;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Final state of a certificate card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    /// Inserted, preview still pending.
    Loading,
    /// First page drawn.
    Rendered(Orientation),
    /// Click-to-open placeholder shown instead of the page.
    Fallback,
    /// The card could not be built; an error card stands in its place.
    Error,
}

/// Outcome for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReport {
    pub index: usize,
    pub file_name: String,
    pub state: CardState,
}

/// Outcome of a catalog load, one report per entry in catalog order.
///
/// A load that was overtaken by a newer one stops where it was and reports
/// `superseded`; its `cards` then cover only the entries it finished.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub cards: Vec<CardReport>,
    pub superseded: bool,
}

impl LoadReport {
    fn count(&self, pred: impl Fn(&CardState) -> bool) -> usize {
        self.cards.iter().filter(|c| pred(&c.state)).count()
    }

    pub fn rendered(&self) -> usize {
        self.count(|s| matches!(s, CardState::Rendered(_)))
    }

    pub fn fallbacks(&self) -> usize {
        self.count(|s| *s == CardState::Fallback)
    }

    pub fn errors(&self) -> usize {
        self.count(|s| *s == CardState::Error)
    }
}

/// Identifies one call to [`Gallery::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadTicket(u64);

/// The certificate grid.
///
/// `engine` is `None` when no PDF library is available; every card then
/// shows its placeholder without attempting a render.
pub struct Gallery<E, V> {
    config: GalleryConfig,
    catalog: Catalog,
    engine: Option<Rc<E>>,
    view: V,
    generation: Cell<u64>,
}

impl<E, V> Gallery<E, V>
where
    E: PdfEngine,
    V: GalleryView<Surface = EngineSurface<E>>,
{
    /// Create a gallery over `view`.
    pub fn new(config: GalleryConfig, engine: Option<Rc<E>>, view: V) -> Result<Self> {
        config.validate()?;
        let catalog = Catalog::from_config(&config);

        if engine.is_none() {
            info!("PDF library not available, certificates will use fallback display");
        }

        Ok(Self {
            config,
            catalog,
            engine,
            view,
            generation: Cell::new(0),
        })
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn begin_load(&self) -> LoadTicket {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        LoadTicket(generation)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generation.get() == ticket.0
    }

    /// Empty the grid and build one card per catalog entry.
    ///
    /// Only a missing grid aborts the load. Starting a new load stops any
    /// load still in progress; the older one leaves the grid untouched from
    /// then on.
    pub async fn load(&self) -> Result<LoadReport> {
        let ticket = self.begin_load();
        if let Err(e) = self.view.reset() {
            error!("{}", e);
            return Err(e);
        }

        info!(
            "Loading {} certificates ({:?})",
            self.catalog.len(),
            self.config.strategy
        );

        let report = match self.config.strategy {
            LoadStrategy::Sequential => self.load_sequential(ticket).await,
            LoadStrategy::Concurrent => self.load_concurrent(ticket).await,
        };

        if report.superseded {
            info!(
                "Load superseded by a newer load after {} of {} certificates",
                report.cards.len(),
                self.catalog.len()
            );
        } else {
            info!(
                "Loaded {} certificates: {} rendered, {} fallback, {} failed",
                report.cards.len(),
                report.rendered(),
                report.fallbacks(),
                report.errors()
            );
        }
        Ok(report)
    }

    async fn load_sequential(&self, ticket: LoadTicket) -> LoadReport {
        let mut report = LoadReport::default();
        for entry in self.catalog.entries() {
            let state = match self.build_card(entry, ticket).await {
                Ok(Some(state)) => state,
                Ok(None) => {
                    report.superseded = true;
                    break;
                }
                Err(e) => self.replace_with_error_card(entry, &e),
            };
            report.cards.push(report_for(entry, state));
        }
        report
    }

    async fn load_concurrent(&self, ticket: LoadTicket) -> LoadReport {
        let entries = self.catalog.entries();
        let mut states = vec![CardState::Loading; entries.len()];

        // Insert every card up front so the grid order is the list order.
        let mut pending = Vec::with_capacity(entries.len());
        for (slot, entry) in entries.iter().enumerate() {
            match self.insert_card(entry) {
                Ok(surface) => pending.push((slot, entry, surface)),
                Err(e) => states[slot] = self.replace_with_error_card(entry, &e),
            }
        }

        let results = join_all(pending.iter().map(|(slot, entry, surface)| async move {
            (*slot, *entry, self.render_preview(entry, surface, ticket).await)
        }))
        .await;

        if !self.is_current(ticket) {
            return LoadReport {
                cards: Vec::new(),
                superseded: true,
            };
        }

        for (slot, entry, result) in results {
            states[slot] = match result {
                Ok(Some(state)) => state,
                Ok(None) => CardState::Loading,
                Err(e) => self.replace_with_error_card(entry, &e),
            };
        }

        LoadReport {
            cards: entries
                .iter()
                .zip(states)
                .map(|(entry, state)| report_for(entry, state))
                .collect(),
            superseded: false,
        }
    }

    /// Insert the card for `entry` and render its preview. `None` when the
    /// load was superseded before the card could be inserted or finished.
    async fn build_card(
        &self,
        entry: &CertificateEntry,
        ticket: LoadTicket,
    ) -> Result<Option<CardState>> {
        if !self.is_current(ticket) {
            return Ok(None);
        }
        let surface = self.insert_card(entry)?;
        self.render_preview(entry, &surface, ticket).await
    }

    fn insert_card(&self, entry: &CertificateEntry) -> Result<EngineSurface<E>> {
        let content = CardContent::new(entry, &self.config.issuer, &self.config.category);
        self.view
            .append_card(&content)
            .map_err(|e| card_build_error(entry, e))
    }

    /// Draw the first page of `entry` into `surface`, falling back to the
    /// placeholder on any preview failure.
    ///
    /// Errors outside the preview group, and failures of the view itself,
    /// are returned so the card becomes an error card.
    async fn render_preview(
        &self,
        entry: &CertificateEntry,
        surface: &EngineSurface<E>,
        ticket: LoadTicket,
    ) -> Result<Option<CardState>> {
        let preview = &self.config.preview;
        let result = match self.engine.as_deref() {
            Some(engine) => {
                render_first_page(engine, &entry.path, surface, |w, h| fit_preview(w, h, preview))
                    .await
            }
            None => Err(GalleryError::LibraryUnavailable),
        };

        if !self.is_current(ticket) {
            debug!("Discarding stale preview for {}", entry.file_name);
            return Ok(None);
        }

        match result {
            Ok(fit) => {
                self.view
                    .show_preview(entry.index, surface, &fit)
                    .map_err(|e| card_build_error(entry, e))?;
                Ok(Some(CardState::Rendered(fit.orientation)))
            }
            Err(GalleryError::LibraryUnavailable) => {
                info!("PDF library not loaded, using fallback display for {}", entry.file_name);
                self.show_fallback(entry).map(Some)
            }
            Err(e) if e.is_preview_failure() => {
                error!("Error loading PDF {}: {}", entry.path, e);
                self.show_fallback(entry).map(Some)
            }
            Err(e) => Err(card_build_error(entry, e)),
        }
    }

    fn show_fallback(&self, entry: &CertificateEntry) -> Result<CardState> {
        self.view
            .show_fallback(entry.index, &entry.path)
            .map_err(|e| card_build_error(entry, e))?;
        Ok(CardState::Fallback)
    }

    fn replace_with_error_card(&self, entry: &CertificateEntry, err: &GalleryError) -> CardState {
        error!("Error loading certificate {}: {}", entry.file_name, err);
        if let Err(e) = self.view.show_error_card(entry.index, &entry.file_name) {
            warn!("Failed to show error card for {}: {}", entry.file_name, e);
        }
        CardState::Error
    }
}

fn report_for(entry: &CertificateEntry, state: CardState) -> CardReport {
    CardReport {
        index: entry.index,
        file_name: entry.file_name.clone(),
        state,
    }
}

fn card_build_error(entry: &CertificateEntry, err: GalleryError) -> GalleryError {
    match err {
        e @ GalleryError::CardBuild { .. } => e,
        e => GalleryError::CardBuild {
            file_name: entry.file_name.clone(),
            message: e.to_string(),
        },
    }
}
