use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::Result;
use crate::notification::{Notification, Notifier, DEFAULT_NOTIFICATION_TIMEOUT};
use crate::pager::{self, DEFAULT_PAGE_SIZE};
use crate::resolve::{resolve, with_full_snapshot, Outcome, Resolved};
use crate::service::{CatalogService, Confirm, FilterValue, LoadQuery, Record};

/// Construction options for [`CrudCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Extra filter values forwarded positionally to every load
    pub extra_filters: Vec<FilterValue>,
    pub page_size: usize,
    pub notification_timeout: Duration,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            extra_filters: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }
}

/// Lifecycle of the create/edit modal.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState<E> {
    Closed,
    Creating,
    Editing(E),
}

impl<E> FormState<E> {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormState::Closed)
    }

    pub fn editing(&self) -> Option<&E> {
        match self {
            FormState::Editing(entity) => Some(entity),
            _ => None,
        }
    }
}

/// Everything a list screen renders, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView<E> {
    pub page_items: Vec<E>,
    pub is_loading: bool,
    pub total_count: usize,
    pub search_text: String,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub form: FormState<E>,
    pub notification: Option<Notification>,
}

impl<E> CatalogView<E> {
    pub fn is_modal_open(&self) -> bool {
        self.form.is_open()
    }

    pub fn editing_entity(&self) -> Option<&E> {
        self.form.editing()
    }
}

struct State<E> {
    full_items: Vec<E>,
    page_items: Vec<E>,
    total: usize,
    page: usize,
    page_size: usize,
    search: String,
    extra: Vec<FilterValue>,
    form: FormState<E>,
}

impl<E> State<E> {
    fn query(&self) -> LoadQuery {
        LoadQuery {
            want_all: false,
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
            extra: self.extra.clone(),
        }
    }

    fn publish(&mut self, resolved: Resolved<E>) {
        self.full_items = resolved.full_items;
        self.page_items = resolved.page_items;
        self.total = resolved.total;
    }

    fn clear_rows(&mut self) {
        self.full_items.clear();
        self.page_items.clear();
        self.total = 0;
    }
}

enum AfterLoad {
    Done,
    Again,
}

/// Paginated CRUD controller behind every catalog screen.
///
/// Clears the in-flight flag when a load ends, also when its future is dropped.
struct LoadingFlag<'a>(&'a AtomicBool);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the list, pager, search, modal and notification state of one screen
/// and drives the injected [`CatalogService`]. Handlers that change what is
/// shown trigger a load themselves; only one load runs at a time and a load
/// requested meanwhile is dropped.
pub struct CrudCatalog<S: CatalogService> {
    service: S,
    confirm: Box<dyn Confirm>,
    label: String,
    state: Mutex<State<S::Entity>>,
    loading: AtomicBool,
    notifier: Notifier,
}

impl<S: CatalogService> CrudCatalog<S> {
    pub fn new(
        service: S,
        label: impl Into<String>,
        confirm: impl Confirm + 'static,
        options: CatalogOptions,
    ) -> Self {
        Self {
            service,
            confirm: Box::new(confirm),
            label: label.into(),
            state: Mutex::new(State {
                full_items: Vec::new(),
                page_items: Vec::new(),
                total: 0,
                page: 1,
                page_size: options.page_size.max(1),
                search: String::new(),
                extra: options.extra_filters,
                form: FormState::Closed,
            }),
            loading: AtomicBool::new(false),
            notifier: Notifier::new(options.notification_timeout),
        }
    }

    fn state(&self) -> MutexGuard<'_, State<S::Entity>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn view(&self) -> CatalogView<S::Entity> {
        let state = self.state();
        CatalogView {
            page_items: state.page_items.clone(),
            is_loading: self.is_loading(),
            total_count: state.total,
            search_text: state.search.clone(),
            page: state.page,
            page_size: state.page_size,
            page_count: pager::page_count(state.total, state.page_size),
            form: state.form.clone(),
            notification: self.notifier.current(),
        }
    }

    pub fn page_items(&self) -> Vec<S::Entity> {
        self.state().page_items.clone()
    }

    pub fn total_count(&self) -> usize {
        self.state().total
    }

    pub fn page(&self) -> usize {
        self.state().page
    }

    pub fn page_size(&self) -> usize {
        self.state().page_size
    }

    pub fn search_text(&self) -> String {
        self.state().search.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    pub fn dismiss_notification(&self) {
        self.notifier.dismiss();
    }

    /// Looks an entity up in the last full snapshot.
    pub fn find(&self, id: i64) -> Option<S::Entity> {
        self.state()
            .full_items
            .iter()
            .find(|entity| entity.id() == id)
            .cloned()
    }

    /// Updates the search text and goes back to page 1.
    ///
    /// Setting the text it already has does nothing, so a debounced input
    /// firing twice does not reset the pager twice.
    pub async fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut state = self.state();
            if state.search == text {
                trace!(label = %self.label, "Search text unchanged");
                return;
            }
            state.search = text;
            state.page = 1;
        }
        self.reload().await;
    }

    /// Moves the cursor, clamped to the pages the current total allows.
    pub async fn set_page(&self, page: usize) {
        {
            let mut state = self.state();
            let target = pager::clamp_page(page, state.total, state.page_size);
            if target == state.page {
                return;
            }
            state.page = target;
        }
        self.reload().await;
    }

    pub async fn set_page_size(&self, page_size: usize) {
        let page_size = page_size.max(1);
        {
            let mut state = self.state();
            if state.page_size == page_size && state.page == 1 {
                return;
            }
            state.page_size = page_size;
            state.page = 1;
        }
        self.reload().await;
    }

    /// Replaces the extra filters; a list with the same content is ignored.
    pub async fn set_extra_filters(&self, filters: Vec<FilterValue>) {
        {
            let mut state = self.state();
            if state.extra == filters {
                return;
            }
            state.extra = filters;
        }
        self.reload().await;
    }

    pub fn open_create_form(&self) {
        self.state().form = FormState::Creating;
    }

    pub fn open_edit_form(&self, entity: S::Entity) {
        self.state().form = FormState::Editing(entity);
    }

    pub fn close_form(&self) {
        self.state().form = FormState::Closed;
    }

    /// Loads the page the state currently points at.
    ///
    /// Returns immediately when another load is in flight. When the state
    /// moved while loading, the result is discarded and the current state is
    /// loaded instead, still under the same in-flight flag.
    #[instrument(skip(self), fields(label = %self.label))]
    pub async fn reload(&self) {
        if self.loading.swap(true, Ordering::AcqRel) {
            debug!("Load already in flight, dropping request");
            return;
        }
        let _loading = LoadingFlag(&self.loading);

        loop {
            let query = self.state().query();
            trace!(?query, "Loading");
            let fetched = self.fetch(&query).await;

            let after = {
                let mut state = self.state();
                if state.query() != query {
                    debug!("State changed while loading, loading again");
                    AfterLoad::Again
                } else {
                    match fetched {
                        Ok(resolved) => {
                            let last_page = pager::last_page(resolved.total, query.page_size);
                            if query.page > last_page {
                                debug!(
                                    "Page {} no longer exists, moving to page {}",
                                    query.page, last_page
                                );
                                state.page = last_page;
                                AfterLoad::Again
                            } else {
                                debug!(
                                    "Loaded {} of {} rows",
                                    resolved.page_items.len(),
                                    resolved.total
                                );
                                state.publish(resolved);
                                AfterLoad::Done
                            }
                        }
                        Err(err) => {
                            error!("Failed to load {}: {}", self.label, err);
                            state.clear_rows();
                            self.notifier.error(format!(
                                "Error al cargar {}: {}",
                                self.label,
                                err.user_message()
                            ));
                            AfterLoad::Done
                        }
                    }
                }
            };

            if let AfterLoad::Done = after {
                break;
            }
        }
    }

    async fn fetch(&self, query: &LoadQuery) -> Result<Resolved<S::Entity>> {
        let response = self.service.load(query).await?;

        match resolve(query, response) {
            Outcome::Ready(resolved) => Ok(resolved),
            Outcome::NeedsFullSnapshot { page_items } => {
                trace!("Page is full, asking for the whole collection");
                let full = match self.service.load(&query.full_snapshot()).await {
                    Ok(response) => Some(response.into_items()),
                    Err(err) => {
                        warn!("Full snapshot of {} unavailable: {}", self.label, err);
                        None
                    }
                };
                Ok(with_full_snapshot(query, page_items, full))
            }
        }
    }

    /// Sends the form: an update when an entity is being edited, a create
    /// otherwise.
    ///
    /// Returns the backend's answer so the caller can chain on it (uploading
    /// files for a new product, for instance). Failures are reported through
    /// the notification and yield `None`; the form stays open.
    #[instrument(skip(self, payload), fields(label = %self.label))]
    pub async fn submit_form(&self, payload: S::Create) -> Option<S::Output>
    where
        S::Update: From<S::Create>,
    {
        let editing = self.state().form.editing().map(Record::id);

        let (result, verb) = match editing {
            Some(id) => {
                debug!(id, "Submitting update");
                (self.service.update(id, payload.into()).await, "actualizado/a")
            }
            None => {
                debug!("Submitting create");
                (self.service.create(payload).await, "creado/a")
            }
        };

        match result {
            Ok(output) => {
                info!("{} {}", self.label, verb);
                self.notifier
                    .success(format!("{} {} correctamente", self.label, verb));
                self.close_form();
                self.reload().await;
                Some(output)
            }
            Err(err) => {
                error!("Failed to save {}: {}", self.label, err);
                self.notifier.error(err.user_message());
                None
            }
        }
    }

    /// Deletes an entity after the user confirms.
    ///
    /// An id missing from the last full snapshot is ignored without asking.
    /// Returns whether the entity was deleted.
    #[instrument(skip(self), fields(label = %self.label))]
    pub async fn delete_entity(&self, id: i64) -> bool {
        let Some(entity) = self.find(id) else {
            debug!(id, "Entity not in snapshot, nothing to delete");
            return false;
        };

        let display = entity
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", id));
        let prompt = format!("¿Seguro que deseas eliminar {} \"{}\"?", self.label, display);

        if !self.confirm.confirm(&prompt).await {
            debug!(id, "Delete cancelled by user");
            return false;
        }

        match self.service.delete(id).await {
            Ok(()) => {
                info!(id, "{} deleted", self.label);
                self.notifier
                    .success(format!("{} eliminado/a correctamente", self.label));
                self.reload().await;
                true
            }
            Err(err) => {
                error!(id, "Failed to delete {}: {}", self.label, err);
                self.notifier.error(format!(
                    "No se pudo eliminar {}: {}",
                    self.label,
                    err.user_message()
                ));
                false
            }
        }
    }
}
