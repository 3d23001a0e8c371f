use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::{Result, ServerMessage, ServiceError};
use crate::notification::NotificationKind;
use crate::service::{
    CatalogService, Confirm, FilterValue, LoadQuery, LoadResponse, Record, FULL_SNAPSHOT_PAGE_SIZE,
};
use crate::{CatalogOptions, CrudCatalog, FormState};

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: i64,
    name: Option<String>,
}

impl Record for Item {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug, Clone)]
struct Draft {
    name: String,
}

/// How the fake backend shapes its list answers.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Bare list honouring `page`/`size`
    PlainList,
    /// `{data, total}` with every row, whatever the page
    Unpaged,
    /// `{data, total}` honouring `page`/`size`
    Paged,
}

struct Backend {
    shape: Shape,
    items: Mutex<Vec<Item>>,
    next_id: AtomicUsize,
    loads: Mutex<Vec<LoadQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    creates: Mutex<Vec<String>>,
    updates: Mutex<Vec<(i64, String)>>,
    deletes: Mutex<Vec<i64>>,
    fail_loads: AtomicBool,
    fail_full_snapshot: AtomicBool,
    fail_writes: Mutex<Option<Vec<String>>>,
}

impl Backend {
    fn new(shape: Shape, count: i64) -> Arc<Self> {
        let items = (1..=count)
            .map(|id| Item {
                id,
                name: Some(format!("Producto {}", id)),
            })
            .collect();

        Arc::new(Self {
            shape,
            items: Mutex::new(items),
            next_id: AtomicUsize::new(count as usize + 1),
            loads: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            fail_loads: AtomicBool::new(false),
            fail_full_snapshot: AtomicBool::new(false),
            fail_writes: Mutex::new(None),
        })
    }

    fn page_loads(&self) -> usize {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .filter(|query| !query.want_all)
            .count()
    }

    fn full_loads(&self) -> Vec<LoadQuery> {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .filter(|query| query.want_all)
            .cloned()
            .collect()
    }

    fn rejection(&self) -> Option<ServiceError> {
        self.fail_writes
            .lock()
            .unwrap()
            .clone()
            .map(|messages| ServiceError::Rejected {
                status: 400,
                message: Some(ServerMessage::List(messages)),
            })
    }
}

struct FakeService(Arc<Backend>);

#[async_trait]
impl CatalogService for FakeService {
    type Entity = Item;
    type Create = Draft;
    type Update = Draft;
    type Output = Item;

    async fn load(&self, query: &LoadQuery) -> Result<LoadResponse<Item>> {
        let backend = &self.0;
        let now = backend.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        backend.max_in_flight.fetch_max(now, Ordering::SeqCst);

        sleep(Duration::from_millis(10)).await;
        backend.loads.lock().unwrap().push(query.clone());
        backend.in_flight.fetch_sub(1, Ordering::SeqCst);

        if backend.fail_loads.load(Ordering::SeqCst)
            || (query.want_all && backend.fail_full_snapshot.load(Ordering::SeqCst))
        {
            return Err(ServiceError::Transport("connection refused".to_string()));
        }

        let matching: Vec<Item> = backend
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| {
                item.name
                    .as_deref()
                    .is_some_and(|name| name.contains(query.search.as_str()))
            })
            .cloned()
            .collect();

        let page: Vec<Item> = matching
            .iter()
            .skip(query.offset())
            .take(query.page_size)
            .cloned()
            .collect();

        Ok(match backend.shape {
            Shape::PlainList => LoadResponse::List(page),
            Shape::Unpaged => LoadResponse::Paged {
                total: matching.len(),
                data: matching,
            },
            Shape::Paged => LoadResponse::Paged {
                data: page,
                total: matching.len(),
            },
        })
    }

    async fn create(&self, payload: Draft) -> Result<Item> {
        if let Some(err) = self.0.rejection() {
            return Err(err);
        }
        let id = self.0.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let item = Item {
            id,
            name: Some(payload.name.clone()),
        };
        self.0.creates.lock().unwrap().push(payload.name);
        self.0.items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, payload: Draft) -> Result<Item> {
        if let Some(err) = self.0.rejection() {
            return Err(err);
        }
        self.0.updates.lock().unwrap().push((id, payload.name.clone()));
        let mut items = self.0.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ServiceError::Other("not found".to_string()))?;
        item.name = Some(payload.name);
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if let Some(err) = self.0.rejection() {
            return Err(err);
        }
        self.0.deletes.lock().unwrap().push(id);
        self.0.items.lock().unwrap().retain(|item| item.id != id);
        Ok(())
    }
}

#[derive(Clone)]
struct RecordingConfirm {
    answer: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingConfirm {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Confirm for RecordingConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answer
    }
}

fn catalog_with(
    backend: &Arc<Backend>,
    confirm: RecordingConfirm,
    page_size: usize,
) -> CrudCatalog<FakeService> {
    CrudCatalog::new(
        FakeService(Arc::clone(backend)),
        "Producto",
        confirm,
        CatalogOptions {
            page_size,
            ..CatalogOptions::default()
        },
    )
}

fn catalog(backend: &Arc<Backend>, page_size: usize) -> CrudCatalog<FakeService> {
    catalog_with(backend, RecordingConfirm::answering(true), page_size)
}

fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|item| item.id).collect()
}

#[tokio::test(start_paused = true)]
async fn test_walk_plain_list_pages() {
    let backend = Backend::new(Shape::PlainList, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_page(2).await;
    catalog.set_page(3).await;

    let view = catalog.view();
    assert_eq!(view.page, 3);
    assert_eq!(ids(&view.page_items), vec![11, 12]);
    assert_eq!(view.total_count, 12);
    assert_eq!(view.page_count, 3);
    assert!(!view.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_full_page_list_takes_total_from_snapshot() {
    let backend = Backend::new(Shape::PlainList, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;

    assert_eq!(catalog.total_count(), 12);
    assert_eq!(ids(&catalog.page_items()), vec![1, 2, 3, 4, 5]);

    let full_loads = backend.full_loads();
    assert_eq!(full_loads.len(), 1);
    assert!(full_loads[0].page_size >= FULL_SNAPSHOT_PAGE_SIZE);
    // Rows outside the current page are still known to the snapshot
    assert!(catalog.find(12).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_snapshot_falls_back_to_page_length() {
    let backend = Backend::new(Shape::PlainList, 12);
    backend.fail_full_snapshot.store(true, Ordering::SeqCst);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;

    assert_eq!(catalog.total_count(), 5);
    assert_eq!(catalog.page_items().len(), 5);
    assert!(catalog.notification().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unpaged_backend_is_sliced_locally() {
    let backend = Backend::new(Shape::Unpaged, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    assert_eq!(ids(&catalog.page_items()), vec![1, 2, 3, 4, 5]);

    catalog.set_page(2).await;
    assert_eq!(ids(&catalog.page_items()), vec![6, 7, 8, 9, 10]);
    assert_eq!(catalog.total_count(), 12);

    catalog.set_page(3).await;
    assert_eq!(ids(&catalog.page_items()), vec![11, 12]);
    assert!(backend.full_loads().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_paged_backend_total_is_trusted() {
    let backend = Backend::new(Shape::Paged, 23);
    let catalog = catalog(&backend, 10);

    catalog.reload().await;
    catalog.set_page(3).await;

    let view = catalog.view();
    assert_eq!(ids(&view.page_items), vec![21, 22, 23]);
    assert_eq!(view.total_count, 23);
    assert_eq!(view.page_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_same_search_text_resets_once() {
    let backend = Backend::new(Shape::Paged, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_page(2).await;
    let before = backend.page_loads();

    catalog.set_search_text("Producto").await;
    catalog.set_search_text("Producto").await;

    assert_eq!(backend.page_loads(), before + 1);
    assert_eq!(catalog.page(), 1);
    assert_eq!(catalog.search_text(), "Producto");
}

#[tokio::test(start_paused = true)]
async fn test_search_filters_and_forwards_text() {
    let backend = Backend::new(Shape::Paged, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_search_text("Producto 1").await;

    assert_eq!(ids(&catalog.page_items()), vec![1, 10, 11, 12]);
    assert_eq!(catalog.total_count(), 4);
    let last = backend.loads.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.search, "Producto 1");
}

#[tokio::test(start_paused = true)]
async fn test_set_page_is_clamped() {
    let backend = Backend::new(Shape::Paged, 12);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_page(40).await;
    assert_eq!(catalog.page(), 3);

    let before = backend.page_loads();
    catalog.set_page(0).await;
    assert_eq!(catalog.page(), 1);
    assert_eq!(backend.page_loads(), before + 1);
}

#[tokio::test(start_paused = true)]
async fn test_page_size_resets_to_first_page() {
    let backend = Backend::new(Shape::Paged, 30);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_page(4).await;
    catalog.set_page_size(25).await;

    let view = catalog.view();
    assert_eq!(view.page, 1);
    assert_eq!(view.page_size, 25);
    assert_eq!(view.page_items.len(), 25);
    assert_eq!(view.page_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_deleting_last_row_of_last_page_moves_back() {
    let backend = Backend::new(Shape::PlainList, 11);
    let catalog = catalog(&backend, 5);

    catalog.reload().await;
    catalog.set_page(3).await;
    assert_eq!(ids(&catalog.page_items()), vec![11]);

    assert!(catalog.delete_entity(11).await);

    let view = catalog.view();
    assert_eq!(view.page, 2);
    assert_eq!(ids(&view.page_items), vec![6, 7, 8, 9, 10]);
    assert_eq!(view.total_count, 10);
}

#[tokio::test(start_paused = true)]
async fn test_only_one_load_in_flight() {
    let backend = Backend::new(Shape::Paged, 12);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;

    tokio::join!(
        catalog.set_search_text("Producto 1"),
        catalog.set_page_size(10),
        catalog.reload(),
    );

    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);

    // The published rows match the state the handlers left behind
    let view = catalog.view();
    assert_eq!(view.search_text, "Producto 1");
    assert_eq!(view.page_size, 10);
    assert_eq!(ids(&view.page_items), vec![1, 10, 11, 12]);
    assert_eq!(view.total_count, 4);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_load_releases_the_flag() {
    let backend = Backend::new(Shape::Paged, 12);
    let catalog = catalog(&backend, 5);

    let abandoned = tokio::time::timeout(Duration::from_millis(1), catalog.reload()).await;
    assert!(abandoned.is_err());
    assert!(!catalog.is_loading());

    catalog.reload().await;
    assert_eq!(ids(&catalog.page_items()), vec![1, 2, 3, 4, 5]);
    assert_eq!(catalog.total_count(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_create_success() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;
    let before = backend.page_loads();

    catalog.open_create_form();
    assert!(catalog.view().is_modal_open());

    let created = catalog
        .submit_form(Draft {
            name: "X".to_string(),
        })
        .await
        .expect("create succeeds");

    assert_eq!(created.id, 4);
    assert_eq!(*backend.creates.lock().unwrap(), vec!["X".to_string()]);
    assert!(backend.updates.lock().unwrap().is_empty());
    assert_eq!(backend.page_loads(), before + 1);

    let view = catalog.view();
    assert_eq!(view.form, FormState::Closed);
    assert_eq!(view.total_count, 4);
    let notification = view.notification.expect("success notification");
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.message, "Producto creado/a correctamente");
}

#[tokio::test(start_paused = true)]
async fn test_create_failure_returns_none() {
    let backend = Backend::new(Shape::Paged, 3);
    *backend.fail_writes.lock().unwrap() = Some(vec!["A".to_string(), "B".to_string()]);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;
    let before = backend.page_loads();

    catalog.open_create_form();
    let result = catalog
        .submit_form(Draft {
            name: "X".to_string(),
        })
        .await;

    assert!(result.is_none());
    assert_eq!(backend.page_loads(), before);

    let view = catalog.view();
    assert_eq!(view.form, FormState::Creating);
    let notification = view.notification.expect("error notification");
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "A, B");
}

#[tokio::test(start_paused = true)]
async fn test_edit_submits_update() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;

    let target = catalog.find(2).expect("row 2 loaded");
    catalog.open_edit_form(target.clone());
    assert_eq!(catalog.view().editing_entity(), Some(&target));

    let updated = catalog
        .submit_form(Draft {
            name: "Renombrado".to_string(),
        })
        .await
        .expect("update succeeds");

    assert_eq!(updated.name.as_deref(), Some("Renombrado"));
    assert_eq!(
        *backend.updates.lock().unwrap(),
        vec![(2, "Renombrado".to_string())]
    );
    assert!(backend.creates.lock().unwrap().is_empty());
    assert_eq!(
        catalog.notification().map(|n| n.message),
        Some("Producto actualizado/a correctamente".to_string())
    );
    assert!(!catalog.view().is_modal_open());
}

#[tokio::test(start_paused = true)]
async fn test_close_form_clears_editing() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;

    catalog.open_edit_form(catalog.find(1).unwrap());
    catalog.close_form();

    let view = catalog.view();
    assert!(!view.is_modal_open());
    assert!(view.editing_entity().is_none());

    // Closing resets to create mode for the next submit
    catalog.open_create_form();
    catalog
        .submit_form(Draft {
            name: "Nuevo".to_string(),
        })
        .await;
    assert_eq!(backend.creates.lock().unwrap().len(), 1);
    assert!(backend.updates.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_unknown_id_does_nothing() {
    let backend = Backend::new(Shape::Paged, 3);
    let confirm = RecordingConfirm::answering(true);
    let catalog = catalog_with(&backend, confirm.clone(), 5);
    catalog.reload().await;

    assert!(!catalog.delete_entity(99).await);

    assert!(confirm.prompts.lock().unwrap().is_empty());
    assert!(backend.deletes.lock().unwrap().is_empty());
    assert!(catalog.notification().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_delete_asks_by_name() {
    let backend = Backend::new(Shape::Paged, 3);
    let confirm = RecordingConfirm::answering(true);
    let catalog = catalog_with(&backend, confirm.clone(), 5);
    catalog.reload().await;

    assert!(catalog.delete_entity(2).await);

    let prompts = confirm.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Producto 2"));
    assert_eq!(*backend.deletes.lock().unwrap(), vec![2]);
    assert_eq!(ids(&catalog.page_items()), vec![1, 3]);
    assert_eq!(
        catalog.notification().map(|n| n.message),
        Some("Producto eliminado/a correctamente".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_declined() {
    let backend = Backend::new(Shape::Paged, 3);
    let confirm = RecordingConfirm::answering(false);
    let catalog = catalog_with(&backend, confirm.clone(), 5);
    catalog.reload().await;
    let before = backend.page_loads();

    assert!(!catalog.delete_entity(1).await);

    assert_eq!(confirm.prompts.lock().unwrap().len(), 1);
    assert!(backend.deletes.lock().unwrap().is_empty());
    assert_eq!(backend.page_loads(), before);
}

#[tokio::test(start_paused = true)]
async fn test_delete_failure_keeps_rows() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;
    *backend.fail_writes.lock().unwrap() = Some(vec!["Tiene ventas asociadas".to_string()]);
    let before = backend.page_loads();

    assert!(!catalog.delete_entity(1).await);

    assert_eq!(backend.page_loads(), before);
    assert_eq!(ids(&catalog.page_items()), vec![1, 2, 3]);
    let notification = catalog.notification().expect("error notification");
    assert!(notification.is_error());
    assert!(notification.message.contains("Tiene ventas asociadas"));
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_shows_empty_list() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;
    assert_eq!(catalog.total_count(), 3);

    backend.fail_loads.store(true, Ordering::SeqCst);
    catalog.reload().await;

    let view = catalog.view();
    assert!(view.page_items.is_empty());
    assert_eq!(view.total_count, 0);
    let notification = view.notification.expect("error notification");
    assert!(notification.is_error());
    assert!(notification.message.contains("Producto"));

    // Still usable once the backend is back
    backend.fail_loads.store(false, Ordering::SeqCst);
    catalog.set_search_text("Producto").await;
    assert_eq!(catalog.total_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_extra_filters_compared_by_value() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = CrudCatalog::new(
        FakeService(Arc::clone(&backend)),
        "Venta",
        RecordingConfirm::answering(true),
        CatalogOptions {
            extra_filters: vec![FilterValue::Int(2024), FilterValue::Int(5)],
            ..CatalogOptions::default()
        },
    );
    catalog.reload().await;
    let before = backend.page_loads();

    catalog
        .set_extra_filters(vec![FilterValue::Int(2024), FilterValue::Int(5)])
        .await;
    assert_eq!(backend.page_loads(), before);

    catalog
        .set_extra_filters(vec![FilterValue::Int(2024), FilterValue::Int(6)])
        .await;
    assert_eq!(backend.page_loads(), before + 1);
    let last = backend.loads.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.extra, vec![FilterValue::Int(2024), FilterValue::Int(6)]);
}

#[tokio::test(start_paused = true)]
async fn test_notification_clears_after_timeout() {
    let backend = Backend::new(Shape::Paged, 3);
    let catalog = catalog(&backend, 5);
    catalog.reload().await;

    catalog.open_create_form();
    catalog
        .submit_form(Draft {
            name: "X".to_string(),
        })
        .await;
    assert!(catalog.notification().is_some());

    sleep(Duration::from_secs(6)).await;
    assert!(catalog.notification().is_none());
}
