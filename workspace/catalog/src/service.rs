use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// Page size requested when the controller needs the whole collection.
pub const FULL_SNAPSHOT_PAGE_SIZE: usize = 1000;

/// A record the controller can manage.
///
/// Only the identifier and the optional display name are ever read; every
/// other field stays opaque.
pub trait Record {
    fn id(&self) -> i64;

    fn name(&self) -> Option<&str> {
        None
    }
}

/// One caller-defined filter forwarded positionally to the loader
/// (a year, a month, a status code...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Empty,
    Int(i64),
    Text(String),
    Bool(bool),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Empty => true,
            FilterValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Empty => Ok(()),
            FilterValue::Int(value) => write!(f, "{}", value),
            FilterValue::Text(value) => f.write_str(value),
            FilterValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(value.into())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Int(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FilterValue::Empty)
    }
}

/// Arguments of a single loader call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadQuery {
    /// Ask for the complete collection instead of one page
    pub want_all: bool,
    /// 1-based page index
    pub page: usize,
    pub page_size: usize,
    pub search: String,
    pub extra: Vec<FilterValue>,
}

impl LoadQuery {
    /// The follow-up query used to discover the full collection.
    pub fn full_snapshot(&self) -> Self {
        Self {
            want_all: true,
            page: 1,
            page_size: FULL_SNAPSHOT_PAGE_SIZE,
            search: self.search.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Number of rows that precede the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// What a loader may answer with.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResponse<E> {
    /// A bare list, as returned by simple backends
    List(Vec<E>),
    /// A page together with the total number of matches
    Paged { data: Vec<E>, total: usize },
}

impl<E> LoadResponse<E> {
    pub fn into_items(self) -> Vec<E> {
        match self {
            LoadResponse::List(items) => items,
            LoadResponse::Paged { data, .. } => data,
        }
    }
}

/// The four operations a catalog screen is built on.
#[async_trait]
pub trait CatalogService: Send + Sync {
    type Entity: Record + Clone + Send + Sync + 'static;
    type Create: Send + 'static;
    type Update: Send + 'static;
    /// Whatever the backend returns after a create or update
    type Output: Send + 'static;

    async fn load(&self, query: &LoadQuery) -> Result<LoadResponse<Self::Entity>>;

    async fn create(&self, payload: Self::Create) -> Result<Self::Output>;

    async fn update(&self, id: i64, payload: Self::Update) -> Result<Self::Output>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// Yes/no prompt shown before destructive operations.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Accepts every prompt. Used by non-interactive callers.
pub struct AlwaysConfirm;

#[async_trait]
impl Confirm for AlwaysConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}
