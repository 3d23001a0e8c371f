//! Paginated CRUD state shared by every catalog screen of the admin client.
//!
//! A screen plugs its REST service into [`CrudCatalog`] and gets list loading,
//! paging, search, the create/edit form lifecycle and user notifications.

pub mod controller;
pub mod error;
pub mod notification;
pub mod pager;
pub mod resolve;
pub mod service;

pub use controller::{CatalogOptions, CatalogView, CrudCatalog, FormState};
pub use error::{Result, ServerMessage, ServiceError};
pub use notification::{Notification, NotificationKind, Notifier};
pub use service::{
    AlwaysConfirm, CatalogService, Confirm, FilterValue, LoadQuery, LoadResponse, Record,
};

#[cfg(test)]
mod tests;
