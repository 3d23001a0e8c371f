//! Turns a loader answer into the rows, snapshot and total the controller shows.
//!
//! Backends answer in two shapes and some of them ignore pagination, so each
//! case is a named branch here and can be tested without a controller.

use std::collections::HashSet;

use crate::service::{LoadQuery, LoadResponse, Record};

/// Rows ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<E> {
    /// Everything known about the collection, always containing `page_items`
    pub full_items: Vec<E>,
    pub page_items: Vec<E>,
    pub total: usize,
}

/// Result of the first look at a loader answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<E> {
    Ready(Resolved<E>),
    /// A plain list filled the whole page; more rows may exist beyond it.
    NeedsFullSnapshot { page_items: Vec<E> },
}

pub fn resolve<E: Record + Clone>(query: &LoadQuery, response: LoadResponse<E>) -> Outcome<E> {
    match response {
        LoadResponse::List(items) if query.page_size > 0 && items.len() == query.page_size => {
            Outcome::NeedsFullSnapshot { page_items: items }
        }
        LoadResponse::List(items) => Outcome::Ready(short_list(query, items)),
        LoadResponse::Paged { data, total }
            if data.len() > query.page_size && data.len() == total =>
        {
            Outcome::Ready(client_side_slice(query, data))
        }
        LoadResponse::Paged { data, total } => Outcome::Ready(server_page(data, total)),
    }
}

/// A list shorter than a page is the last page: nothing exists past it.
fn short_list<E: Clone>(query: &LoadQuery, items: Vec<E>) -> Resolved<E> {
    Resolved {
        total: query.offset() + items.len(),
        full_items: items.clone(),
        page_items: items,
    }
}

/// The backend returned everything despite being asked for one page.
fn client_side_slice<E: Clone>(query: &LoadQuery, data: Vec<E>) -> Resolved<E> {
    let start = query.offset().min(data.len());
    let end = (start + query.page_size).min(data.len());

    Resolved {
        total: data.len(),
        page_items: data[start..end].to_vec(),
        full_items: data,
    }
}

/// The backend honoured pagination; its total is trusted.
fn server_page<E: Clone>(data: Vec<E>, total: usize) -> Resolved<E> {
    Resolved {
        total: total.max(data.len()),
        full_items: data.clone(),
        page_items: data,
    }
}

/// Completes a [`Outcome::NeedsFullSnapshot`] with the answer of the
/// `want_all` follow-up call.
///
/// `full` is `None` when the follow-up failed; the page then counts as the
/// last one.
pub fn with_full_snapshot<E: Record + Clone>(
    query: &LoadQuery,
    page_items: Vec<E>,
    full: Option<Vec<E>>,
) -> Resolved<E> {
    let seen_up_to = query.offset() + page_items.len();

    let Some(mut full_items) = full else {
        return Resolved {
            total: seen_up_to,
            full_items: page_items.clone(),
            page_items,
        };
    };

    let known: HashSet<i64> = full_items.iter().map(Record::id).collect();
    let missing: Vec<E> = page_items
        .iter()
        .filter(|item| !known.contains(&item.id()))
        .cloned()
        .collect();
    full_items.extend(missing);

    Resolved {
        total: full_items.len().max(seen_up_to),
        full_items,
        page_items,
    }
}
