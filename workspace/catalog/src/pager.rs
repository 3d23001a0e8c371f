/// Page sizes offered by the list screens.
pub const PAGE_SIZES: [usize; 4] = [5, 10, 15, 25];

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pages shown in full before the pager starts collapsing with ellipses.
const MAX_VISIBLE: usize = 5;

/// Number of pages needed for `total` rows. Zero rows means zero pages.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Highest page the cursor may point at. An empty collection still has page 1.
pub fn last_page(total: usize, page_size: usize) -> usize {
    page_count(total, page_size).max(1)
}

pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, last_page(total, page_size))
}

/// One button of the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(usize),
    Ellipsis,
}

/// Pager buttons for `current` out of `total_pages`.
///
/// Few pages are listed in full; otherwise the first, the last and the
/// neighbours of the current page are kept.
pub fn visible_pages(current: usize, total_pages: usize) -> Vec<PageSlot> {
    if total_pages <= 1 {
        return Vec::new();
    }

    if total_pages <= MAX_VISIBLE {
        return (1..=total_pages).map(PageSlot::Page).collect();
    }

    let mut slots = vec![PageSlot::Page(1)];

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);

    if start > 2 {
        slots.push(PageSlot::Ellipsis);
    }

    slots.extend((start..=end).map(PageSlot::Page));

    if end < total_pages - 1 {
        slots.push(PageSlot::Ellipsis);
    }

    slots.push(PageSlot::Page(total_pages));
    slots
}
