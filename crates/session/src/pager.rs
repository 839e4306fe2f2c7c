//! Paging of snapshotted result lists

use crate::cache::{FileSelection, PageView, SessionCache, SessionPayload};

/// Slice out page `page` (zero-based) of `items`.
///
/// A page past the end is an empty slice.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `len` items
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// A selectable file on a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    /// 1-based position in the whole list
    pub number: usize,
    pub display_name: String,
    /// Token resolving to a file selection
    pub token: String,
}

/// A page with every callback target already minted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub query: String,
    /// Zero-based page index
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<PageItem>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl RenderedPage {
    /// True when the requested page holds no items
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }
}

/// Render `view` for `owner`, storing one token per item and per
/// neighbouring page.
///
/// Earlier renders of the same page keep their own tokens until they expire.
pub fn render_page(cache: &SessionCache, owner: u64, view: &PageView, page_size: usize) -> RenderedPage {
    let files = view.files.as_slice();
    let slice = paginate(files, page_size, view.page);
    let pages = total_pages(files.len(), page_size);
    let start = view.page.saturating_mul(page_size);

    let items = slice
        .iter()
        .enumerate()
        .map(|(offset, record)| PageItem {
            number: start + offset + 1,
            display_name: record.display_name.clone(),
            token: cache.store(owner, SessionPayload::File(FileSelection::from(record))),
        })
        .collect();

    let (prev, next) = if slice.is_empty() {
        (None, None)
    } else {
        let prev = (view.page > 0)
            .then(|| cache.store(owner, SessionPayload::Page(view.with_page(view.page - 1))));
        let next = (view.page + 1 < pages)
            .then(|| cache.store(owner, SessionPayload::Page(view.with_page(view.page + 1))));
        (prev, next)
    };

    RenderedPage {
        query: view.query.clone(),
        page: view.page,
        total_pages: pages,
        total_items: files.len(),
        items,
        prev,
        next,
    }
}
