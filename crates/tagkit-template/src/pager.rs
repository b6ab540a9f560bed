//! Pagination window computation and the pager widget.
//!
//! The heart of this module is [`compute_page_window`], a pure function that
//! turns a total item count, page size, current page, and window radius into
//! slice boundaries plus an ordered list of [`LinkEntry`] values (page links,
//! ellipses, prev/next) ready for rendering. [`paginate`] is the tag entry
//! point: it slices a list for the current page and injects the `pager_*`
//! variables into a [`Context`].
//!
//! # Examples
//!
//! ```
//! use tagkit_template::pager::{compute_page_window, LinkEntry};
//!
//! let window = compute_page_window(100, 10, 5, 2).unwrap();
//! assert_eq!(window.total_pages, 10);
//! assert_eq!(window.start, 41);
//! assert_eq!(window.end, 50);
//! assert!(window.links.contains(&LinkEntry::Prev));
//! assert!(window.links.contains(&LinkEntry::Page { number: 5, is_current: true }));
//! ```

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use tagkit_core::error::{TagError, TagResult};
use tagkit_core::settings::PagerSettings;

use crate::context::{Context, TagValue};

/// An entry in a pager navigation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEntry {
    /// A link to the previous page.
    Prev,
    /// A link to a specific page. `is_current` marks the page being viewed.
    Page {
        /// The 1-based page number.
        number: u64,
        /// Whether this entry is the page being viewed.
        is_current: bool,
    },
    /// A gap in the page sequence, collapsed for display.
    Ellipsis,
    /// A link to the next page.
    Next,
}

/// The result of a page-window computation.
///
/// `start`/`end` are 1-based inclusive item indices for the current page;
/// when the requested page lies beyond the data, `start > end` and the slice
/// is empty. The out-of-range page number is kept as-is in `current_page` —
/// navigation links are computed from it without clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based inclusive index of the first item on the page.
    pub start: u64,
    /// 1-based inclusive index of the last item on the page (at most
    /// `total_items`).
    pub end: u64,
    /// Total number of pages: `ceil(total_items / page_size)`.
    pub total_pages: u64,
    /// Total number of items, as supplied.
    pub total_items: u64,
    /// The (possibly out-of-range) current page, after coercion to >= 1.
    pub current_page: u64,
    /// Navigation entries, in display order.
    pub links: Vec<LinkEntry>,
}

impl PageWindow {
    /// Returns the 0-based offset of the first item on the page, suitable
    /// for an offset/limit data source.
    pub const fn offset(&self) -> u64 {
        self.start - 1
    }

    /// Returns `true` if the page holds no items.
    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Renders the navigation widget as an HTML fragment.
    ///
    /// Page links point at `?<query_param>=<n>`; the current page renders as
    /// an inert anchor with the `active` class; gaps render as `" ... "`.
    /// The label text for prev/next comes from the settings and is inserted
    /// as-is, so it may carry markup. Below the links, a summary line shows
    /// the 0-based offset, the end index, and the total count.
    pub fn render_widget(&self, settings: &PagerSettings) -> TagValue {
        let q = utf8_percent_encode(&settings.query_param, NON_ALPHANUMERIC).to_string();
        let mut parts = Vec::with_capacity(self.links.len());
        for link in &self.links {
            match link {
                LinkEntry::Prev => parts.push(format!(
                    "<a href=\"?{q}={}\">{}</a>",
                    self.current_page - 1,
                    settings.previous_text
                )),
                LinkEntry::Page {
                    number,
                    is_current: true,
                } => parts.push(format!(
                    "<a href=\"javascript:void(0)\" class=\"active\">{number}</a>"
                )),
                LinkEntry::Page { number, .. } => {
                    parts.push(format!("<a href=\"?{q}={number}\">{number}</a>"));
                }
                LinkEntry::Ellipsis => parts.push(" ... ".to_string()),
                LinkEntry::Next => parts.push(format!(
                    "<a href=\"?{q}={}\">{}</a>",
                    self.current_page + 1,
                    settings.next_text
                )),
            }
        }
        TagValue::SafeString(format!(
            "<div class=\"pager\"><div class=\"pages\">{}</div>\
             <div class=\"showing\">Showing {} - {} of {}</div></div>",
            parts.concat(),
            self.offset(),
            self.end,
            self.total_items
        ))
    }
}

/// Parses a raw page-number query value.
///
/// Missing, malformed, zero, and negative values all degrade to page 1;
/// this never fails.
pub fn parse_page_param(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&n| n >= 1)
        .map_or(1, |n| n as u64)
}

/// Computes the slice boundaries and navigation links for one page.
///
/// `current_page` is coerced to 1 if it is 0; values beyond the last page
/// are kept as-is, yielding an empty slice while navigation links are still
/// computed from the out-of-range page. With no items at all there are no
/// pages and the link list is empty, whatever the current page.
///
/// A `Next` entry is emitted whenever there is at least one page and the
/// current page differs from the last one; a current page beyond the last
/// therefore still gets a `Next` entry pointing further out.
///
/// # Errors
///
/// Returns [`TagError::InvalidArgument`] if `page_size` is 0.
pub fn compute_page_window(
    total_items: u64,
    page_size: u64,
    current_page: u64,
    window_radius: u64,
) -> TagResult<PageWindow> {
    if page_size == 0 {
        return Err(TagError::InvalidArgument(
            "page_size must be >= 1".to_string(),
        ));
    }
    let current_page = current_page.max(1);
    let total_pages = total_items.div_ceil(page_size);

    let start_offset = (current_page - 1).saturating_mul(page_size);
    let end = current_page.saturating_mul(page_size).min(total_items);

    let mut links = Vec::new();
    if total_pages > 0 {
        if current_page > 1 {
            links.push(LinkEntry::Prev);
        }

        // lower saturates at 0, which compares the same as any value below 1.
        let lower = current_page.saturating_sub(window_radius);
        let upper = current_page.saturating_add(window_radius);

        if lower > 1 {
            links.push(LinkEntry::Page {
                number: 1,
                is_current: false,
            });
            if lower > 2 {
                links.push(LinkEntry::Ellipsis);
            }
        }

        for number in lower.max(1)..=upper.min(total_pages) {
            links.push(LinkEntry::Page {
                number,
                is_current: number == current_page,
            });
        }

        if upper < total_pages.saturating_sub(1) {
            links.push(LinkEntry::Ellipsis);
        }
        if upper < total_pages {
            links.push(LinkEntry::Page {
                number: total_pages,
                is_current: false,
            });
        }
        if current_page != total_pages {
            links.push(LinkEntry::Next);
        }
    }

    Ok(PageWindow {
        start: start_offset + 1,
        end,
        total_pages,
        total_items,
        current_page,
        links,
    })
}

/// The pager tag: slices `items` for the current page and injects the
/// paging variables into the context.
///
/// `raw_page` is the raw (possibly absent or malformed) page query value;
/// anything unusable degrades to page 1. Non-list `items` count as empty.
///
/// Injected variables:
///
/// - `pager_items`: the items on the current page
/// - `pager_start`: 1-based index of the first item on the page
/// - `pager_end`: 1-based index of the last item on the page
/// - `pager_total`: the total item count
/// - `pager`: the rendered navigation widget
///
/// # Errors
///
/// Returns [`TagError::InvalidArgument`] if the configured
/// `items_per_page` is 0.
pub fn paginate(
    ctx: &mut Context,
    items: &TagValue,
    raw_page: Option<&str>,
    settings: &PagerSettings,
) -> TagResult<()> {
    let page = parse_page_param(raw_page);
    let empty = Vec::new();
    let list = match items {
        TagValue::List(l) => l,
        _ => &empty,
    };
    let total = list.len() as u64;

    let window = compute_page_window(total, settings.items_per_page, page, settings.window_radius)?;
    tracing::debug!(
        total,
        page = window.current_page,
        pages = window.total_pages,
        "computed page window"
    );

    let slice = if window.is_empty() {
        Vec::new()
    } else {
        let from = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let to = usize::try_from(window.end).unwrap_or(usize::MAX).min(list.len());
        list.get(from..to).map(<[TagValue]>::to_vec).unwrap_or_default()
    };

    let widget = window.render_widget(settings);
    ctx.set("pager_items", TagValue::List(slice));
    ctx.set("pager_start", TagValue::from(window.start));
    ctx.set("pager_end", TagValue::from(window.end));
    ctx.set("pager_total", TagValue::from(total));
    ctx.set("pager", widget);
    Ok(())
}
