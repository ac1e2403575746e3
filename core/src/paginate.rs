use crate::error::EraError;
use crate::models::{Page, PageCursor};
use log::{debug, warn};
use std::future::Future;

/// Items gathered before a page request failed, plus the failure.
#[derive(Debug)]
pub struct Partial<T> {
    pub items: Vec<T>,
    pub error: EraError,
}

impl<T> From<Partial<T>> for EraError {
    fn from(partial: Partial<T>) -> Self {
        warn!(
            "Pagination aborted after {} items: {}",
            partial.items.len(),
            partial.error
        );
        partial.error
    }
}

/// Drains a listing, starting from an already fetched first page.
///
/// Every page is appended in order until a page reports no continuation.
pub async fn drain<T, F, Fut>(first: Page<T>, mut next_page: F) -> Result<Vec<T>, Partial<T>>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Page<T>, EraError>>,
{
    let mut items = first.items;
    let mut cursor = first.next;
    let mut pages = 1usize;

    while let Some(next) = cursor {
        match next_page(next).await {
            Ok(page) => {
                pages += 1;
                items.extend(page.items);
                cursor = page.next;
            }
            Err(error) => return Err(Partial { items, error }),
        }
    }

    debug!("Drained {} items over {} pages", items.len(), pages);
    Ok(items)
}

/// Fetches the first page with `fetch(None)` and drains the rest of the listing.
pub async fn fetch_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, Partial<T>>
where
    F: FnMut(Option<PageCursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>, EraError>>,
{
    let first = match fetch(None).await {
        Ok(page) => page,
        Err(error) => {
            return Err(Partial {
                items: Vec::new(),
                error,
            })
        }
    };

    drain(first, |cursor| fetch(Some(cursor))).await
}
