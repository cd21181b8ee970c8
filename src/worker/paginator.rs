use std::future::Future;

use log::warn;

/// Outcome of a paged fetch.
///
/// `error == true` always comes with `data == None`: partial pages are never
/// handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFetch<T> {
    pub data: Option<Vec<T>>,
    pub error: bool,
}

impl<T> SeriesFetch<T> {
    fn complete(rows: Vec<T>) -> Self {
        Self {
            data: Some(rows),
            error: false,
        }
    }

    fn failed() -> Self {
        Self {
            data: None,
            error: true,
        }
    }

    /// Rows, unless the fetch failed.
    pub fn into_data(self) -> Option<Vec<T>> {
        if self.error {
            None
        } else {
            self.data
        }
    }
}

/// Fetch every page of a source, one request at a time.
///
/// `fetch_page` receives the skip offset (0, page_size, 2 * page_size, ...).
/// Stops after the first page shorter than `page_size`. Any error aborts the
/// whole fetch without retrying.
pub async fn fetch_all_pages<T, F, Fut>(page_size: usize, mut fetch_page: F) -> SeriesFetch<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<T>>>,
{
    let mut rows = Vec::new();
    let mut skip = 0;

    loop {
        match fetch_page(skip).await {
            Ok(page) => {
                let len = page.len();
                rows.extend(page);

                if page_size == 0 || len < page_size {
                    break;
                }
                skip += page_size;
            },
            Err(e) => {
                warn!("Paged fetch aborted at skip {}: {:#}", skip, e);
                return SeriesFetch::failed();
            },
        }
    }

    SeriesFetch::complete(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_collects_until_short_page() {
        let total = 3 * 1000 + 200;
        let calls = AtomicUsize::new(0);

        let result = fetch_all_pages(1000, |skip| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let end = (skip + 1000).min(total);
                Ok((skip..end).collect::<Vec<usize>>())
            }
        })
        .await;

        assert!(!result.error);
        let rows = result.data.unwrap();
        assert_eq!(rows.len(), 3200);
        assert_eq!(rows.first(), Some(&0));
        assert_eq!(rows.last(), Some(&3199));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let result = fetch_all_pages(1000, |skip| async move {
            let end = (skip + 1000).min(2000);
            Ok((skip..end).collect::<Vec<usize>>())
        })
        .await;

        assert_eq!(result.into_data().map(|rows| rows.len()), Some(2000));
    }

    #[tokio::test]
    async fn test_error_discards_partial_pages() {
        let result = fetch_all_pages(1000, |skip| async move {
            if skip >= 1000 {
                Err(anyhow!("subgraph unavailable"))
            } else {
                Ok(vec![0u8; 1000])
            }
        })
        .await;

        assert!(result.error);
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn test_empty_source_is_not_an_error() {
        let result = fetch_all_pages(1000, |_| async { Ok(Vec::<u8>::new()) }).await;
        assert_eq!(result, SeriesFetch { data: Some(vec![]), error: false });
    }
}
