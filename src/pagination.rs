//! Lazy walk over `nextPage`-linked collections.

use std::{collections::HashSet, future::Future};

use futures_util::stream::{self, Stream};
use tracing::{debug, warn};

use crate::{platform_path, Document, Result};

/// Fetches `first_path`, then keeps following the `nextPage` link of each
/// page until a page carries none.
///
/// The link is looked up by relation name, never by its position in the
/// collection. Its absolute uri is turned back into a path under
/// `platform_root` before being handed to `fetch`. The first error ends
/// the stream after being yielded. A link back to a page already fetched
/// ends the walk. Each call starts over at `first_path`.
pub fn walk<F, Fut>(
    platform_root: &str,
    first_path: &str,
    fetch: F,
) -> impl Stream<Item = Result<Document>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Document>>,
{
    let platform_root = platform_root.to_string();
    // links are resolved when followed, after their own page was yielded
    stream::try_unfold(
        (Some(first_path.to_string()), HashSet::new(), fetch),
        move |(next_link, mut visited, mut fetch)| {
            let platform_root = platform_root.clone();
            async move {
                let path = match next_link {
                    Some(link) => platform_path(&platform_root, &link)?,
                    None => return Ok(None),
                };
                if !visited.insert(path.clone()) {
                    warn!(%path, "nextPage points back to a visited page, stopping");
                    return Ok(None);
                }
                debug!(%path, "fetching page");
                let page = fetch(path).await?;
                let next_link = page.links.next_page().map(str::to_string);
                Ok(Some((page, (next_link, visited, fetch))))
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use futures_util::{StreamExt, TryStreamExt};
    use serde_json::json;

    use super::*;
    use crate::Error;

    const ROOT: &str = "https://sandboxapi.deere.com/platform";

    fn page(n: u32, next: Option<&str>) -> Document {
        let mut links = vec![json!({"rel": "self", "uri": format!("{}/assetCatalog/{}", ROOT, n)})];
        if let Some(next) = next {
            links.push(json!({"rel": "nextPage", "uri": format!("{}{}", ROOT, next)}));
        }
        serde_json::from_value(json!({ "links": links, "page": n })).unwrap()
    }

    fn site() -> HashMap<String, Document> {
        let mut site = HashMap::new();
        site.insert("/assetCatalog".to_string(), page(1, Some("/assetCatalog?pageOffset=10")));
        site.insert(
            "/assetCatalog?pageOffset=10".to_string(),
            page(2, Some("/assetCatalog?pageOffset=20")),
        );
        site.insert("/assetCatalog?pageOffset=20".to_string(), page(3, None));
        site
    }

    #[tokio::test]
    async fn walk_three_pages_in_link_order() {
        let site = site();
        let mut requested = Vec::new();
        let pages: Vec<Document> = walk(ROOT, "/assetCatalog", |path: String| {
            requested.push(path.clone());
            let doc = site.get(&path).cloned();
            async move { Ok(doc.expect("unknown page")) }
        })
        .try_collect()
        .await
        .unwrap();

        let numbers: Vec<_> = pages.iter().map(|p| p.fields["page"].clone()).collect();
        assert_eq!(numbers, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(
            requested,
            vec![
                "/assetCatalog",
                "/assetCatalog?pageOffset=10",
                "/assetCatalog?pageOffset=20"
            ]
        );
    }

    #[tokio::test]
    async fn walk_restarts_from_first_path() {
        let site = site();
        for _ in 0..2 {
            let count = walk(ROOT, "/assetCatalog?pageOffset=10", |path: String| {
                let doc = site.get(&path).cloned();
                async move { Ok(doc.expect("unknown page")) }
            })
            .count()
            .await;
            assert_eq!(count, 2);
        }
    }

    #[tokio::test]
    async fn next_page_outside_platform_ends_walk() {
        let foreign: Document = serde_json::from_value(json!({
            "links": [{"rel": "nextPage", "uri": "https://elsewhere.example/page/2"}]
        }))
        .unwrap();
        let results: Vec<Result<Document>> = walk(ROOT, "/files", move |_| {
            let doc = foreign.clone();
            async move { Ok(doc) }
        })
        .collect()
        .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::ForeignLink(_))));
    }

    #[tokio::test]
    async fn fetch_error_is_yielded_once() {
        let results: Vec<Result<Document>> = walk(ROOT, "/files", |_| async {
            Err(Error::NotAuthenticated)
        })
        .collect()
        .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::NotAuthenticated)));
    }

    #[tokio::test]
    async fn link_back_to_a_visited_page_ends_walk() {
        let mut site = HashMap::new();
        site.insert("/assetCatalog".to_string(), page(1, Some("/assetCatalog")));
        let pages: Vec<Document> = walk(ROOT, "/assetCatalog", |path: String| {
            let doc = site.get(&path).cloned();
            async move { Ok(doc.expect("unknown page")) }
        })
        .try_collect()
        .await
        .unwrap();
        assert_eq!(pages.len(), 1);

        let mut site = self::site();
        site.insert(
            "/assetCatalog?pageOffset=20".to_string(),
            page(3, Some("/assetCatalog?pageOffset=10")),
        );
        let mut requested = Vec::new();
        let count = walk(ROOT, "/assetCatalog", |path: String| {
            requested.push(path.clone());
            let doc = site.get(&path).cloned();
            async move { Ok(doc.expect("unknown page")) }
        })
        .count()
        .await;
        assert_eq!(count, 3);
        assert_eq!(requested.len(), 3);
    }
}
