use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::error::FetchError;
use crate::fetcher::PageSource;

const RESULT_LINK: &str = "a.a-link-normal.s-no-outline";
const PRODUCT_PATH_MARKER: &str = "/dp/";

/// Which result anchors are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFilter {
    /// Only canonical product-detail paths.
    ProductPages,
    /// Every matched anchor.
    Any,
}

pub struct SearchCollector<'a, S: PageSource> {
    source: &'a S,
    base_url: &'a Url,
    filter: LinkFilter,
}

impl<'a, S: PageSource> SearchCollector<'a, S> {
    pub fn new(source: &'a S, base_url: &'a Url, filter: LinkFilter) -> Self {
        Self {
            source,
            base_url,
            filter,
        }
    }

    /// Fetches the results page for `keyword` and returns up to `max_results`
    /// distinct product URLs in page order. Every call re-fetches.
    pub fn collect(&self, keyword: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        let search_url = search_url(self.base_url, keyword)?;
        let html = self.source.fetch_html(search_url.as_str())?;
        Ok(product_links(&html, self.base_url, self.filter, max_results))
    }
}

pub fn search_url(base_url: &Url, keyword: &str) -> Result<Url, FetchError> {
    let mut url = base_url
        .join("/s")
        .map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
    url.query_pairs_mut().clear().append_pair("k", keyword);
    Ok(url)
}

/// Absolute, query-free, deduplicated result links.
pub fn product_links(html: &str, base_url: &Url, filter: LinkFilter, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(RESULT_LINK).expect("built-in selector must be valid CSS");
    let mut seen = HashSet::new();

    doc.select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| canonical_link(base_url, href))
        .filter(|link| filter == LinkFilter::Any || link.contains(PRODUCT_PATH_MARKER))
        .filter(|link| seen.insert(link.clone()))
        .take(max_results)
        .collect()
}

fn canonical_link(base_url: &Url, href: &str) -> Option<String> {
    let mut url = base_url.join(href).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const RESULTS: &str = r#"
        <a class="a-link-normal s-no-outline" href="/Logitech-Mouse/dp/B001?ref=sr_1&qid=9">one</a>
        <a class="a-link-normal s-no-outline" href="/Logitech-Mouse/dp/B001?ref=sr_2">dup</a>
        <a class="a-link-normal s-no-outline" href="/sspa/click?adId=7">ad</a>
        <a class="a-link-normal" href="/Other/dp/B999">not a result</a>
        <a class="a-link-normal s-no-outline" href="/HP-Mouse/dp/B002">two</a>
        <a class="a-link-normal s-no-outline" href="/Dell-Mouse/dp/B003">three</a>
    "#;

    fn base() -> Url {
        Url::parse("https://www.amazon.in").unwrap()
    }

    #[test]
    fn strips_queries_and_dedups() {
        let links = product_links(RESULTS, &base(), LinkFilter::ProductPages, 10);
        assert_eq!(
            links,
            vec![
                "https://www.amazon.in/Logitech-Mouse/dp/B001",
                "https://www.amazon.in/HP-Mouse/dp/B002",
                "https://www.amazon.in/Dell-Mouse/dp/B003",
            ]
        );
    }

    #[test]
    fn caps_at_max_results() {
        let links = product_links(RESULTS, &base(), LinkFilter::ProductPages, 2);
        assert_eq!(links.len(), 2);
        assert!(links[1].ends_with("/dp/B002"));
    }

    #[test]
    fn any_filter_keeps_non_product_anchors() {
        let links = product_links(RESULTS, &base(), LinkFilter::Any, 10);
        assert_eq!(links.len(), 4);
        assert_eq!(links[1], "https://www.amazon.in/sspa/click");
    }

    #[test]
    fn search_url_form_encodes_keyword() {
        let url = search_url(&base(), "wireless mouse").unwrap();
        assert_eq!(url.as_str(), "https://www.amazon.in/s?k=wireless+mouse");
    }

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl PageSource for CountingSource {
        fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            assert!(url.starts_with("https://www.amazon.in/s?k="));
            Ok(RESULTS.to_string())
        }
    }

    #[test]
    fn every_collect_refetches() {
        let source = CountingSource { calls: Cell::new(0) };
        let base = base();
        let collector = SearchCollector::new(&source, &base, LinkFilter::ProductPages);
        let first = collector.collect("mouse", 5).unwrap();
        let second = collector.collect("mouse", 5).unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls.get(), 2);
    }
}
