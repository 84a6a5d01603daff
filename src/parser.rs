//! Field extraction for product detail pages through ordered selector chains.

use scraper::{Html, Selector};
use tracing::debug;

use crate::models::{Field, ProductSnapshot};

const CURRENCY_SYMBOLS: [char; 5] = ['₹', '$', '€', '£', '¥'];
const SNIPPET_CHARS: usize = 500;

type Matcher<T> = Box<dyn Fn(&Html) -> Option<T> + Send + Sync>;

pub struct Rule<T> {
    label: &'static str,
    matcher: Matcher<T>,
}

impl<T> Rule<T> {
    pub fn new(label: &'static str, matcher: impl Fn(&Html) -> Option<T> + Send + Sync + 'static) -> Self {
        Self {
            label,
            matcher: Box::new(matcher),
        }
    }

    /// Rule reading the trimmed text of the first element matching `css`,
    /// then handing it to `convert`. Blank text counts as no match.
    pub fn text(css: &'static str, convert: fn(&str) -> Option<T>) -> Self
    where
        T: 'static,
    {
        let selector = css_selector(css);
        Self::new(css, move |doc| first_text(doc, &selector).and_then(|text| convert(&text)))
    }
}

pub struct SelectorChain<T> {
    field: Field,
    rules: Vec<Rule<T>>,
}

impl<T> SelectorChain<T> {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    pub fn with(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn resolve(&self, doc: &Html) -> Option<T> {
        self.rules.iter().find_map(|rule| {
            let value = (rule.matcher)(doc);
            if value.is_some() {
                debug!("{} resolved by `{}`", self.field, rule.label);
            }
            value
        })
    }
}

/// Best-effort reader of price, list price, title and rating.
pub struct Extractor {
    price: SelectorChain<f64>,
    list_price: SelectorChain<f64>,
    title: SelectorChain<String>,
    rating: SelectorChain<f64>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        let whole = css_selector("span.a-price-whole");
        let fraction = css_selector("span.a-price-fraction");

        let price = SelectorChain::new(Field::Price)
            .with(Rule::new("a-price-whole + a-price-fraction", move |doc| {
                let whole = first_text(doc, &whole)?;
                let fraction = first_text(doc, &fraction);
                join_price_parts(&whole, fraction.as_deref())
            }))
            .with(Rule::text("span#priceblock_ourprice", parse_amount))
            .with(Rule::text("span#priceblock_dealprice", parse_amount))
            .with(Rule::text("span#priceblock_saleprice", parse_amount))
            .with(Rule::text("span.a-offscreen", parse_amount));

        let list_price = SelectorChain::new(Field::ListPrice)
            .with(Rule::text("span#priceblock_listprice", parse_amount))
            .with(Rule::text("span.priceBlockStrikePriceString", parse_amount))
            .with(Rule::text("span.a-text-strike", parse_amount));

        let title = SelectorChain::new(Field::Title)
            .with(Rule::text("span#productTitle", owned))
            .with(Rule::text("h1#title", owned))
            .with(Rule::text("span.a-size-large.product-title-word-break", owned));

        let rating = SelectorChain::new(Field::Rating)
            .with(Rule::text("span.a-icon-alt", parse_rating))
            .with(Rule::text("span[data-asin].a-size-base.a-color-base", parse_rating));

        Self {
            price,
            list_price,
            title,
            rating,
        }
    }

    /// Reads all four fields. Never fails: an exhausted chain leaves its field
    /// `None` and a bounded snippet of the page is logged for diagnosis.
    pub fn extract(&self, url: &str, html: &str) -> ProductSnapshot {
        let doc = Html::parse_document(html);
        let snapshot = ProductSnapshot {
            url: url.to_string(),
            price: self.price.resolve(&doc),
            list_price: self.list_price.resolve(&doc),
            title: self.title.resolve(&doc),
            rating: self.rating.resolve(&doc),
        };

        let missing = snapshot.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            debug!(
                "no {} on {url}; page starts with: {}",
                names.join(", "),
                snippet(html, SNIPPET_CHARS)
            );
        }
        snapshot
    }
}

fn css_selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector must be valid CSS")
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    let element = doc.select(selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn owned(text: &str) -> Option<String> {
    Some(text.to_string())
}

/// Drops thousands separators and currency symbols.
pub fn clean_amount(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses the leading token of a price label such as `"₹1,299.00 M.R.P."`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = clean_amount(text);
    let token = cleaned.split_whitespace().next()?;
    finite(token.trim_end_matches('.'))
}

/// Combines the integer and optional fractional price spans.
pub fn join_price_parts(whole: &str, fraction: Option<&str>) -> Option<f64> {
    let whole = clean_amount(whole);
    let whole = whole.trim_end_matches('.');
    match fraction.map(str::trim).filter(|f| !f.is_empty()) {
        Some(fraction) => finite(&format!("{whole}.{fraction}")),
        None => finite(whole),
    }
}

/// Parses ratings such as `"4.3 out of 5 stars"`.
pub fn parse_rating(text: &str) -> Option<f64> {
    let token = text.split_whitespace().next()?;
    finite(token).filter(|rating| (0.0..=5.0).contains(rating))
}

fn finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// First `max_chars` characters of a document, for logs.
pub fn snippet(html: &str, max_chars: usize) -> String {
    html.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><head><title>t</title></head><body>{body}</body></html>")
    }

    fn extract(body: &str) -> ProductSnapshot {
        Extractor::new().extract("https://shop.test/dp/X1", &page(body))
    }

    #[test]
    fn whole_and_fraction_are_joined() {
        let snap = extract(
            r#"<span class="a-price-whole">1,299</span><span class="a-price-fraction">50</span>"#,
        );
        assert_eq!(snap.price, Some(1299.5));
    }

    #[test]
    fn whole_with_trailing_decimal_point() {
        let snap = extract(
            r#"<span class="a-price-whole">12,34,999<span class="a-price-decimal">.</span></span>
               <span class="a-price-fraction">00</span>"#,
        );
        assert_eq!(snap.price, Some(1234999.0));
    }

    #[test]
    fn missing_fraction_uses_integer_value() {
        let snap = extract(r#"<span class="a-price-whole">₹1,200</span>"#);
        assert_eq!(snap.price, Some(1200.0));
    }

    #[test]
    fn fallback_chain_order_is_authoritative() {
        let snap = extract(
            r#"<span class="a-offscreen">₹10.00</span>
               <span id="priceblock_saleprice">₹30.00</span>
               <span id="priceblock_dealprice">₹20.00</span>"#,
        );
        assert_eq!(snap.price, Some(20.0));
    }

    #[test]
    fn unparseable_primary_falls_through() {
        let snap = extract(
            r#"<span class="a-price-whole">Currently unavailable</span>
               <span id="priceblock_ourprice">₹ 2,499.00</span>"#,
        );
        assert_eq!(snap.price, Some(2499.0));
    }

    #[test]
    fn price_widget_beats_priceblocks() {
        let snap = extract(
            r#"<span id="priceblock_dealprice">₹700.00</span>
               <span id="priceblock_ourprice">₹800.00</span>
               <span class="a-price-whole">999</span><span class="a-price-fraction">90</span>"#,
        );
        assert_eq!(snap.price, Some(999.9));
    }

    #[test]
    fn our_price_beats_deal_price() {
        let snap = extract(
            r#"<span id="priceblock_dealprice">₹700.00</span>
               <span id="priceblock_ourprice">₹800.00</span>"#,
        );
        assert_eq!(snap.price, Some(800.0));
    }

    #[test]
    fn blank_text_is_no_match() {
        let snap = extract(
            r#"<span id="priceblock_dealprice">   </span>
               <span class="a-offscreen">$15.25</span>
               <span id="productTitle">  </span>
               <h1 id="title">  Wireless Mouse  </h1>"#,
        );
        assert_eq!(snap.price, Some(15.25));
        assert_eq!(snap.title.as_deref(), Some("Wireless Mouse"));
    }

    #[test]
    fn no_price_elements_means_absent() {
        let snap = extract("<div>Nothing to see</div>");
        assert_eq!(snap.price, None);
        assert_eq!(snap.list_price, None);
        assert_eq!(snap.missing().len(), 4);
    }

    #[test]
    fn list_price_chain() {
        let snap = extract(
            r#"<span class="a-text-strike">₹3,000</span>
               <span class="priceBlockStrikePriceString">₹2,800.00</span>"#,
        );
        assert_eq!(snap.list_price, Some(2800.0));
    }

    #[test]
    fn title_prefers_canonical_element() {
        let snap = extract(
            r#"<span class="a-size-large product-title-word-break">Large</span>
               <span id="productTitle">
                   Canonical Title
               </span>"#,
        );
        assert_eq!(snap.title.as_deref(), Some("Canonical Title"));
    }

    #[test]
    fn rating_takes_leading_token() {
        let snap = extract(r#"<span class="a-icon-alt">4.5 out of 5 stars</span>"#);
        assert_eq!(snap.rating, Some(4.5));
    }

    #[test]
    fn rating_rejects_non_numeric_and_falls_through() {
        let snap = extract(
            r#"<span class="a-icon-alt">Prime</span>
               <span data-asin="B0" class="a-size-base a-color-base">3.9 stars</span>"#,
        );
        assert_eq!(snap.rating, Some(3.9));
    }

    #[test]
    fn amount_normalization() {
        assert_eq!(parse_amount("₹1,23,456.78"), Some(123456.78));
        assert_eq!(parse_amount("$ 99 per unit"), Some(99.0));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(join_price_parts("1,000", Some("05")), Some(1000.05));
        assert_eq!(join_price_parts("abc", None), None);
    }

    #[test]
    fn rating_bounds() {
        assert_eq!(parse_rating("5.0 out of 5"), Some(5.0));
        assert_eq!(parse_rating("7.2 out of 5"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn snippet_is_bounded_on_char_boundaries() {
        let html = "₹".repeat(600);
        assert_eq!(snippet(&html, 500).chars().count(), 500);
    }
}
