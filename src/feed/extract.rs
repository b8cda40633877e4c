//! Quote page price extraction
//!
//! The quote pages use atomic CSS class names; the headline price usually
//! sits in an `Fz(32px)` element, with smaller reactive variants and a
//! `data-test` marker on some layouts, and a schema.org meta tag as the
//! final fallback. Heuristics are ordered, first parse wins, and a missing
//! price yields the 0.0 sentinel rather than an error so markup drift
//! degrades the cycle instead of failing it. All coupling to the external
//! markup lives in this module.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).unwrap())
    };
}

// Large-desktop price style
static RE_FZ32: LazyLock<Regex> =
    re!(r#"class="[^"]*Fz\(32px\)[^"]*"[^>]*>([0-9][0-9,]*(?:\.[0-9]+)?)<"#);
// Reactive/compact price style
static RE_FZ24: LazyLock<Regex> =
    re!(r#"class="[^"]*Fz\(24px\)[^"]*"[^>]*>([0-9][0-9,]*(?:\.[0-9]+)?)<"#);
// data-test marker used by newer layouts
static RE_QSP: LazyLock<Regex> =
    re!(r#"data-test="qsp-price"[^>]*>([0-9][0-9,]*(?:\.[0-9]+)?)<"#);
// schema.org meta tag fallback
static RE_META: LazyLock<Regex> =
    re!(r#"<meta[^>]*itemprop="price"[^>]*content="([0-9][0-9,]*(?:\.[0-9]+)?)""#);

/// Extract the headline price from a quote page.
///
/// Returns 0.0 when no heuristic matches; callers must treat 0.0 as
/// "no price found", never as a quote.
pub fn extract_price(html: &str) -> f64 {
    for re in [&*RE_FZ32, &*RE_FZ24, &*RE_QSP, &*RE_META] {
        for caps in re.captures_iter(html) {
            if let Some(price) = parse_quote(&caps[1]) {
                return price;
            }
        }
    }
    0.0
}

/// Strip thousands separators, then parse
fn parse_quote(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_font_class_with_thousands_separator() {
        let html = r#"<div><span class="Fw(b) Fz(32px) D(ib)">27,536.66</span></div>"#;
        assert_eq!(extract_price(html), 27_536.66);
    }

    #[test]
    fn first_heuristic_wins_over_meta_tag() {
        let html = concat!(
            r#"<meta itemprop="price" content="99.99">"#,
            r#"<span class="Fz(32px)">16.50</span>"#,
        );
        assert_eq!(extract_price(html), 16.50);
    }

    #[test]
    fn reactive_size_variant_is_second_choice() {
        let html = r#"<span class="C($c-trend-up) Fz(24px)">27624.00</span>"#;
        assert_eq!(extract_price(html), 27_624.00);
    }

    #[test]
    fn data_test_marker_layout() {
        let html = r#"<fin-streamer data-test="qsp-price" active>28,350.5</fin-streamer>"#;
        assert_eq!(extract_price(html), 28_350.5);
    }

    #[test]
    fn meta_tag_fallback() {
        let html = r#"<head><meta itemprop="price" content="14.80"></head><body></body>"#;
        assert_eq!(extract_price(html), 14.80);
    }

    #[test]
    fn unparsable_or_absent_yields_sentinel() {
        assert_eq!(extract_price(""), 0.0);
        assert_eq!(extract_price("<html><body>maintenance</body></html>"), 0.0);
        assert_eq!(
            extract_price(r#"<span class="Fz(32px)">--</span>"#),
            0.0
        );
    }

    #[test]
    fn skips_unparsable_match_and_takes_next() {
        let html = concat!(
            r#"<span class="Fz(32px)">n/a</span>"#,
            r#"<span class="Fz(32px)">27536.66</span>"#,
        );
        assert_eq!(extract_price(html), 27_536.66);
    }
}
