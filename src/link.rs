//! Suite deep links.
//!
//! A locator such as `https://host/app?suiteId=<id>` opens straight into a
//! suite. Locators may also be relative (`/app?suiteId=x` or `?suiteId=x`).

use url::Url;

/// Query parameter carrying the suite id
pub const SUITE_PARAM: &str = "suiteId";

const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Parsed locator, remembering whether it was relative
fn parse(locator: &str) -> Option<(Url, bool)> {
    if let Ok(url) = Url::parse(locator) {
        return Some((url, false));
    }
    let base = Url::parse(RELATIVE_BASE).ok()?;
    base.join(locator).ok().map(|url| (url, true))
}

/// Extract the suite id from a locator; `None` when absent or empty
pub fn suite_id_from_locator(locator: &str) -> Option<String> {
    let (url, _) = parse(locator)?;
    url.query_pairs()
        .find(|(key, _)| key == SUITE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The locator with the suite parameter removed and other parameters kept.
///
/// Unparseable locators are returned unchanged.
pub fn clear_suite_param(locator: &str) -> String {
    let Some((mut url, relative)) = parse(locator) else {
        return locator.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SUITE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    if !relative {
        return url.to_string();
    }

    // Keep the caller's text up to the query; only the query is rebuilt
    let end = locator.find(['?', '#']).unwrap_or(locator.len());
    let mut out = locator[..end].to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
