use url::Url;

use crate::config::DEFAULT_SERVICE_TYPE;
use crate::matcher::normalize_text;

/// Domain of the listing site; used to reclassify candidate URLs
pub const LISTING_DOMAIN: &str = "yelp.com";

const LISTING_SEARCH_URL: &str = "https://www.yelp.com/search";
const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
const REGISTRY_SEARCH_URL: &str = "https://www.bbb.org/search";

/// Listing search page for a service in a zip code
pub fn listing_search_url(service_type: &str, zip_code: &str) -> String {
    with_query(
        LISTING_SEARCH_URL,
        &[("find_desc", service_type), ("find_loc", zip_code)],
    )
}

/// Maps search page for one contractor
///
/// The service type is appended only when the name does not already contain
/// it, so "Acme Roofing" + "roofing" searches for "Acme Roofing 78701".
pub fn maps_search_url(contractor_name: &str, zip_code: &str, service_type: Option<&str>) -> String {
    maps_search_query(contractor_name, zip_code, service_type)
        .map(|query| format!("{}{}", MAPS_SEARCH_URL, encode_component(&query)))
        .unwrap_or_else(|| MAPS_SEARCH_URL.to_string())
}

/// The free-text query used for the maps search
pub fn maps_search_query(
    contractor_name: &str,
    zip_code: &str,
    service_type: Option<&str>,
) -> Option<String> {
    let mut parts = vec![contractor_name.trim(), zip_code.trim()];

    if let Some(service) = service_type.map(str::trim).filter(|s| !s.is_empty()) {
        if !normalize_text(contractor_name).contains(&normalize_text(service)) {
            parts.push(service);
        }
    }

    let query = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!query.is_empty()).then_some(query)
}

/// Registry search page for one contractor
pub fn registry_search_url(contractor_name: &str, zip_code: &str, service_type: Option<&str>) -> String {
    let service = service_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SERVICE_TYPE);
    let find_text = format!("{} {}", contractor_name.trim(), service);

    with_query(
        REGISTRY_SEARCH_URL,
        &[
            ("find_country", "USA"),
            ("find_latlng", ""),
            ("find_loc", zip_code.trim()),
            ("find_text", &find_text),
        ],
    )
}

fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    match Url::parse_with_params(base, params) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    }
}

/// Form-encode a single path/query component (spaces become `+`)
fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_search_url() {
        assert_eq!(
            listing_search_url("roof repair", "78701"),
            "https://www.yelp.com/search?find_desc=roof+repair&find_loc=78701"
        );
    }

    #[test]
    fn test_maps_query_skips_service_already_in_name() {
        assert_eq!(
            maps_search_query("Acme Roofing", "78701", Some("roofing")).as_deref(),
            Some("Acme Roofing 78701")
        );
        assert_eq!(
            maps_search_query("Acme Co", "78701", Some("plumbing")).as_deref(),
            Some("Acme Co 78701 plumbing")
        );
        assert_eq!(
            maps_search_query("Acme Co", "78701", Some("  ")).as_deref(),
            Some("Acme Co 78701")
        );
    }

    #[test]
    fn test_maps_search_url_encodes_query() {
        assert_eq!(
            maps_search_url("Bob's A/C", "78701", None),
            "https://www.google.com/maps/search/Bob%27s+A%2FC+78701"
        );
    }

    #[test]
    fn test_registry_url_defaults_service() {
        let url = registry_search_url("Acme Co", "78701", None);
        assert!(url.starts_with("https://www.bbb.org/search?find_country=USA&find_latlng=&find_loc=78701"));
        assert!(url.ends_with("find_text=Acme+Co+home+improvement"));
    }
}
