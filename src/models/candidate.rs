use serde::{Deserialize, Serialize};

/// One ranked contractor entry returned by the listing search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Business name as shown on the listing site
    pub name: String,
    /// Star rating on the listing site
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews on the listing site
    #[serde(default, alias = "reviews_count")]
    pub review_count: u32,
    /// Profile page on the listing site itself
    #[serde(default, alias = "yelp_profile_url")]
    pub profile_url: Option<String>,
    /// The contractor's own website
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, rating: f64, review_count: u32) -> Self {
        Self {
            name: name.into(),
            rating,
            review_count,
            profile_url: None,
            website: None,
            phone: None,
            address: None,
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Reclassify a listing-site URL found in `website` into `profile_url`.
    ///
    /// Extraction frequently puts the listing profile link in the website slot.
    /// Blank URL strings are normalized to `None`.
    pub fn normalize_urls(self, listing_domain: &str) -> Self {
        let mut website = non_blank(self.website);
        let mut profile_url = non_blank(self.profile_url);

        if let Some(url) = website.as_deref() {
            if is_listing_url(url, listing_domain) {
                profile_url = website.take();
            }
        }

        Self {
            website,
            profile_url,
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            ..self
        }
    }
}

/// Ordered output of one listing search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source_url: String,
    pub service_type: String,
    pub zip_code: String,
    /// Ranked candidates; index 0 is the default selection
    pub candidates: Vec<Candidate>,
}

impl SearchResult {
    pub fn empty(source_url: impl Into<String>, service_type: &str, zip_code: &str) -> Self {
        Self {
            source_url: source_url.into(),
            service_type: service_type.to_string(),
            zip_code: zip_code.to_string(),
            candidates: Vec::new(),
        }
    }
}

/// Host-based check for whether a URL points at the listing site
///
/// Matching is a case-insensitive substring test on the host. Scheme-less
/// URLs are parsed as https; unparseable input falls back to the raw string.
pub fn is_listing_url(url: &str, listing_domain: &str) -> bool {
    let clean = url.trim().to_lowercase();
    if clean.is_empty() || listing_domain.is_empty() {
        return false;
    }
    let domain = listing_domain.to_lowercase();

    let with_scheme = if clean.contains("://") {
        clean.clone()
    } else {
        format!("https://{}", clean)
    };

    match url::Url::parse(&with_scheme) {
        Ok(parsed) => parsed
            .host_str()
            .is_some_and(|host| host.contains(&domain)),
        Err(_) => clean.contains(&domain),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
