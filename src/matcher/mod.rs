pub mod normalize;

pub use normalize::*;

/// Marker that opens one listing entry in maps search markdown
pub const LISTING_MARKER: &str = "(https://www.google.com/maps/place/";

/// Number of lines (starting at the header) considered part of one listing
pub const LISTING_WINDOW_LINES: usize = 14;

const NAME_SCORE: u32 = 3;
const PHONE_SCORE: u32 = 2;
const ADDRESS_SCORE: u32 = 1;

/// Identity the matcher is looking for
#[derive(Debug, Clone, Default)]
pub struct ExpectedIdentity<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// A scored listing block
#[derive(Debug, Clone, PartialEq)]
pub struct ListingBlock {
    /// Line index of the listing header
    pub start_line: usize,
    pub text: String,
    pub score: u32,
}

/// Isolate the listing block describing the expected business
///
/// A maps search page interleaves many businesses. Each block starts at a
/// header line (`[Name](https://www.google.com/maps/place/...)`) and spans a
/// fixed window of lines. Blocks are scored:
/// 1. +3 if the normalized name appears in the normalized block
/// 2. +2 if the phone digits appear in the block's digits
/// 3. +1 if any distinctive address token appears
///
/// Returns the best block when its score is positive, otherwise an empty
/// string so the caller can fall back to the unfiltered text. Ties go to the
/// first block encountered.
pub fn match_listing_block(
    raw_text: &str,
    expected_name: &str,
    expected_phone: Option<&str>,
    expected_address: Option<&str>,
) -> String {
    let identity = ExpectedIdentity {
        name: expected_name,
        phone: expected_phone,
        address: expected_address,
    };

    best_block(raw_text, &identity)
        .filter(|block| block.score > 0)
        .map(|block| block.text)
        .unwrap_or_default()
}

/// Score every listing block in the text
pub fn score_listing_blocks(raw_text: &str, identity: &ExpectedIdentity<'_>) -> Vec<ListingBlock> {
    let lines: Vec<&str> = raw_text.lines().map(str::trim).collect();
    let scorer = Scorer::new(identity);

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_listing_header(line))
        .filter_map(|(start, _)| {
            let end = (start + LISTING_WINDOW_LINES).min(lines.len());
            let block_lines: Vec<&str> = lines[start..end]
                .iter()
                .copied()
                .filter(|line| !line.is_empty())
                .collect();
            if block_lines.is_empty() {
                return None;
            }
            let text = block_lines.join("\n");
            let score = scorer.score(&text);
            Some(ListingBlock {
                start_line: start,
                text,
                score,
            })
        })
        .collect()
}

fn best_block(raw_text: &str, identity: &ExpectedIdentity<'_>) -> Option<ListingBlock> {
    let mut best: Option<ListingBlock> = None;
    for block in score_listing_blocks(raw_text, identity) {
        // Strictly greater keeps the first block on ties
        if best.as_ref().is_none_or(|b| block.score > b.score) {
            best = Some(block);
        }
    }
    best
}

fn is_listing_header(line: &str) -> bool {
    line.starts_with('[') && line.contains(LISTING_MARKER)
}

/// Pre-normalized identity evidence
struct Scorer {
    name: String,
    phone_digits: String,
    address_tokens: Vec<String>,
}

impl Scorer {
    fn new(identity: &ExpectedIdentity<'_>) -> Self {
        Self {
            name: normalize_text(identity.name),
            phone_digits: digits_only(identity.phone.unwrap_or_default()),
            address_tokens: address_tokens(identity.address.unwrap_or_default()),
        }
    }

    fn score(&self, block: &str) -> u32 {
        let normalized = normalize_text(block);
        let mut score = 0;

        if !self.name.is_empty() && normalized.contains(&self.name) {
            score += NAME_SCORE;
        }
        if !self.phone_digits.is_empty() && digits_only(block).contains(&self.phone_digits) {
            score += PHONE_SCORE;
        }
        if self
            .address_tokens
            .iter()
            .any(|token| normalized.contains(token.as_str()))
        {
            score += ADDRESS_SCORE;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, slug: &str, phone: &str, street: &str) -> String {
        // 14 lines per listing so each window covers exactly one business
        [
            format!("[{name}]({LISTING_MARKER}{slug})"),
            "4.6(87)".to_string(),
            "Roofing contractor".to_string(),
            street.to_string(),
            String::new(),
            "Open 24 hours".to_string(),
            phone.to_string(),
            "\"Great crew, fast work\"".to_string(),
            String::new(),
            "Website".to_string(),
            "Directions".to_string(),
            String::new(),
            "Save".to_string(),
            String::new(),
        ]
        .join("\n")
            + "\n"
    }

    fn search_page() -> String {
        let mut page = String::from("Results\n\n");
        page.push_str(&listing("Summit Roof Co", "summit", "(512) 555-0111", "88 Ridge Rd"));
        page.push_str(&listing(
            "Acme Roofing & Repair",
            "acme",
            "(512) 555-0199",
            "400 Congress Ave",
        ));
        page.push_str(&listing("Lone Star Roofers", "lonestar", "(512) 555-0123", "12 Elm St"));
        page
    }

    #[test]
    fn test_matches_block_by_name_and_phone() {
        let page = search_page();

        let block = match_listing_block(&page, "Acme Roofing and Repair", Some("512-555-0199"), None);

        assert!(block.starts_with("[Acme Roofing & Repair]"));
        assert!(block.contains("(512) 555-0199"));
        assert!(!block.contains("Summit"));
        assert!(!block.contains("Lone Star"));
    }

    #[test]
    fn test_exact_target_block_is_returned() {
        let page = search_page();
        let identity = ExpectedIdentity {
            name: "Acme Roofing Repair",
            phone: Some("5125550199"),
            address: None,
        };

        let blocks = score_listing_blocks(&page, &identity);
        let target = blocks
            .iter()
            .find(|b| b.text.starts_with("[Acme"))
            .unwrap()
            .text
            .clone();

        assert_eq!(
            match_listing_block(&page, identity.name, identity.phone, None),
            target
        );
    }

    #[test]
    fn test_no_evidence_returns_empty() {
        let page = search_page();
        let block = match_listing_block(
            &page,
            "Totally Different Plumbing",
            Some("999-000-1111"),
            Some("1 Nowhere Ln"),
        );
        assert!(block.is_empty());
    }

    #[test]
    fn test_no_listing_headers_returns_empty() {
        let text = "Acme Roofing\n(512) 555-0199\nno structured listings here";
        assert!(match_listing_block(text, "Acme Roofing", Some("5125550199"), None).is_empty());
    }

    #[test]
    fn test_address_alone_is_enough() {
        let page = search_page();
        let block = match_listing_block(&page, "", None, Some("12 Elm Street"));
        // "street" is not in any block but "elm" is too short; nothing matches
        assert!(block.is_empty());

        let block = match_listing_block(&page, "", None, Some("400 Congress Avenue"));
        assert!(block.starts_with("[Acme Roofing & Repair]"));
    }

    #[test]
    fn test_ties_keep_first_block() {
        let page = format!(
            "{}{}",
            listing("Acme Roofing", "a1", "(512) 555-0001", "1 First St"),
            listing("Acme Roofing", "a2", "(512) 555-0002", "2 Second St")
        );

        let block = match_listing_block(&page, "Acme Roofing", None, None);

        assert!(block.contains("a1"));
        assert!(!block.contains("a2"));
    }

    #[test]
    fn test_window_is_capped() {
        let mut page = format!("[Acme]({LISTING_MARKER}acme)\n");
        for i in 0..30 {
            page.push_str(&format!("line {i}\n"));
        }

        let blocks = score_listing_blocks(
            &page,
            &ExpectedIdentity {
                name: "Acme",
                ..Default::default()
            },
        );

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text.lines().count(), LISTING_WINDOW_LINES);
        assert_eq!(blocks[0].score, 3);
    }
}
