use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{ConsolidatedReport, WebsiteDetails};

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable report format
pub struct HumanReport<'a> {
    report: &'a ConsolidatedReport,
}

impl<'a> HumanReport<'a> {
    pub fn new(report: &'a ConsolidatedReport) -> Self {
        Self { report }
    }

    /// Format the report as human-readable text
    pub fn format(&self) -> String {
        let report = self.report;
        let mut output = String::new();

        output.push_str(&format!("{}\n", report.contractor_name));
        output.push_str(&format!(
            "{} in {}\n",
            report.service_type, report.zip_code
        ));

        if let Some(candidate) = &report.selected_candidate {
            output.push_str(&format!(
                "Listing: {:.1} stars from {} reviews\n",
                candidate.rating, candidate.review_count
            ));
            if let Some(phone) = &candidate.phone {
                output.push_str(&format!("Phone: {}\n", phone));
            }
            if let Some(address) = &candidate.address {
                output.push_str(&format!("Address: {}\n", address));
            }
        }
        output.push('\n');

        output.push_str("Website\n-------\n");
        match &report.website {
            Some(WebsiteDetails::Parsed(info)) => {
                if let Some(url) = &info.source_url {
                    output.push_str(&format!("URL: {}\n", url));
                }
                if !info.services_offered.is_empty() {
                    let services = info.services_offered.join(", ");
                    output.push_str(&wrap_text(&format!("Services: {}", services), 80));
                    output.push('\n');
                }
                if let Some(license) = &info.license_number {
                    output.push_str(&format!("License: {}\n", license));
                }
                if let Some(years) = info.years_in_business {
                    output.push_str(&format!("Years in business: {}\n", years));
                }
            }
            Some(WebsiteDetails::Raw(raw)) if !raw.trim().is_empty() => {
                output.push_str(&wrap_text(raw, 80));
                output.push('\n');
            }
            _ => output.push_str("(no website data)\n"),
        }
        output.push('\n');

        let summary = &report.review_summary;
        output.push_str(&format!("Reviews: {}\n-------\n", summary.overall_sentiment));
        push_list(&mut output, "Positive", &summary.positive_themes);
        push_list(&mut output, "Negative", &summary.negative_themes);
        output.push('\n');

        if !report.flags.is_empty() {
            output.push_str("Flags\n-----\n");
            for flag in &report.flags {
                output.push_str(&format!("- {}\n", flag));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "Run {} at {}\n",
            report.run_id,
            report.generated_at.to_rfc3339()
        ));
        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn push_list(output: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("{}:\n", label));
    for item in items {
        output.push_str(&format!("  - {}\n", item));
    }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, ReviewSummary, WebsiteInfo};
    use chrono::Utc;
    use uuid::Uuid;

    fn report() -> ConsolidatedReport {
        let mut website = WebsiteInfo::for_url("https://acme.example");
        website.services_offered = vec!["Shingle".to_string(), "TPO".to_string()];
        website.license_number = Some("RC-1234".to_string());

        ConsolidatedReport {
            contractor_name: "Acme Roofing".to_string(),
            service_type: "roofing".to_string(),
            zip_code: "78701".to_string(),
            selected_contractor_index: Some(0),
            selected_candidate: Some(
                Candidate::new("Acme Roofing", 4.5, 120).with_phone("(512) 555-0100"),
            ),
            listing_source_url: Some("https://www.yelp.com/search".to_string()),
            raw_reviews_data: Some("Great crew".to_string()),
            raw_registry_data: Some(String::new()),
            website: Some(WebsiteDetails::Parsed(website)),
            review_summary: ReviewSummary {
                positive_themes: vec!["Punctual".to_string()],
                negative_themes: vec![],
                overall_sentiment: "Positive".to_string(),
            },
            flags: vec!["No registry data found for contractor='Acme Roofing' in zip='78701'.".to_string()],
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_human_report_sections() {
        let report = report();
        let text = HumanReport::new(&report).format();

        assert!(text.starts_with("Acme Roofing\nroofing in 78701\n"));
        assert!(text.contains("Listing: 4.5 stars from 120 reviews"));
        assert!(text.contains("Services: Shingle, TPO"));
        assert!(text.contains("License: RC-1234"));
        assert!(text.contains("Reviews: Positive"));
        assert!(text.contains("  - Punctual"));
        assert!(!text.contains("Negative:"));
        assert!(text.contains("- No registry data found"));
    }

    #[test]
    fn test_human_report_without_website() {
        let mut report = report();
        report.website = None;
        let text = HumanReport::new(&report).format();
        assert!(text.contains("(no website data)"));
    }

    #[test]
    fn test_write_json_keeps_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = report();

        write_json(&report, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let positions: Vec<usize> = [
            "\"contractor_name\"",
            "\"selected_candidate\"",
            "\"website\"",
            "\"review_summary\"",
            "\"flags\"",
            "\"run_id\"",
            "\"generated_at\"",
        ]
        .iter()
        .map(|key| written.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let parsed: ConsolidatedReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_write_human_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let report = report();

        HumanReport::new(&report).write_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, HumanReport::new(&report).format());
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a test of the text wrapping function that should wrap at 20 chars";
        let wrapped = wrap_text(text, 20);
        for line in wrapped.lines() {
            assert!(line.len() <= 25);
        }
    }
}
