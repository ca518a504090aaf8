//! Text and JSON report generation.

use crate::aggregate::AggregateState;
use crate::report::{RunMetadata, RunReport};
use anyhow::{Context, Result};

/// Generate the human-readable report.
pub fn generate_text_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# netspect run\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.state));

    if !report.has_data {
        output.push_str("No data received.\n");
        return output;
    }

    output.push_str(&generate_characters_section(&report.state));
    output.push_str(&generate_houses_section(&report.state));
    output.push_str(&generate_images_section(&report.state));
    output.push_str(&generate_mocks_section(&report.state));

    output
}

/// Generate a pretty-printed JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Started:** {}\n",
        metadata.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Requests Dispatched:** {}\n",
        metadata.requests_dispatched
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_summary_section(state: &AggregateState) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Metric | Count |\n");
    section.push_str("|--------|-------|\n");
    section.push_str(&format!("| Total requests | {} |\n", state.total_requests));
    section.push_str(&format!("| Succeeded | {} |\n", state.successful_requests()));
    section.push_str(&format!("| Failed | {} |\n", state.failed_requests));
    section.push_str(&format!("| Skipped from log | {} |\n", state.skipped_requests));
    section.push_str(&format!("| Characters | {} |\n", state.characters.len()));
    section.push_str(&format!("| Houses | {} |\n", state.houses.len()));
    section.push_str(&format!("| Images | {} |\n", state.images.len()));
    section.push_str(&format!("| Mock responses | {} |\n", state.mock_responses.len()));
    section.push('\n');

    section
}

fn generate_characters_section(state: &AggregateState) -> String {
    if state.characters.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Characters\n\n");
    for character in &state.characters {
        if character.culture.is_empty() {
            section.push_str(&format!("- {}\n", character.display_name()));
        } else {
            section.push_str(&format!(
                "- {} ({})\n",
                character.display_name(),
                character.culture
            ));
        }
    }
    section.push('\n');
    section
}

fn generate_houses_section(state: &AggregateState) -> String {
    if state.houses.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Houses\n\n");
    for house in &state.houses {
        section.push_str(&format!("- **{}** - {}", house.name, house.region));
        if !house.words.is_empty() {
            section.push_str(&format!(" - _\"{}\"_", house.words));
        }
        section.push('\n');
    }
    section.push('\n');
    section
}

fn generate_images_section(state: &AggregateState) -> String {
    if state.images.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Images\n\n");
    for image in &state.images {
        section.push_str(&format!("- #{}: {}\n", image.id, image.download_url));
    }
    section.push('\n');
    section
}

fn generate_mocks_section(state: &AggregateState) -> String {
    if state.mock_responses.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Mock Responses\n\n");
    for mock in &state.mock_responses {
        section.push_str(&format!("- {}\n", mock.response));
    }
    section.push('\n');
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, House, ImageItem, MockResponse};
    use chrono::Utc;

    fn create_test_report(state: AggregateState) -> RunReport {
        RunReport::new(
            RunMetadata {
                started_at: Utc::now(),
                duration_seconds: 1.25,
                requests_dispatched: state.total_requests,
            },
            state,
        )
    }

    fn populated_state() -> AggregateState {
        AggregateState {
            characters: vec![Character {
                url: "https://www.anapioficeandfire.com/api/characters/2".to_string(),
                name: "Walder".to_string(),
                gender: "Male".to_string(),
                culture: String::new(),
                born: String::new(),
                died: String::new(),
                titles: vec![],
                aliases: vec!["Hodor".to_string()],
                played_by: vec!["Kristian Nairn".to_string()],
            }],
            houses: vec![House {
                url: "https://www.anapioficeandfire.com/api/houses/362".to_string(),
                name: "House Stark of Winterfell".to_string(),
                region: "The North".to_string(),
                coat_of_arms: "A running grey direwolf".to_string(),
                words: "Winter is Coming".to_string(),
                titles: vec![],
                seats: vec!["Winterfell".to_string()],
                founded: String::new(),
                died_out: String::new(),
            }],
            images: vec![ImageItem {
                id: "10".to_string(),
                download_url: "https://picsum.photos/id/10/2500/1667".to_string(),
            }],
            mock_responses: vec![MockResponse {
                response: "this is a mock response".to_string(),
            }],
            total_requests: 5,
            skipped_requests: 1,
            failed_requests: 1,
        }
    }

    #[test]
    fn test_generate_text_report() {
        let text = generate_text_report(&create_test_report(populated_state()));

        assert!(text.contains("# netspect run"));
        assert!(text.contains("| Total requests | 5 |"));
        assert!(text.contains("| Succeeded | 4 |"));
        assert!(text.contains("- Walder"));
        assert!(text.contains("House Stark of Winterfell"));
        assert!(text.contains("Winter is Coming"));
        assert!(text.contains("https://picsum.photos/id/10/2500/1667"));
        assert!(text.contains("this is a mock response"));
    }

    #[test]
    fn test_text_report_without_data() {
        let state = AggregateState {
            total_requests: 2,
            failed_requests: 2,
            ..AggregateState::default()
        };
        let text = generate_text_report(&create_test_report(state));
        assert!(text.contains("No data received."));
        assert!(!text.contains("## Houses"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report(populated_state())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["has_data"], true);
        assert_eq!(value["metadata"]["requests_dispatched"], 5);
        assert_eq!(value["state"]["skipped_requests"], 1);
        assert_eq!(value["state"]["houses"][0]["coatOfArms"], "A running grey direwolf");
        assert_eq!(value["state"]["characters"][0]["playedBy"][0], "Kristian Nairn");
    }
}
