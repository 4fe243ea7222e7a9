use std::time::Duration;

use serde::Deserialize;

use crate::collaborators::Encyclopedia;

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("artifix/", env!("CARGO_PKG_VERSION"));
const SUMMARY_SENTENCES: usize = 2;

/// Wikipedia REST summary client. All failure modes are humanized into
/// response strings because the router speaks the result verbatim.
pub struct WikiClient {
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct PageSummary {
    #[serde(rename = "type")]
    page_type: String,
    #[serde(default)]
    extract: String,
}

impl WikiClient {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { client }
    }

    fn fetch_summary(&self, term: &str) -> Result<String, String> {
        let title = term.replace(' ', "_");
        let url = format!("{}/{}", SUMMARY_URL, title);
        let response = self.client.get(&url).send().map_err(|e| e.to_string())?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok("No matching Wikipedia page was found.".to_string());
        }
        if !response.status().is_success() {
            return Err(format!("unexpected status {}", response.status()));
        }

        let summary: PageSummary = response.json().map_err(|e| e.to_string())?;
        if summary.page_type == "disambiguation" {
            let options = self.search_titles(term).unwrap_or_default();
            return Ok(format!(
                "The query is ambiguous. Suggestions: {}",
                options.join(", ")
            ));
        }
        if summary.extract.is_empty() {
            return Ok("No matching Wikipedia page was found.".to_string());
        }
        Ok(format!(
            "According to Wikipedia: {}",
            first_sentences(&summary.extract, SUMMARY_SENTENCES)
        ))
    }

    /// Title suggestions for an ambiguous term, via the opensearch API.
    fn search_titles(&self, term: &str) -> Result<Vec<String>, String> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("action", "opensearch"),
                ("search", term),
                ("limit", "5"),
                ("format", "json"),
            ])
            .send()
            .map_err(|e| e.to_string())?;

        // Opensearch replies [query, [titles], [descriptions], [urls]].
        let body: serde_json::Value = response.json().map_err(|e| e.to_string())?;
        let titles = body
            .get(1)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str())
                    .map(|t| t.to_string())
                    .collect()
            })
            .unwrap_or_default();
        Ok(titles)
    }
}

impl Default for WikiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Encyclopedia for WikiClient {
    fn lookup(&self, term: &str) -> String {
        let term = term.trim();
        if term.is_empty() {
            return "Please specify whom you'd like to know about.".to_string();
        }
        match self.fetch_summary(term) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("wikipedia lookup for '{}' failed: {}", term, e);
                format!("An error occurred while fetching information: {}", e)
            }
        }
    }
}

fn first_sentences(text: &str, count: usize) -> String {
    let mut taken = 0;
    let mut end = text.len();
    for (idx, _) in text.match_indices(". ") {
        taken += 1;
        if taken == count {
            end = idx + 1;
            break;
        }
    }
    text[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::first_sentences;

    #[test]
    fn truncates_to_requested_sentence_count() {
        let text = "First. Second. Third.";
        assert_eq!(first_sentences(text, 2), "First. Second.");
    }

    #[test]
    fn short_text_is_kept_whole() {
        assert_eq!(first_sentences("Only one sentence.", 2), "Only one sentence.");
    }
}
