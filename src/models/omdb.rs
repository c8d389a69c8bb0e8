// ============================================================================
// OMDb API Types
// ============================================================================

use serde::Deserialize;
use std::collections::BTreeMap;

use super::Enrichment;

/// Raw response from OMDb `?t=<title>&y=<year>`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbResponse {
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ratings: Vec<OmdbRating>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub metascore: Option<String>,
    #[serde(default)]
    pub box_office: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbRating {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub value: String,
}

/// OMDb reports missing values as "N/A"
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

impl OmdbResponse {
    /// Converts a successful lookup; `None` when OMDb did not find the title
    pub fn into_enrichment(self) -> Option<Enrichment> {
        if self.response != "True" {
            return None;
        }

        let ratings: BTreeMap<String, String> = self
            .ratings
            .into_iter()
            .filter(|r| !r.source.is_empty() && !r.value.is_empty())
            .map(|r| (r.source, r.value))
            .collect();

        Some(Enrichment {
            ratings,
            plot: present(self.plot),
            runtime: present(self.runtime),
            director: present(self.director),
            actors: present(self.actors),
            metascore: present(self.metascore),
            box_office: present(self.box_office),
        })
    }
}
