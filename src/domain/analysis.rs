//! Structured answers requested from the language model.
//!
//! Every field defaults when the model leaves it out, so a partially filled
//! answer still renders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsAnalysis {
    pub catchy_title: Option<String>,
    pub summary: String,
    pub keywords: Vec<String>,
    pub eli5: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperAnalysis {
    pub summary: String,
    pub highlights: Vec<String>,
    pub keywords: Vec<String>,
    pub eli5: String,
    pub big_so_what: String,
    pub analogy: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptAnalysis {
    pub guest_name: Option<String>,
    pub summary: Option<String>,
    pub key_topics: Vec<String>,
    pub notable_questions: Vec<String>,
    pub memorable_quote: String,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RssPodcastAnalysis {
    pub catchy_title: Option<String>,
    pub summary: Option<String>,
    pub key_takeaways: Vec<String>,
    pub guest_info: Option<String>,
    pub hashtags: Vec<String>,
}
