use serde::Serialize;

/// One story row scraped from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub title: String,
    pub url: String,
    pub points: u32,
    pub sent_by: Option<String>,
    pub published: Option<String>,
    pub comments: u32,
}

impl Story {
    /// Compact form handed to the completion model, one per prompt turn.
    pub fn to_prompt_entry(&self, index: usize) -> String {
        serde_json::json!({
            "index": index,
            "title": self.title,
            "url": self.url,
            "points": self.points,
            "comments": self.comments,
        })
        .to_string()
    }
}
