use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized news article as produced by ingestion.
///
/// Articles are built once per run from source payloads and never mutated
/// afterwards; later stages wrap them in [`EnrichedArticle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published: DateTime<Utc>,
    /// Plain text, at most 300 characters plus an ellipsis.
    pub description: String,
    /// Plain text, at most 1000 characters. Empty when the source had none.
    pub content: String,
}

/// Digest sections. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AcquisitionsMa,
    BreakawayAdvisors,
    FundingInvestment,
    AiWealthtech,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::AcquisitionsMa,
        Category::BreakawayAdvisors,
        Category::FundingInvestment,
        Category::AiWealthtech,
    ];

    /// Parse a wire key such as `acquisitions_ma`. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "acquisitions_ma" => Some(Category::AcquisitionsMa),
            "breakaway_advisors" => Some(Category::BreakawayAdvisors),
            "funding_investment" => Some(Category::FundingInvestment),
            "ai_wealthtech" => Some(Category::AiWealthtech),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::AcquisitionsMa => "acquisitions_ma",
            Category::BreakawayAdvisors => "breakaway_advisors",
            Category::FundingInvestment => "funding_investment",
            Category::AiWealthtech => "ai_wealthtech",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::AcquisitionsMa => "Acquisitions & M&A",
            Category::BreakawayAdvisors => "Breakaway Advisors",
            Category::FundingInvestment => "Funding & Investment",
            Category::AiWealthtech => "AI & Wealthtech",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::AcquisitionsMa => "🏦",
            Category::BreakawayAdvisors => "🚀",
            Category::FundingInvestment => "💰",
            Category::AiWealthtech => "🤖",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// An article after the language model has categorized and summarized it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub article: Article,
    pub category: Category,
    pub summary: String,
}

/// Enriched articles grouped by category. Every category is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedDigest {
    sections: BTreeMap<Category, Vec<EnrichedArticle>>,
}

impl CategorizedDigest {
    pub fn new() -> Self {
        Self {
            sections: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    pub fn push(&mut self, item: EnrichedArticle) {
        self.sections.entry(item.category).or_default().push(item);
    }

    pub fn articles(&self, category: Category) -> &[EnrichedArticle] {
        self.sections
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Sections in display order, including empty ones.
    pub fn sections(&self) -> impl Iterator<Item = (Category, &[EnrichedArticle])> {
        self.sections.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for CategorizedDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<EnrichedArticle> for CategorizedDigest {
    fn from_iter<I: IntoIterator<Item = EnrichedArticle>>(iter: I) -> Self {
        let mut digest = Self::new();
        for item in iter {
            digest.push(item);
        }
        digest
    }
}
