use serde::{Deserialize, Serialize};

/// One chart surfaced on the index page: display name plus the absolute URL
/// of its landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartListing {
    pub name: String,
    pub url: String,
}
