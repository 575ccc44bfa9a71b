/// One entry scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    /// Text of the title element, untrimmed
    pub title: String,
    /// Inner HTML of the description element
    pub description: String,
    /// Absolute URL, or [`UNRESOLVED_LINK`](super::UNRESOLVED_LINK)
    pub link: String,
}

/// Channel metadata plus items in page order, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub link: String,
    pub items: Vec<ExtractedItem>,
}
