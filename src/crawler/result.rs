//! Per-URL crawl records

/// One unit of work handed to a worker: a URL and its position in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Position of the URL in the input sequence
    pub index: usize,

    /// The URL to fetch
    pub url: String,
}

/// Fields pulled out of a page's markup by the extraction engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub description: String,
    pub price: String,
    pub date: String,
    pub keywords: String,
    pub author: String,
    pub logo: String,

    /// Absolute link URLs, sorted and deduplicated
    pub links: Vec<String>,

    /// Absolute image URLs, sorted and deduplicated
    pub images: Vec<String>,

    /// Heading texts in document order
    pub headings: Vec<String>,
}

impl PageFields {
    /// Basic-mode success: a title or a description was found
    pub fn basic_success(&self) -> bool {
        !self.title.is_empty() || !self.description.is_empty()
    }

    /// Extended-mode success: the basic criterion, or any extended field was found
    pub fn extended_success(&self) -> bool {
        self.basic_success()
            || !self.keywords.is_empty()
            || !self.author.is_empty()
            || !self.links.is_empty()
            || !self.images.is_empty()
            || !self.headings.is_empty()
            || !self.logo.is_empty()
    }
}

/// Outcome of crawling one input URL
///
/// Exactly one result exists per input URL, at the same position as the URL.
/// `success` and `error` record fetch or extraction failures; a failed
/// extraction still carries whatever fields were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    pub url: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub date: String,
    pub keywords: String,
    pub author: String,
    pub logo: String,
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub headings: Vec<String>,
    pub success: bool,
    pub error: String,
}

impl CrawlResult {
    /// Creates an empty, not-yet-successful result for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Creates a failed result carrying only the URL and an error message
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
            ..Self::default()
        }
    }

    /// Attaches extracted fields to this result
    pub fn with_fields(mut self, fields: PageFields) -> Self {
        self.title = fields.title;
        self.description = fields.description;
        self.price = fields.price;
        self.date = fields.date;
        self.keywords = fields.keywords;
        self.author = fields.author;
        self.logo = fields.logo;
        self.links = fields.links;
        self.images = fields.images;
        self.headings = fields.headings;
        self
    }
}
