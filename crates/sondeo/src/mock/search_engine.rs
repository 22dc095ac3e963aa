//! Fake search engine site for the mock session.
//!
//! Serves the markup the page objects expect:
//!
//! | address                         | document                                   |
//! |---------------------------------|--------------------------------------------|
//! | `/`                             | home: input, two triggers (first hidden), lucky, logo, tab links |
//! | `/search?q=..&start=..&tbm=..`  | results: stats, ten containers, tabs, pagination, logo |
//! | `/imghp`, `/news`, `/lucky`     | plain landing pages                        |
//!
//! Result blocks render a couple of lookups late, like a page that fills in
//! after load.

use super::{MockAction, MockDocument, MockNode, MockSite};
use crate::config::{SearchLabels, SondeoConfig};
use crate::locator::Locator;
use crate::pages::{ResultsPage, SearchPage};
use url::{form_urlencoded, Url};

const SUGGESTION_SUFFIXES: [&str; 4] = ["", " tutorial", " download", " python"];

/// Scripted search engine rendering according to [`SearchLabels`]
#[derive(Debug, Clone)]
pub struct FakeSearchEngine {
    origin: String,
    labels: SearchLabels,
    pages: usize,
    results_per_page: usize,
    render_delay: u32,
}

impl FakeSearchEngine {
    /// Site rooted at `base_url`
    #[must_use]
    pub fn new(base_url: &str, labels: SearchLabels) -> Self {
        Self {
            origin: base_url.trim_end_matches('/').to_string(),
            labels,
            pages: 3,
            results_per_page: 10,
            render_delay: 2,
        }
    }

    /// Site rooted at the configured base URL, using its labels
    #[must_use]
    pub fn from_config(config: &SondeoConfig) -> Self {
        Self::new(&config.base_url, config.labels.clone())
    }

    /// Number of result pages per query
    #[must_use]
    pub const fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Lookups result blocks wait before rendering
    #[must_use]
    pub const fn with_render_delay(mut self, lookups: u32) -> Self {
        self.render_delay = lookups;
        self
    }

    /// Home page address
    #[must_use]
    pub fn home_url(&self) -> String {
        format!("{}/", self.origin)
    }

    /// Results address for a query, offset and optional tab
    #[must_use]
    pub fn search_url(&self, query: &str, start: usize, tab: Option<&str>) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("q", query);
        if start > 0 {
            params.append_pair("start", &start.to_string());
        }
        if let Some(tab) = tab {
            params.append_pair("tbm", tab);
        }
        format!("{}/search?{}", self.origin, params.finish())
    }

    fn submit_query(&self) -> MockAction {
        MockAction::SubmitQuery {
            field: SearchPage::SEARCH_INPUT,
            action: format!("{}/search", self.origin),
        }
    }

    fn is_home(&self, document: &MockDocument) -> bool {
        document.title() == self.labels.brand
    }

    fn home(&self) -> MockDocument {
        let labels = &self.labels;
        MockDocument::new(labels.brand.as_str())
            .with_node(
                MockNode::new(&SearchPage::SEARCH_INPUT)
                    .with_value("")
                    .on_submit(self.submit_query()),
            )
            // copy inside the closed suggestion dropdown
            .with_node(
                MockNode::new(&SearchPage::SEARCH_BUTTON)
                    .hidden()
                    .on_click(self.submit_query()),
            )
            .with_node(MockNode::new(&SearchPage::SEARCH_BUTTON).on_click(self.submit_query()))
            .with_node(
                MockNode::new(&SearchPage::LUCKY_BUTTON)
                    .on_click(MockAction::Navigate(format!("{}/lucky", self.origin))),
            )
            .with_node(
                MockNode::new(&SearchPage::logo_locator(labels))
                    .on_click(MockAction::Navigate(self.home_url())),
            )
            .with_node(
                MockNode::new(&Locator::link_text(labels.images.as_str()))
                    .with_text(labels.images.as_str())
                    .on_click(MockAction::Navigate(format!("{}/imghp", self.origin))),
            )
            .with_node(
                MockNode::new(&Locator::link_text(labels.news.as_str()))
                    .with_text(labels.news.as_str())
                    .on_click(MockAction::Navigate(format!("{}/news", self.origin))),
            )
    }

    fn landing(&self, name: &str) -> MockDocument {
        MockDocument::new(format!("{} {name}", self.labels.brand)).with_node(
            MockNode::new(&SearchPage::SEARCH_INPUT)
                .with_value("")
                .on_submit(self.submit_query()),
        )
    }

    fn tab(&self, query: &str, label: &str, tab: &str, selected: bool) -> MockNode {
        let node = MockNode::new(&Locator::link_text(label))
            .with_text(label)
            .with_attribute("aria-label", label)
            .with_attribute("aria-selected", selected.to_string())
            .on_click(MockAction::Navigate(self.search_url(query, 0, Some(tab))));
        if selected {
            node.also(&ResultsPage::tab_active_locator(label))
        } else {
            node
        }
    }

    fn results(&self, query: &str, start: usize, tab: Option<&str>) -> MockDocument {
        let labels = &self.labels;
        let images = tab == Some("isch");
        let news = tab == Some("nws");
        let page = start / self.results_per_page;

        let mut document = MockDocument::new(format!("{query} - {} Search", labels.brand))
            .with_node(
                MockNode::new(&ResultsPage::SEARCH_INPUT)
                    .with_value(query)
                    .on_submit(self.submit_query()),
            )
            .with_node(
                MockNode::new(&ResultsPage::LOGO)
                    .on_click(MockAction::Navigate(self.home_url())),
            )
            .with_node(self.tab(query, &labels.images, "isch", images))
            .with_node(self.tab(query, &labels.news, "nws", news));

        if images {
            for n in 0..20 {
                document.push(
                    MockNode::new(&ResultsPage::IMAGE_THUMBNAILS)
                        .with_attribute("alt", format!("{query} {n}"))
                        .appears_after(self.render_delay + 1),
                );
            }
            return document;
        }

        document.push(
            MockNode::new(&ResultsPage::RESULT_STATS)
                .with_text(format!(
                    "{}s: about 4,520,000 (page {})",
                    labels.stats_keyword,
                    page + 1
                ))
                .appears_after(self.render_delay),
        );

        let kind = if news { "news" } else { "result" };
        for i in 0..self.results_per_page {
            let n = start + i + 1;
            let item = MockNode::new(&ResultsPage::RESULT_ITEMS)
                .with_text(format!("{query}: {kind} {n}"))
                .appears_after(self.render_delay);
            document.push(item);
            if i == 0 {
                document.push(
                    MockNode::new(&ResultsPage::FIRST_RESULT_TITLE)
                        .with_text(format!("{query}: {kind} {n}"))
                        .appears_after(self.render_delay),
                );
            }
        }

        if page + 1 < self.pages {
            document.push(MockNode::new(&ResultsPage::NEXT_PAGE).on_click(MockAction::Navigate(
                self.search_url(query, start + self.results_per_page, tab),
            )));
        }
        document
    }
}

impl MockSite for FakeSearchEngine {
    fn render(&self, url: &str) -> MockDocument {
        if !url.starts_with(&self.origin) {
            return MockDocument::default();
        }
        let Ok(parsed) = Url::parse(url) else {
            return MockDocument::default();
        };
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        match parsed.path() {
            "/" | "" => self.home(),
            "/search" => match param("q").filter(|q| !q.trim().is_empty()) {
                Some(query) => {
                    let start = param("start")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                    self.results(&query, start, param("tbm").as_deref())
                }
                None => self.home(),
            },
            "/imghp" => self.landing(&self.labels.images),
            "/news" => self.landing(&self.labels.news),
            "/lucky" => self.landing("Doodles"),
            _ => MockDocument::new("404"),
        }
    }

    fn on_input(&self, document: &mut MockDocument, field: usize) {
        if !self.is_home(document) {
            return;
        }
        let Some(typed) = document
            .nodes()
            .get(field)
            .filter(|node| node.answers(&SearchPage::SEARCH_INPUT))
            .and_then(|node| node.value())
            .map(str::to_lowercase)
        else {
            return;
        };

        document.remove_all(&SearchPage::SUGGESTIONS);
        if typed.trim().is_empty() {
            return;
        }
        for suffix in SUGGESTION_SUFFIXES {
            document.push(
                MockNode::new(&SearchPage::SUGGESTIONS)
                    .with_text(format!("{typed}{suffix}"))
                    .appears_after(1),
            );
        }
    }
}
