use crate::catalog::{PageLayout, Record};

/// Events the view reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Paginate(u32),
    Next,
    Previous,
    InputPage(u32),
    InputText(String),
    CommitInput,
    ToggleSearch,
    SetSearch(String),
    PageLoaded { page: u32, records: Vec<Record> },
}

/// Pages to make resident after a navigation, current page first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub page: u32,
    pub pages: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub current_page: u32,
    pub input_page: u32,
    pub search_term: String,
    pub search_open: bool,
    pub loading: bool,
    pub records: Vec<Record>,
    pub filtered: Vec<Record>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::initial(1)
    }
}

impl ViewState {
    pub fn initial(start_page: u32) -> Self {
        Self {
            current_page: start_page,
            input_page: start_page,
            search_term: String::new(),
            search_open: false,
            loading: false,
            records: Vec::new(),
            filtered: Vec::new(),
        }
    }

    /// Marks the first load of the current page as in flight.
    pub fn start(&mut self, layout: &PageLayout) -> LoadRequest {
        self.loading = true;
        LoadRequest {
            page: self.current_page,
            pages: layout.preload_set(self.current_page),
        }
    }

    pub fn can_go_previous(&self) -> bool {
        !self.loading && self.current_page > 1
    }

    pub fn can_go_next(&self, layout: &PageLayout) -> bool {
        !self.loading && self.current_page < layout.last_page()
    }

    pub fn update(&mut self, action: Action, layout: &PageLayout) -> Option<LoadRequest> {
        match action {
            Action::Paginate(target) => self.paginate(target, layout),
            Action::Next => {
                if !self.can_go_next(layout) {
                    return None;
                }
                self.paginate(self.current_page + 1, layout)
            }
            Action::Previous => {
                if !self.can_go_previous() {
                    return None;
                }
                self.paginate(self.current_page - 1, layout)
            }
            Action::InputPage(value) => {
                if layout.contains(value) {
                    self.input_page = value;
                }
                None
            }
            Action::InputText(text) => {
                if let Ok(value) = crate::utils::parse_page_number(&text) {
                    if layout.contains(value) {
                        self.input_page = value;
                    }
                }
                None
            }
            Action::CommitInput => self.paginate(self.input_page, layout),
            Action::ToggleSearch => {
                self.search_open = !self.search_open;
                None
            }
            Action::SetSearch(term) => {
                if self.search_open {
                    self.search_term = term;
                    self.refilter();
                }
                None
            }
            Action::PageLoaded { records, .. } => {
                self.records = records;
                self.loading = false;
                self.refilter();
                None
            }
        }
    }

    fn paginate(&mut self, target: u32, layout: &PageLayout) -> Option<LoadRequest> {
        if !layout.contains(target) {
            return None;
        }
        // Already showing or fetching this page.
        if target == self.current_page && (self.loading || !self.records.is_empty()) {
            self.input_page = target;
            return None;
        }
        self.current_page = target;
        self.input_page = target;
        self.loading = true;
        Some(LoadRequest {
            page: target,
            pages: layout.preload_set(target),
        })
    }

    fn refilter(&mut self) {
        self.filtered = filter_records(&self.records, &self.search_term);
    }
}

/// Case-insensitive substring match on name. A blank term keeps every record.
pub fn filter_records(records: &[Record], term: &str) -> Vec<Record> {
    if term.trim().is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
