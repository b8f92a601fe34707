//! Normalization of movie listing requests.
//!
//! Everything the storage query needs is decided here, so the repository only
//! translates a [`ListParams`] into SQL and never sees raw user input.

use crate::contract::model::ListMovies;

pub const MIN_LIMIT: u64 = 1;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    ReleaseDate,
    CreatedAt,
}

impl SortField {
    /// Allow-listed sort keys; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "release" | "release_date" => Some(Self::ReleaseDate),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            dir: SortDir::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u64,
    pub page: u64,
    pub sort: Sort,
    /// Lower-cased, trimmed, `None` when blank.
    pub search: Option<String>,
    /// De-duplicated, in request order.
    pub genre_ids: Vec<i64>,
}

impl ListParams {
    pub fn normalize(req: ListMovies) -> Self {
        let sort = match req.order_by.as_deref().and_then(SortField::parse) {
            Some(field) => Sort {
                field,
                dir: SortDir::parse(req.order_dir.as_deref()),
            },
            None => Sort::default(),
        };

        let search = req
            .filters
            .search
            .map(|s| fold_title(s.trim()))
            .filter(|s| !s.is_empty());

        Self {
            limit: req.limit.clamp(MIN_LIMIT, MAX_LIMIT),
            page: req.page.max(1),
            sort,
            search,
            genre_ids: dedup_ids(req.filters.genre_ids),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Case folding shared by stored titles and search terms. Done here rather
/// than with SQL `LOWER()`, which only folds ASCII on SQLite.
pub fn fold_title(s: &str) -> String {
    s.to_lowercase()
}

/// Remove repeated ids, keeping first occurrences in order.
pub fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// `%term%` with LIKE wildcards in `term` escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
