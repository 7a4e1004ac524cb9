use serde::{Deserialize, Serialize};

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u32, pages: u32, total: u64) -> Self {
        Self { data, page, pages, total }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 1, 1, 0)
    }
}
