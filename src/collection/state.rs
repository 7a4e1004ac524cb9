use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use super::{OpKind, Outcome, Slot, SyncEvent};
use crate::domain::{Movie, MovieKey, Paginated};
use crate::framework::{Reduced, Reducer};

/// Lifecycle status shared by all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed,
}

/// How completions for the same slot are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Only the most recently issued read of a slot may write it.
    #[default]
    Strict,
    /// Whatever arrives last wins.
    LastArrival,
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(OrderingPolicy::Strict),
            "last-arrival" | "last_arrival" => Ok(OrderingPolicy::LastArrival),
            other => Err(format!("unknown ordering policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotCounters {
    listing: u64,
    search: u64,
    current: u64,
}

impl SlotCounters {
    fn get(&self, slot: Slot) -> u64 {
        match slot {
            Slot::Listing => self.listing,
            Slot::SearchResults => self.search,
            Slot::Current => self.current,
        }
    }

    fn bump(&mut self, slot: Slot) -> u64 {
        let counter = match slot {
            Slot::Listing => &mut self.listing,
            Slot::SearchResults => &mut self.search,
            Slot::Current => &mut self.current,
        };
        *counter += 1;
        *counter
    }
}

/// Page position reported by the server for one listing-like slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Pagination {
    fn from_page<T>(page: &Paginated<T>) -> Self {
        Self {
            page: page.page.max(1),
            total_pages: page.pages.max(1),
            total_items: page.total,
        }
    }
}

/// Client-side view of the remote movie collection.
///
/// # Invariants
/// - `Pending` means a request is outstanding and `error_message` is `None`.
/// - `Failed` means `error_message` is set; `items` and `current` keep their
///   last good value.
/// - `page >= 1`, `total_pages >= 1`.
/// - `page`, `total_pages` and `total_items` describe whichever of the
///   listing or the search results [`visible_items`](Self::visible_items)
///   returns. Each slot keeps its own [`Pagination`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub items: Vec<Movie>,
    pub search_results: Vec<Movie>,
    pub current: Option<Movie>,
    pub status: Status,
    pub error_message: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub query: String,
    listing_pages: Pagination,
    search_pages: Pagination,
    ordering: OrderingPolicy,
    issued: SlotCounters,
    outstanding: usize,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::new(OrderingPolicy::default())
    }
}

impl CollectionState {
    pub fn new(ordering: OrderingPolicy) -> Self {
        Self {
            items: Vec::new(),
            search_results: Vec::new(),
            current: None,
            status: Status::Idle,
            error_message: None,
            page: 1,
            total_pages: 1,
            total_items: 0,
            query: String::new(),
            listing_pages: Pagination::default(),
            search_pages: Pagination::default(),
            ordering,
            issued: SlotCounters::default(),
            outstanding: 0,
        }
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Pending
    }

    /// Requests started but not yet settled, across all slots.
    pub fn in_flight(&self) -> usize {
        self.outstanding
    }

    /// Sequence number of the latest read issued for `op`'s slot; 0 for mutations.
    pub fn issued(&self, op: OpKind) -> u64 {
        op.slot().map_or(0, |slot| self.issued.get(slot))
    }

    /// Search results while a query is active, the default listing otherwise.
    pub fn visible_items(&self) -> &[Movie] {
        if self.query.is_empty() {
            &self.items
        } else {
            &self.search_results
        }
    }

    pub fn listing_pagination(&self) -> Pagination {
        self.listing_pages
    }

    pub fn search_pagination(&self) -> Pagination {
        self.search_pages
    }

    /// Pagination of the visible slot.
    pub fn visible_pagination(&self) -> Pagination {
        if self.query.is_empty() {
            self.listing_pages
        } else {
            self.search_pages
        }
    }

    fn is_stale(&self, op: OpKind, seq: u64) -> bool {
        if self.ordering == OrderingPolicy::LastArrival {
            return false;
        }
        match op.slot() {
            Some(slot) => seq < self.issued.get(slot),
            None => false,
        }
    }

    fn settle(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Listed { page, page_size } => {
                self.listing_pages = Pagination::from_page(&page);
                self.items = truncate(page.data, page_size);
            }
            Outcome::Searched {
                query,
                page,
                page_size,
            } => {
                self.search_pages = Pagination::from_page(&page);
                self.search_results = truncate(page.data, page_size);
                self.query = query;
            }
            Outcome::Fetched(movie) => {
                self.current = Some(movie);
            }
            Outcome::Created(movie) => {
                self.items.retain(|m| m.id != movie.id);
                self.items.insert(0, movie);
            }
            Outcome::Updated { key, movie } => {
                replace_entity(&mut self.items, &key, &movie);
                replace_entity(&mut self.search_results, &key, &movie);
                if self
                    .current
                    .as_ref()
                    .is_some_and(|c| c.matches(&key) || c.same_entity(&movie))
                {
                    self.current = Some(movie);
                }
            }
            Outcome::Deleted(key) => {
                self.items.retain(|m| !m.matches(&key));
                self.search_results.retain(|m| !m.matches(&key));
                if self.current.as_ref().is_some_and(|c| c.matches(&key)) {
                    self.current = None;
                }
            }
        }
    }

    fn sync_visible_pagination(&mut self) {
        let visible = self.visible_pagination();
        self.page = visible.page;
        self.total_pages = visible.total_pages;
        self.total_items = visible.total_items;
    }
}

fn truncate(mut data: Vec<Movie>, page_size: u32) -> Vec<Movie> {
    let limit = page_size as usize;
    if data.len() > limit {
        warn!(returned = data.len(), page_size, "Server returned more rows than requested");
        data.truncate(limit);
    }
    data
}

/// Replaces the first record `key` (or `movie`'s own id) addresses, in place,
/// and drops any further duplicates.
fn replace_entity(list: &mut Vec<Movie>, key: &MovieKey, movie: &Movie) {
    let mut replaced = false;
    list.retain_mut(|m| {
        if !(m.matches(key) || m.id == movie.id) {
            return true;
        }
        if replaced {
            return false;
        }
        *m = movie.clone();
        replaced = true;
        true
    });
}

impl Reducer for CollectionState {
    type Event = SyncEvent;

    fn reduce(&self, event: SyncEvent) -> Reduced<Self> {
        let mut next = self.clone();
        match event {
            SyncEvent::Started { op } => {
                if let Some(slot) = op.slot() {
                    next.issued.bump(slot);
                }
                next.outstanding += 1;
                next.status = Status::Pending;
                next.error_message = None;
            }
            SyncEvent::Fulfilled { seq, outcome } => {
                next.settle();
                if next.is_stale(outcome.kind(), seq) {
                    warn!(op = %outcome.kind(), seq, "Discarding stale response");
                    return Reduced::discarded(next);
                }
                next.apply_outcome(outcome);
                next.status = Status::Ready;
            }
            SyncEvent::Rejected { op, seq, message } => {
                next.settle();
                if next.is_stale(op, seq) {
                    warn!(%op, seq, "Discarding stale failure");
                    return Reduced::discarded(next);
                }
                next.status = Status::Failed;
                next.error_message = Some(if message.trim().is_empty() {
                    format!("{op} request failed")
                } else {
                    message
                });
            }
            SyncEvent::Abandoned { op, seq } => {
                next.settle();
                debug!(%op, seq, "Request abandoned");
                if next.outstanding == 0 && next.status == Status::Pending {
                    next.status = Status::Idle;
                }
            }
            SyncEvent::ErrorCleared => {
                next.error_message = None;
                if next.status == Status::Failed {
                    next.status = Status::Ready;
                }
            }
            SyncEvent::SearchQuerySet(query) => {
                if query.is_empty() {
                    next.search_results.clear();
                    next.search_pages = Pagination::default();
                }
                next.query = query;
            }
            SyncEvent::CurrentCleared => {
                next.current = None;
            }
        }
        next.sync_visible_pagination();
        Reduced::accepted(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies(range: std::ops::RangeInclusive<u32>) -> Vec<Movie> {
        range.map(|i| Movie::new(format!("m{i}"), format!("Movie {i}"))).collect()
    }

    fn apply(state: CollectionState, events: Vec<SyncEvent>) -> CollectionState {
        events.into_iter().fold(state, |s, e| s.reduce(e).state)
    }

    fn started(state: &CollectionState, op: OpKind) -> (CollectionState, u64) {
        let next = state.reduce(SyncEvent::Started { op }).state;
        let seq = next.issued(op);
        (next, seq)
    }

    fn listed(seq: u64, data: Vec<Movie>, page: u32, pages: u32, total: u64) -> SyncEvent {
        SyncEvent::Fulfilled {
            seq,
            outcome: Outcome::Listed {
                page: Paginated::new(data, page, pages, total),
                page_size: 10,
            },
        }
    }

    fn loaded() -> CollectionState {
        let (s, seq) = started(&CollectionState::default(), OpKind::List);
        s.reduce(listed(seq, movies(1..=3), 1, 1, 3)).state
    }

    #[test]
    fn test_started_clears_error_and_goes_pending() {
        let failed = CollectionState::default()
            .reduce(SyncEvent::Rejected {
                op: OpKind::Get,
                seq: 0,
                message: "boom".into(),
            })
            .state;
        assert_eq!(failed.status, Status::Failed);

        let (pending, _) = started(&failed, OpKind::List);
        assert_eq!(pending.status, Status::Pending);
        assert_eq!(pending.error_message, None);
        assert_eq!(pending.in_flight(), 1);
    }

    #[test]
    fn test_list_populates_items_and_pagination() {
        let (s, seq) = started(&CollectionState::default(), OpKind::List);
        let s = s.reduce(listed(seq, movies(1..=10), 1, 3, 25)).state;
        assert_eq!(s.items.len(), 10);
        assert_eq!(s.items[0].id, "m1");
        assert_eq!((s.page, s.total_pages, s.total_items), (1, 3, 25));
        assert_eq!(s.status, Status::Ready);
        assert_eq!(s.in_flight(), 0);
    }

    #[test]
    fn test_oversized_page_is_truncated() {
        let (s, seq) = started(&CollectionState::default(), OpKind::List);
        let s = s.reduce(listed(seq, movies(1..=12), 2, 0, 12)).state;
        assert_eq!(s.items.len(), 10);
        assert_eq!(s.page, 2);
        assert_eq!(s.total_pages, 1);
    }

    #[test]
    fn test_failed_list_keeps_items() {
        let before = loaded();
        let (s, seq) = started(&before, OpKind::List);
        let s = s
            .reduce(SyncEvent::Rejected {
                op: OpKind::List,
                seq,
                message: "Failed to fetch movies".into(),
            })
            .state;
        assert_eq!(s.items, before.items);
        assert_eq!(s.status, Status::Failed);
        assert_eq!(s.error_message.as_deref(), Some("Failed to fetch movies"));
    }

    #[test]
    fn test_blank_failure_message_gets_a_default() {
        let s = CollectionState::default()
            .reduce(SyncEvent::Rejected {
                op: OpKind::Delete,
                seq: 0,
                message: " ".into(),
            })
            .state;
        assert_eq!(s.error_message.as_deref(), Some("delete request failed"));
    }

    #[test]
    fn test_search_uses_its_own_slot() {
        let base = loaded();
        let (s, seq) = started(&base, OpKind::Search);
        let s = s
            .reduce(SyncEvent::Fulfilled {
                seq,
                outcome: Outcome::Searched {
                    query: "heat".into(),
                    page: Paginated::new(movies(7..=8), 1, 1, 2),
                    page_size: 10,
                },
            })
            .state;
        assert_eq!(s.items, base.items);
        assert_eq!(s.search_results.len(), 2);
        assert_eq!(s.visible_items()[0].id, "m7");

        let cleared = s.reduce(SyncEvent::SearchQuerySet(String::new())).state;
        assert!(cleared.search_results.is_empty());
        assert_eq!(cleared.visible_items(), base.items.as_slice());
    }

    #[test]
    fn test_create_prepends_exactly_once() {
        let mut created = Movie::new("m99", "Inception");
        created.year_of_release = Some(2010);
        let s = apply(
            loaded(),
            vec![
                SyncEvent::Started { op: OpKind::Create },
                SyncEvent::Fulfilled {
                    seq: 0,
                    outcome: Outcome::Created(created.clone()),
                },
            ],
        );
        assert_eq!(s.items[0], created);
        assert_eq!(s.items.iter().filter(|m| m.id == "m99").count(), 1);
        assert_eq!(s.items.len(), 4);
    }

    #[test]
    fn test_update_replaces_in_place_and_current() {
        let base = loaded().reduce(SyncEvent::Fulfilled {
            seq: 0,
            outcome: Outcome::Fetched(Movie::new("m2", "Movie 2")),
        });
        assert!(base.accepted);

        let server = Movie::new("m2", "Server Title");
        let s = base
            .state
            .reduce(SyncEvent::Fulfilled {
                seq: 0,
                outcome: Outcome::Updated {
                    key: MovieKey::Local("m2".into()),
                    movie: server.clone(),
                },
            })
            .state;
        let ids: Vec<_> = s.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(s.items[1].name, "Server Title");
        assert_eq!(s.current, Some(server));
    }

    #[test]
    fn test_update_leaves_unrelated_current() {
        let s = loaded()
            .reduce(SyncEvent::Fulfilled {
                seq: 0,
                outcome: Outcome::Fetched(Movie::new("m3", "Movie 3")),
            })
            .state
            .reduce(SyncEvent::Fulfilled {
                seq: 0,
                outcome: Outcome::Updated {
                    key: MovieKey::Local("m1".into()),
                    movie: Movie::new("m1", "Renamed"),
                },
            })
            .state;
        assert_eq!(s.current.unwrap().id, "m3");
    }

    #[test]
    fn test_update_matches_external_key() {
        let mut base = loaded();
        base.items[0] = Movie::new("m1", "Imported").from_external("tt1");
        let server = Movie::new("m1", "Imported v2").from_external("tt1");
        let s = base
            .reduce(SyncEvent::Fulfilled {
                seq: 0,
                outcome: Outcome::Updated {
                    key: MovieKey::External("tt1".into()),
                    movie: server.clone(),
                },
            })
            .state;
        assert_eq!(s.items[0], server);
        assert_eq!(s.items.len(), 3);
    }

    #[test]
    fn test_delete_removes_and_clears_current() {
        let s = apply(
            loaded(),
            vec![
                SyncEvent::Fulfilled {
                    seq: 0,
                    outcome: Outcome::Fetched(Movie::new("m2", "Movie 2")),
                },
                SyncEvent::Fulfilled {
                    seq: 0,
                    outcome: Outcome::Deleted(MovieKey::Local("m2".into())),
                },
            ],
        );
        assert!(s.items.iter().all(|m| m.id != "m2"));
        assert!(s.current.is_none());
    }

    #[test]
    fn test_strict_ordering_discards_older_read() {
        let (s, first) = started(&CollectionState::default(), OpKind::List);
        let (s, second) = started(&s, OpKind::List);
        let s = s.reduce(listed(second, movies(11..=12), 2, 2, 12)).state;

        let late = s.reduce(listed(first, movies(1..=10), 1, 2, 12));
        assert!(!late.accepted);
        assert_eq!(late.state.items[0].id, "m11");
        assert_eq!(late.state.page, 2);
        assert_eq!(late.state.in_flight(), 0);
    }

    #[test]
    fn test_stale_failure_does_not_mark_failed() {
        let (s, first) = started(&CollectionState::default(), OpKind::Get);
        let (s, _second) = started(&s, OpKind::Get);
        let late = s.reduce(SyncEvent::Rejected {
            op: OpKind::Get,
            seq: first,
            message: "timeout".into(),
        });
        assert!(!late.accepted);
        assert_eq!(late.state.status, Status::Pending);
        assert_eq!(late.state.error_message, None);
    }

    #[test]
    fn test_last_arrival_applies_everything() {
        let state = CollectionState::new(OrderingPolicy::LastArrival);
        let (s, first) = started(&state, OpKind::List);
        let (s, second) = started(&s, OpKind::List);
        let s = s.reduce(listed(second, movies(11..=12), 2, 2, 12)).state;
        let late = s.reduce(listed(first, movies(1..=10), 1, 2, 12));
        assert!(late.accepted);
        assert_eq!(late.state.items[0].id, "m1");
    }

    #[test]
    fn test_slots_sequence_independently() {
        let (s, list_seq) = started(&CollectionState::default(), OpKind::List);
        let (s, _) = started(&s, OpKind::Search);
        let s = s.reduce(listed(list_seq, movies(1..=2), 1, 1, 2));
        assert!(s.accepted);
    }

    #[test]
    fn test_abandoned_request_stops_loading() {
        let base = loaded();
        let (s, seq) = started(&base, OpKind::List);
        assert!(s.is_loading());

        let s = s.reduce(SyncEvent::Abandoned { op: OpKind::List, seq }).state;
        assert_eq!(s.in_flight(), 0);
        assert!(!s.is_loading());
        assert_eq!(s.items, base.items);
        assert!(s.error_message.is_none());
    }

    #[test]
    fn test_abandoned_request_keeps_others_pending() {
        let (s, list_seq) = started(&CollectionState::default(), OpKind::List);
        let (s, _) = started(&s, OpKind::Get);
        let s = s
            .reduce(SyncEvent::Abandoned {
                op: OpKind::List,
                seq: list_seq,
            })
            .state;
        assert_eq!(s.in_flight(), 1);
        assert_eq!(s.status, Status::Pending);
    }

    #[test]
    fn test_pagination_follows_visible_slot() {
        let (s, list_seq) = started(&CollectionState::default(), OpKind::List);
        let (s, search_seq) = started(&s, OpKind::Search);
        let s = s
            .reduce(SyncEvent::Fulfilled {
                seq: search_seq,
                outcome: Outcome::Searched {
                    query: "heat".into(),
                    page: Paginated::new(movies(7..=8), 2, 2, 4),
                    page_size: 10,
                },
            })
            .state
            .reduce(listed(list_seq, movies(1..=10), 1, 5, 50))
            .state;

        assert_eq!(s.visible_items()[0].id, "m7");
        assert_eq!((s.page, s.total_pages, s.total_items), (2, 2, 4));
        assert_eq!(s.listing_pagination().total_items, 50);

        let s = s.reduce(SyncEvent::SearchQuerySet(String::new())).state;
        assert_eq!(s.visible_items()[0].id, "m1");
        assert_eq!((s.page, s.total_pages, s.total_items), (1, 5, 50));
        assert_eq!(s.search_pagination(), Pagination::default());
    }

    #[test]
    fn test_clear_error_and_current() {
        let s = apply(
            loaded(),
            vec![
                SyncEvent::Fulfilled {
                    seq: 0,
                    outcome: Outcome::Fetched(Movie::new("m1", "Movie 1")),
                },
                SyncEvent::Rejected {
                    op: OpKind::Update,
                    seq: 0,
                    message: "Name is required".into(),
                },
                SyncEvent::ErrorCleared,
                SyncEvent::CurrentCleared,
            ],
        );
        assert_eq!(s.status, Status::Ready);
        assert!(s.error_message.is_none());
        assert!(s.current.is_none());
    }

    #[test]
    fn test_ordering_policy_parses() {
        assert_eq!("strict".parse::<OrderingPolicy>(), Ok(OrderingPolicy::Strict));
        assert_eq!(
            "Last-Arrival".parse::<OrderingPolicy>(),
            Ok(OrderingPolicy::LastArrival)
        );
        assert!("fifo".parse::<OrderingPolicy>().is_err());
    }
}
