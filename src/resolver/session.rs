use crate::domain::Person;

use super::ResolverError;

/// Identifies one issued lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub query: String,
}

/// What an input change asks the control to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Non-blank query: (re)start the debounce timer.
    Changed,
    /// Blank query: cancel the timer, results already emptied.
    Cleared,
}

/// Ephemeral state of one resolver control.
///
/// Every issued lookup takes the next sequence number. A completion is applied
/// only if it carries the latest number and the query it was issued for is
/// still the current one. Clearing, selecting and resetting also advance the
/// sequence, so anything still in flight is discarded when it lands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    query: String,
    results: Vec<Person>,
    open: bool,
    loading: bool,
    seq: u64,
    selected_name: String,
}

impl SearchSession {
    pub fn new(selected_name: impl Into<String>) -> Self {
        Self {
            selected_name: selected_name.into(),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Person] {
        &self.results
    }

    /// Results the panel shows: none while it is closed.
    pub fn visible_results(&self) -> &[Person] {
        if self.open {
            &self.results
        } else {
            &[]
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn selected_name(&self) -> &str {
        &self.selected_name
    }

    pub fn focus(&mut self) {
        self.open = true;
    }

    pub fn input(&mut self, text: impl Into<String>) -> QueryChange {
        self.query = text.into();
        self.open = true;
        if self.query.trim().is_empty() {
            self.invalidate();
            self.results.clear();
            QueryChange::Cleared
        } else {
            QueryChange::Changed
        }
    }

    /// Issues a lookup for the current query; `None` if the query is blank.
    pub fn begin_lookup(&mut self) -> Option<LookupTicket> {
        if self.query.trim().is_empty() {
            return None;
        }
        self.seq += 1;
        self.loading = true;
        Some(LookupTicket {
            seq: self.seq,
            query: self.query.clone(),
        })
    }

    /// Applies lookup results if the ticket is still current. Returns whether
    /// they were applied.
    pub fn complete(&mut self, ticket: &LookupTicket, results: Vec<Person>) -> bool {
        if ticket.seq != self.seq {
            return false;
        }
        self.loading = false;
        if ticket.query != self.query {
            return false;
        }
        self.results = results;
        true
    }

    /// Closes the panel; query and selection stay as they are.
    pub fn click_outside(&mut self) {
        self.open = false;
    }

    /// Picks `id` from the current results and resets the session.
    pub fn select(&mut self, id: &str) -> Result<Person, ResolverError> {
        let person = self
            .results
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ResolverError::NotInResults(id.to_string()))?;
        self.reset();
        self.open = false;
        self.selected_name = person.name.clone();
        Ok(person)
    }

    /// Back to an empty query with no results; in-flight lookups go stale.
    pub fn reset(&mut self) {
        self.invalidate();
        self.query.clear();
        self.results.clear();
    }

    fn invalidate(&mut self) {
        self.seq += 1;
        self.loading = false;
    }
}
