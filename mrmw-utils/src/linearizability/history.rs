//! Histories of operations performed on a shared object.
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// An identifier for an entry in a history.
pub type EntryId = usize;

/// An identifier for a process (or thread) that performs operations.
pub type ProcessId = usize;

/// An action performed by a process: either calling an operation or
/// receiving its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<T> {
    Call(T),
    Response(T),
}

/// The entry for the call of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEntry<T> {
    pub id: EntryId,
    pub operation: T,
    /// The id of the entry containing the response to this call.
    pub response: EntryId,
}

/// The entry for the response of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEntry<T> {
    pub id: EntryId,
    pub operation: T,
}

/// An entry in a history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    Call(CallEntry<T>),
    Response(ResponseEntry<T>),
}

impl<T> Entry<T> {
    pub fn id(&self) -> EntryId {
        match self {
            Entry::Call(call) => call.id,
            Entry::Response(response) => response.id,
        }
    }
}

/// A history of operations performed on a shared object.
///
/// Entries can be _lifted_ out of the history and later _unlifted_ back into
/// their original positions, which is how the linearizability checker
/// backtracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    entries: Vec<Entry<T>>,
    // When an entry is removed from this history, its index is recorded here.
    removed_from: Vec<Option<usize>>,
}

impl<T> History<T> {
    /// Creates a history from a sequence of actions, in the order in which
    /// they happened.
    ///
    /// Each call is matched with the next response performed by the same
    /// process.
    ///
    /// # Panics
    ///
    /// Panics if a process calls an operation before receiving the response
    /// to its previous call, responds without a pending call, or never
    /// responds to a call.
    pub fn from_actions(actions: Vec<(ProcessId, Action<T>)>) -> Self {
        let mut pending: HashMap<ProcessId, usize> = HashMap::new();
        let mut responses: Vec<Option<EntryId>> = vec![None; actions.len()];
        for (i, (process, action)) in actions.iter().enumerate() {
            match action {
                Action::Call(_) => {
                    if pending.insert(*process, i).is_some() {
                        panic!("Process {process} called an operation while another was pending");
                    }
                }
                Action::Response(_) => match pending.remove(process) {
                    Some(call) => responses[call] = Some(i),
                    None => panic!("Process {process} responded without a pending call"),
                },
            }
        }
        if let Some(process) = pending.keys().next() {
            panic!("Process {process} never responded to its last call");
        }

        let num_entries = actions.len();
        let entries = actions
            .into_iter()
            .enumerate()
            .map(|(id, (_, action))| match action {
                Action::Call(operation) => Entry::Call(CallEntry {
                    id,
                    operation,
                    response: responses[id].unwrap_or_else(|| unreachable!()),
                }),
                Action::Response(operation) => Entry::Response(ResponseEntry { id, operation }),
            })
            .collect();
        Self {
            entries,
            removed_from: vec![None; num_entries],
        }
    }

    /// Returns the current index of the entry with the given id.
    ///
    /// # Panics
    ///
    /// Panics if no entry with that id is currently in the history.
    pub fn index_of_id(&self, id: EntryId) -> usize {
        match self.entries.iter().position(|e| e.id() == id) {
            Some(index) => index,
            None => panic!("Entry {id} is not in the history"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes the call entry at index `i`, along with its response, from
    /// the history.
    ///
    /// # Panics
    ///
    /// Panics if the entry at index `i` is not a call.
    pub fn lift(&mut self, i: usize) -> (Entry<T>, Entry<T>) {
        let call = self.remove(i);
        let response_id = match &call {
            Entry::Call(call) => call.response,
            Entry::Response(_) => panic!("Cannot lift a response entry"),
        };
        let response = self.remove(self.index_of_id(response_id));
        (call, response)
    }

    /// Re-inserts a call and response that were previously lifted, returning
    /// the indices they were restored to.
    pub fn unlift(&mut self, call: Entry<T>, response: Entry<T>) -> (usize, usize) {
        let response_index = self.insert(response);
        let call_index = self.insert(call);
        (call_index, response_index)
    }

    /// # Panics
    ///
    /// Panics if the entry was not previously removed from the history.
    fn insert(&mut self, entry: Entry<T>) -> usize {
        match self.removed_from[entry.id()].take() {
            Some(index) => {
                self.entries.insert(index, entry);
                index
            }
            None => panic!("Index that entry {} was removed from is unknown", entry.id()),
        }
    }

    fn remove(&mut self, i: usize) -> Entry<T> {
        let entry = self.entries.remove(i);
        self.removed_from[entry.id()] = Some(i);
        entry
    }
}

impl<T> Index<usize> for History<T> {
    type Output = Entry<T>;

    fn index(&self, i: usize) -> &Self::Output {
        self.entries.index(i)
    }
}

impl<T> IndexMut<usize> for History<T> {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        self.entries.index_mut(i)
    }
}
