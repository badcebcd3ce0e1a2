//! Checking [linearizability](https://en.wikipedia.org/wiki/Linearizability) of a
//! history of operations applied to a shared object.
//!
//! For more information, see the documentation of the [`WGLChecker`] and [`History`] structs.
use std::collections::HashSet;
use std::marker::PhantomData;

use crate::linearizability::history::{Entry, History};
use crate::specifications::Specification;

pub mod history;

/// A linearizability checker.
///
/// An implementation of the algorithm originally defined by Jeannette Wing and Chun Gong
/// [\[WG93\]](https://www.cs.cmu.edu/~wing/publications/WingGong93.pdf), and
/// extended by Gavin Lowe [\[L17\]](http://www.cs.ox.ac.uk/people/gavin.lowe/LinearizabiltyTesting/).
///
/// Given a history of operations, the algorithm linearizes each operation as
/// soon as possible. When an operation cannot be linearized, it backtracks and
/// proceeds with the next operation. Each partial linearization is cached
/// together with the resulting state of the object, so that the search never
/// revisits a configuration already known to be a dead end.
///
/// # Examples
///
/// Check histories of a 2-location snapshot object containing `u32` values.
///
/// ```
/// use mrmw_utils::linearizability::{WGLChecker, history::{History, Action::{Call, Response}}};
/// use mrmw_utils::specifications::snapshot::{SnapshotOperation::{Scan, Update}, SnapshotSpecification};
///
/// type Checker = WGLChecker<SnapshotSpecification<u32, 2>>;
///
/// // A scan that overlaps an update may observe either the old or the new value.
/// // P0 |-------------|   Update(1, 5)
/// // P1    |-----|        Scan([0, 5])
/// let history = History::from_actions(vec![
///     (0, Call(Update(1, 5))),
///     (1, Call(Scan(None))),
///     (1, Response(Scan(Some([0, 5])))),
///     (0, Response(Update(1, 5))),
/// ]);
/// assert!(Checker::is_linearizable(history));
///
/// // Two scans cannot disagree about the order of two updates.
/// // P0 |---------------------| Update(0, 1)
/// // P1 |---------------------| Update(1, 1)
/// // P2   |---|                 Scan([1, 0])
/// // P3           |---|         Scan([0, 1])
/// let history = History::from_actions(vec![
///     (0, Call(Update(0, 1))),
///     (1, Call(Update(1, 1))),
///     (2, Call(Scan(None))),
///     (2, Response(Scan(Some([1, 0])))),
///     (3, Call(Scan(None))),
///     (3, Response(Scan(Some([0, 1])))),
///     (0, Response(Update(0, 1))),
///     (1, Response(Update(1, 1))),
/// ]);
/// assert!(!Checker::is_linearizable(history));
/// ```
///
/// # Implementations in Other Languages
///
/// For an implementation in C++, see [`linearizability-checker`](https://github.com/ahorn/linearizability-checker).
/// For an implementation in Go, see [`porcupine`](https://github.com/anishathalye/porcupine).
pub struct WGLChecker<S: Specification> {
    data_type: PhantomData<S>,
}

type OperationEntry<S> = Entry<<S as Specification>::Operation>;
type OperationCall<S> = (
    (OperationEntry<S>, OperationEntry<S>),
    <S as Specification>::State,
);

impl<S: Specification> WGLChecker<S> {
    /// Returns whether the history of operations is linearizable with respect to the specification.
    pub fn is_linearizable(mut history: History<S::Operation>) -> bool {
        let mut state = S::init();
        let mut linearized = vec![false; history.len()];
        let mut calls: Vec<OperationCall<S>> = Vec::new();
        let mut cache: HashSet<(Vec<bool>, S::State)> = HashSet::new();
        let mut curr = 0;
        loop {
            if history.is_empty() {
                return true;
            }
            match &history[curr] {
                Entry::Call(call) => match &history[history.index_of_id(call.response)] {
                    Entry::Call(_) => panic!("Response cannot be a call entry"),
                    Entry::Response(response) => {
                        let (is_valid, new_state) = S::apply(&response.operation, &state);
                        let mut changed = false;
                        if is_valid {
                            let mut tmp_linearized = linearized.clone();
                            tmp_linearized[call.id] = true;
                            changed = cache.insert((tmp_linearized, new_state.clone()));
                        }
                        if changed {
                            linearized[call.id] = true;
                            let call = history.lift(curr);
                            calls.push((call, state));
                            state = new_state;
                            curr = 0;
                        } else {
                            curr += 1;
                        }
                    }
                },
                Entry::Response(_) => match calls.pop() {
                    None => return false,
                    Some(((call, response), old_state)) => {
                        state = old_state;
                        linearized[call.id()] = false;
                        let (call_index, _) = history.unlift(call, response);
                        curr = call_index + 1;
                    }
                },
            }
        }
    }
}
