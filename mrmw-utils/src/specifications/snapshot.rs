//! A sequential specification of a multi-writer
//! [snapshot object](https://en.wikipedia.org/wiki/Shared_snapshot_objects).
use core::array::from_fn;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::Specification;

use SnapshotOperation::{Scan, Update};

/// An operation on an `N`-location snapshot object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOperation<T, const N: usize> {
    /// Scan the object and return a view containing the value at each location.
    ///
    /// If the return value of a scan is not-yet-known, this can be represented
    /// as `Scan(None)`.
    Scan(Option<[T; N]>),
    /// Set the value at a location. Any process may update any location.
    Update(usize, T),
}

/// A specification of an `N`-location multi-reader multi-writer
/// [snapshot object](https://en.wikipedia.org/wiki/Shared_snapshot_objects).
///
/// Each location of the snapshot contains a value of type `T`, and initially
/// contains `T::default()`.
pub struct SnapshotSpecification<T: Clone + Debug + Default + Eq + Hash, const N: usize> {
    data_type: PhantomData<T>,
}

impl<T: Clone + Debug + Default + Eq + Hash, const N: usize> Specification
    for SnapshotSpecification<T, N>
{
    type State = [T; N];
    type Operation = SnapshotOperation<T, N>;

    fn init() -> Self::State {
        from_fn(|_| T::default())
    }

    fn apply(operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Scan(result) => match result {
                Some(view) => (view == state, state.clone()),
                None => panic!("Cannot apply Scan with an unknown return value."),
            },
            Update(location, value) => {
                let mut new_state = state.clone();
                new_state[*location] = value.clone();
                (true, new_state)
            }
        }
    }
}
