#[cfg(feature = "shuttle")]
pub(crate) use shuttle::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
#[cfg(not(feature = "shuttle"))]
pub(crate) use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
