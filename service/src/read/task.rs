//! [`Task`] read model definition.

#[cfg(doc)]
use crate::domain::Task;

/// Wrapper around a [`Task`] whose auction close condition may hold: still
/// backlogged, auctioned, and past its planned end.
///
/// Storage over-approximates here; settlement re-checks the precise
/// condition (grace period included) under a transaction.
#[derive(Clone, Debug)]
pub struct Closeable<T>(pub T);

/// Wrapper around a [`Task`] sitting under review past its review deadline.
#[derive(Clone, Debug)]
pub struct Expired<T>(pub T);
