//! [`Bid`] read model definition.

#[cfg(doc)]
use crate::domain::Bid;

/// Wrapper around a [`Bid`] indicating that it is still active.
#[derive(Clone, Debug)]
pub struct Active<T>(pub T);

/// Wrapper around a [`Bid`] eligible to win: active, with its bidder still
/// employed and not an administrator.
#[derive(Clone, Debug)]
pub struct Competing<T>(pub T);
