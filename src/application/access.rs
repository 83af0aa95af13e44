//! Which authority each operation requires.
//!
//! The request boundary calls [`authorize`] before invoking a service, so
//! the services themselves stay free of authorization checks.

use std::fmt;

use crate::domain::user::Authority;
use crate::error::AuthError;

use super::auth::{Identity, Principal};

/// Every service operation reachable from the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListStocks,
    GetStock,
    CreateStock,
    UpdateStockPrice,
    DeleteStock,
    ExchangesListingStock,
    ListExchanges,
    ListLiveExchanges,
    GetExchange,
    CreateExchange,
    UpdateExchange,
    DeleteExchange,
    StocksListedOnExchange,
    AddListing,
    RemoveListing,
    RecomputeLiveStatus,
}

impl Operation {
    /// Authority required to run the operation, `None` if it is public.
    #[must_use]
    pub const fn required_authority(self) -> Option<Authority> {
        match self {
            Self::ListStocks | Self::GetStock => None,
            Self::CreateStock | Self::UpdateStockPrice | Self::DeleteStock => Some(Authority::Admin),
            Self::ExchangesListingStock
            | Self::ListExchanges
            | Self::ListLiveExchanges
            | Self::GetExchange
            | Self::CreateExchange
            | Self::UpdateExchange
            | Self::DeleteExchange
            | Self::StocksListedOnExchange
            | Self::AddListing
            | Self::RemoveListing
            | Self::RecomputeLiveStatus => Some(Authority::User),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Check that `identity` may run `operation`.
///
/// Returns the principal for protected operations and `None` for public
/// ones called anonymously.
///
/// # Errors
/// [`AuthError::Unauthenticated`] for anonymous callers of protected
/// operations, [`AuthError::Forbidden`] when the caller lacks the authority.
pub fn authorize(identity: &Identity, operation: Operation) -> Result<Option<&Principal>, AuthError> {
    match operation.required_authority() {
        None => Ok(identity.principal()),
        Some(authority) => identity.require(authority).map(Some),
    }
}
