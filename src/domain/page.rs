//! Pagination and sorting for read operations.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::DomainError;

/// Zero-based page request with a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<S> {
    page: u32,
    size: u32,
    sort: S,
}

impl<S: Copy> PageRequest<S> {
    /// Build a page request.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPageSize`] when `size` is zero.
    pub fn new(page: u32, size: u32, sort: S) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::InvalidPageSize { size });
        }
        Ok(Self { page, size, sort })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn sort(&self) -> S {
        self.sort
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Build the response page for `items` out of `total` matching rows.
    #[must_use]
    pub fn respond<T>(&self, items: Vec<T>, total: u64) -> Page<T> {
        Page {
            items,
            total,
            page: self.page,
            size: self.size,
        }
    }
}

impl<S: Copy + Default> PageRequest<S> {
    /// First page of `size` rows in default order.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPageSize`] when `size` is zero.
    pub fn first(size: u32) -> Result<Self, DomainError> {
        Self::new(0, size, S::default())
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` rows.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.size.max(1)))
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }

    /// Transform each item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

/// Sort keys for stock pages. Ties are broken by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockSort {
    #[default]
    Id,
    Name,
    Price,
    UpdatedAt,
}

impl FromStr for StockSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" | "stockId" => Ok(Self::Id),
            "name" | "stockName" => Ok(Self::Name),
            "price" | "currentPrice" | "current_price" => Ok(Self::Price),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            other => Err(DomainError::UnknownSortKey {
                key: other.to_string(),
                expected: "id, name, price, updatedAt",
            }),
        }
    }
}

impl fmt::Display for StockSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::UpdatedAt => "updatedAt",
        })
    }
}

/// Sort keys for exchange pages. Ties are broken by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExchangeSort {
    #[default]
    Id,
    Name,
}

impl FromStr for ExchangeSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" | "stockExchangeId" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            other => Err(DomainError::UnknownSortKey {
                key: other.to_string(),
                expected: "id, name",
            }),
        }
    }
}

impl fmt::Display for ExchangeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Name => "name",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            PageRequest::new(0, 0, StockSort::Id),
            Err(DomainError::InvalidPageSize { size: 0 })
        );
    }

    #[test]
    fn offset_does_not_overflow_u32() {
        let request = PageRequest::new(u32::MAX, u32::MAX, ExchangeSort::Id).unwrap();
        assert_eq!(request.offset(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::<StockSort>::first(5).unwrap();
        assert_eq!(request.respond(vec![1, 2, 3, 4, 5], 11).total_pages(), 3);
        assert_eq!(request.respond(Vec::<i32>::new(), 0).total_pages(), 0);
    }

    #[test]
    fn is_last_on_final_page() {
        let request = PageRequest::new(2, 5, StockSort::Id).unwrap();
        assert!(request.respond(vec![1], 11).is_last());
        let request = PageRequest::new(1, 5, StockSort::Id).unwrap();
        assert!(!request.respond(vec![1; 5], 11).is_last());
    }

    #[test]
    fn sort_keys_accept_camel_case_aliases() {
        assert_eq!("currentPrice".parse::<StockSort>().unwrap(), StockSort::Price);
        assert_eq!("stockName".parse::<StockSort>().unwrap(), StockSort::Name);
        assert!("volume".parse::<StockSort>().is_err());
        assert_eq!("name".parse::<ExchangeSort>().unwrap(), ExchangeSort::Name);
    }
}
