//! Endpoint parameter schemas.
//!
//! Every parameter struct is checked before it can become a
//! [`RequestDescriptor`], so malformed input never reaches the rate limiter
//! or the network.

use serde::{Deserialize, Serialize};

use crate::executor::RequestDescriptor;
use crate::ApiError;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Paging shared by every list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub const fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.page == Some(0) {
            return Err(ApiError::validation("page", "page must be at least 1"));
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ApiError::validation(
                    "limit",
                    format!("limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"),
                ));
            }
        }
        Ok(())
    }

    fn apply(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        descriptor
            .param_opt("page", self.page)
            .param_opt("limit", self.limit)
    }
}

/// Parameters of `GET /countries`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountriesParams {
    #[serde(flatten)]
    pub paging: PageParams,
}

impl CountriesParams {
    pub const fn page(page: u32, limit: u32) -> Self {
        Self {
            paging: PageParams::new(Some(page), Some(limit)),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        self.paging.validate()
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] when any parameter is out of range.
    pub fn into_descriptor(self) -> Result<RequestDescriptor, ApiError> {
        self.validate()?;
        Ok(self.paging.apply(RequestDescriptor::get("/countries")))
    }
}

/// Parameters of `GET /venues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenuesParams {
    /// ISO 3166-1 alpha-2 code.
    pub country: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub paging: PageParams,
}

impl VenuesParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.paging.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.paging.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(country) = &self.country {
            if country.len() != 2 || !country.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return Err(ApiError::validation(
                    "country",
                    format!("country must be a two-letter ISO code: '{country}'"),
                ));
            }
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::validation("name", "name filter must not be empty"));
            }
        }
        self.paging.validate()
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] when any parameter is malformed.
    pub fn into_descriptor(self) -> Result<RequestDescriptor, ApiError> {
        self.validate()?;
        let descriptor = RequestDescriptor::get("/venues")
            .param_opt("country", self.country.map(|c| c.to_ascii_uppercase()))
            .param_opt("name", self.name.map(|n| n.trim().to_owned()));
        Ok(self.paging.apply(descriptor))
    }
}

/// `GET /venues/{id}`.
///
/// # Errors
///
/// [`ApiError::Validation`] for a zero id.
pub fn venue_descriptor(id: u64) -> Result<RequestDescriptor, ApiError> {
    if id == 0 {
        return Err(ApiError::validation("id", "venue id must be greater than zero"));
    }
    Ok(RequestDescriptor::get(format!("/venues/{id}")))
}
