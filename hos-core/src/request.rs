//! Trip planning requests and their validation.

use thiserror::Error;

/// Longest address accepted for any of the three locations.
pub const MAX_ADDRESS_LEN: usize = 255;

/// The three addresses a trip is planned between.
///
/// # Examples
/// ```rust
/// use hos_core::PlanRequest;
///
/// let request = PlanRequest::new("Chicago, IL", "Indianapolis, IN", "Louisville, KY");
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    /// Where the driver is now.
    pub current_location: String,
    /// Where the cargo is collected.
    pub pickup_location: String,
    /// Where the cargo is delivered.
    pub dropoff_location: String,
}

/// Detailed validation failures for [`PlanRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanRequestValidationError {
    /// An address was empty or whitespace.
    #[error("{field} must not be blank")]
    Blank {
        /// Offending field.
        field: &'static str,
    },
    /// An address was longer than [`MAX_ADDRESS_LEN`] characters.
    #[error("{field} is {len} characters; at most {max} are allowed")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Character count supplied.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A recorded usage figure was negative or not finite.
    #[error("hours-of-service field {field} must be a finite, non-negative number")]
    InvalidHours {
        /// Offending field.
        field: &'static str,
    },
}

impl PlanRequest {
    /// Construct a request from three addresses.
    pub fn new(
        current_location: impl Into<String>,
        pickup_location: impl Into<String>,
        dropoff_location: impl Into<String>,
    ) -> Self {
        Self {
            current_location: current_location.into(),
            pickup_location: pickup_location.into(),
            dropoff_location: dropoff_location.into(),
        }
    }

    /// Addresses in travel order, paired with their field names.
    #[must_use]
    pub fn addresses(&self) -> [(&'static str, &str); 3] {
        [
            ("current_location", self.current_location.as_str()),
            ("pickup_location", self.pickup_location.as_str()),
            ("dropoff_location", self.dropoff_location.as_str()),
        ]
    }

    /// Check every address before any collaborator is called.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), PlanRequestValidationError> {
        for (field, address) in self.addresses() {
            if address.trim().is_empty() {
                return Err(PlanRequestValidationError::Blank { field });
            }
            let len = address.chars().count();
            if len > MAX_ADDRESS_LEN {
                return Err(PlanRequestValidationError::TooLong {
                    field,
                    len,
                    max: MAX_ADDRESS_LEN,
                });
            }
        }
        Ok(())
    }
}
