// Hail
// Copyright 2025 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use hail_core::model::{ModelError, ModelResult};
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Maximum length of a client name as specified in the schema.
const CLIENTS_MAX_NAME_LENGTH: usize = 50;

/// Minimum length of a driver name as specified in the schema.
const DRIVERS_MIN_NAME_LENGTH: usize = 2;

/// Maximum length of a driver name as specified in the schema.
const DRIVERS_MAX_NAME_LENGTH: usize = 125;

/// Minimum length of a car descriptor as specified in the schema.
const DRIVERS_MIN_CAR_LENGTH: usize = 2;

/// Maximum length of a car descriptor as specified in the schema.
const DRIVERS_MAX_CAR_LENGTH: usize = 25;

/// Maximum length of a pickup or dropoff address as specified in the schema.
const ORDERS_MAX_ADDRESS_LENGTH: usize = 50;

/// Identifier of a `Client`, assigned by the database at creation time.
#[derive(Clone, Copy, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct ClientId(i64);

impl ClientId {
    /// Returns the raw numeric value of the identifier.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a `Driver`, assigned by the database at creation time.
#[derive(Clone, Copy, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct DriverId(i64);

impl DriverId {
    /// Returns the raw numeric value of the identifier.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for DriverId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of an `Order`, assigned by the database at creation time.
#[derive(Clone, Copy, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct OrderId(i64);

impl OrderId {
    /// Returns the raw numeric value of the identifier.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Represents a well-formed (but maybe non-existent) client name.
#[derive(Clone, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct ClientName(String);

impl ClientName {
    /// Creates a new client name from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Client name cannot be empty".to_owned()));
        }
        if s.len() > CLIENTS_MAX_NAME_LENGTH {
            return Err(ModelError("Client name is too long".to_owned()));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the name.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for ClientName {
    /// Creates a new client name from a hardcoded string, which must be valid.
    fn from(name: &'static str) -> Self {
        ClientName::new(name).expect("Hardcoded client names must be valid")
    }
}

/// Represents a well-formed (but maybe non-existent) driver name.
#[derive(Clone, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct DriverName(String);

impl DriverName {
    /// Creates a new driver name from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() < DRIVERS_MIN_NAME_LENGTH {
            return Err(ModelError("Driver name is too short".to_owned()));
        }
        if s.len() > DRIVERS_MAX_NAME_LENGTH {
            return Err(ModelError("Driver name is too long".to_owned()));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the name.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for DriverName {
    /// Creates a new driver name from a hardcoded string, which must be valid.
    fn from(name: &'static str) -> Self {
        DriverName::new(name).expect("Hardcoded driver names must be valid")
    }
}

/// Represents the free-form description of the car a driver operates.
#[derive(Clone, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct CarModel(String);

impl CarModel {
    /// Creates a new car descriptor from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() < DRIVERS_MIN_CAR_LENGTH {
            return Err(ModelError("Car descriptor is too short".to_owned()));
        }
        if s.len() > DRIVERS_MAX_CAR_LENGTH {
            return Err(ModelError("Car descriptor is too long".to_owned()));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the descriptor.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for CarModel {
    /// Creates a new car descriptor from a hardcoded string, which must be valid.
    fn from(car: &'static str) -> Self {
        CarModel::new(car).expect("Hardcoded car descriptors must be valid")
    }
}

/// Represents a pickup or dropoff address.
#[derive(Clone, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct Address(String);

impl Address {
    /// Creates a new address from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Address cannot be empty".to_owned()));
        }
        if s.len() > ORDERS_MAX_ADDRESS_LENGTH {
            return Err(ModelError("Address is too long".to_owned()));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the address.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for Address {
    /// Creates a new address from a hardcoded string, which must be valid.
    fn from(address: &'static str) -> Self {
        Address::new(address).expect("Hardcoded addresses must be valid")
    }
}

/// Position of an order in its lifecycle.
///
/// Orders only ever move forward through the lifecycle as described by `can_become`, and the
/// terminal statuses admit no further transitions.
#[derive(Clone, Copy, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
#[serde(rename_all = "snake_case")]
pub(crate) enum OrderStatus {
    /// The order was placed but no driver took it yet.
    NotAccepted,

    /// A driver is currently executing the order.
    InProgress,

    /// The order completed successfully.  Terminal.
    Done,

    /// The order was called off.  Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Creates a status from an untrusted string `s`, making sure it is one of the known
    /// literals.
    pub(crate) fn new(s: &str) -> ModelResult<Self> {
        match s {
            "not_accepted" => Ok(OrderStatus::NotAccepted),
            "in_progress" => Ok(OrderStatus::InProgress),
            "done" => Ok(OrderStatus::Done),
            "cancelled" => Ok(OrderStatus::Cancelled),
            s => Err(ModelError(format!("Unknown order status '{}'", s))),
        }
    }

    /// Returns the wire and storage representation of the status.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotAccepted => "not_accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Checks whether the status admits no further transitions.
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }

    /// Checks whether an order with this status may transition to `target`.
    pub(crate) fn can_become(&self, target: OrderStatus) -> bool {
        let allowed: &'static [OrderStatus] = match self {
            OrderStatus::NotAccepted => &[OrderStatus::InProgress, OrderStatus::Cancelled],
            OrderStatus::InProgress => &[OrderStatus::Cancelled, OrderStatus::Done],
            OrderStatus::Done | OrderStatus::Cancelled => &[],
        };
        allowed.contains(&target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an RFC 3339 timestamp from an untrusted string `s`.
///
/// The result is truncated to microsecond resolution, which is the resolution supported by
/// timestamps in the PostgreSQL database.  Truncating at parse time keeps the values we echo
/// back to callers identical to the values we persist.
pub(crate) fn parse_timestamp(s: &str) -> ModelResult<OffsetDateTime> {
    let ts = OffsetDateTime::parse(s, &Rfc3339)
        .map_err(|e| ModelError(format!("Invalid date_created: {}", e)))?;

    let nanos = ts.unix_timestamp_nanos() / 1000 * 1000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| ModelError(format!("Invalid date_created: {}", e)))
}

/// A passenger registered in the service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Client {
    /// Identifier assigned by the database at creation time.
    id: ClientId,

    /// Name of the passenger, unique across the service.
    name: ClientName,

    /// Whether the passenger gets the VIP treatment.
    is_vip: bool,
}

/// A driver registered in the service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Driver {
    /// Identifier assigned by the database at creation time.
    id: DriverId,

    /// Name of the driver, unique across the service.
    name: DriverName,

    /// Description of the car the driver operates.
    car: CarModel,
}

/// A ride order linking one client and one driver.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Order {
    /// Identifier assigned by the database at creation time.
    id: OrderId,

    /// The client that requested the ride.
    client_id: ClientId,

    /// The driver executing the ride.
    driver_id: DriverId,

    /// Pickup address.
    address_from: Address,

    /// Dropoff address.
    address_to: Address,

    /// Caller-supplied creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    date_created: OffsetDateTime,

    /// Position of the order in its lifecycle.
    status: OrderStatus,
}

/// The caller-controlled fields of an order, shared by the creation and update operations.
#[derive(Constructor, Getters)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub(crate) struct OrderParams {
    /// The client that requested the ride.
    client_id: ClientId,

    /// The driver executing the ride.
    driver_id: DriverId,

    /// Pickup address.
    address_from: Address,

    /// Dropoff address.
    address_to: Address,

    /// Caller-supplied creation timestamp.
    date_created: OffsetDateTime,

    /// Position of the order in its lifecycle.
    status: OrderStatus,
}
