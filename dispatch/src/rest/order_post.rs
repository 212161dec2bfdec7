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

//! API to create an order.

use crate::driver::DispatchDriver;
use crate::model::{Address, ClientId, DriverId, OrderParams, OrderStatus, parse_timestamp};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hail_core::model::ModelResult;
use hail_core::rest::RestError;
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to create or modify an order.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Clone, Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct OrderRequest {
    /// Identifier of the client requesting the ride.
    pub(crate) client_id: i64,

    /// Identifier of the driver executing the ride.
    pub(crate) driver_id: i64,

    /// Creation timestamp as an RFC 3339 string.
    pub(crate) date_created: String,

    /// Lifecycle status; one of `not_accepted`, `in_progress`, `done` or `cancelled`.
    pub(crate) status: String,

    /// Pickup address.
    pub(crate) address_from: String,

    /// Dropoff address.
    pub(crate) address_to: String,
}

impl OrderRequest {
    /// Validates the raw request contents and converts them into typed order parameters.
    pub(crate) fn into_params(self) -> ModelResult<OrderParams> {
        Ok(OrderParams::new(
            ClientId::from(self.client_id),
            DriverId::from(self.driver_id),
            Address::new(self.address_from)?,
            Address::new(self.address_to)?,
            parse_timestamp(&self.date_created)?,
            OrderStatus::new(&self.status)?,
        ))
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<DispatchDriver>,
    Json(request): Json<OrderRequest>,
) -> Result<impl IntoResponse, RestError> {
    let params = request.into_params()?;
    let order = driver.create_order(params).await?;
    Ok(Json(order))
}
