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

//! API to register a driver.

use crate::driver::DispatchDriver;
use crate::model::{CarModel, DriverName};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hail_core::rest::RestError;
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to register a driver.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct DriverRequest {
    /// Name of the driver; must be unique.
    pub(crate) name: String,

    /// Description of the car the driver operates.
    pub(crate) car: String,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<DispatchDriver>,
    Json(request): Json<DriverRequest>,
) -> Result<impl IntoResponse, RestError> {
    let name = DriverName::new(request.name)?;
    let car = CarModel::new(request.car)?;
    let driver = driver.create_driver(name, car).await?;
    Ok(Json(driver))
}
