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

//! API to register a client.

use crate::driver::DispatchDriver;
use crate::model::ClientName;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hail_core::rest::RestError;
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to register a client.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct ClientRequest {
    /// Name of the passenger; must be unique.
    pub(crate) name: String,

    /// Whether the passenger gets the VIP treatment.
    pub(crate) is_vip: bool,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<DispatchDriver>,
    Json(request): Json<ClientRequest>,
) -> Result<impl IntoResponse, RestError> {
    let name = ClientName::new(request.name)?;
    let client = driver.create_client(name, request.is_vip).await?;
    Ok(Json(client))
}
