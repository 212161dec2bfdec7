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

//! API to delete a client.

use crate::driver::DispatchDriver;
use crate::model::ClientId;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use hail_core::rest::{EmptyBody, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<DispatchDriver>,
    Path(id): Path<i64>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    driver.delete_client(ClientId::from(id)).await?;
    Ok(())
}
