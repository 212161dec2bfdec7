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

//! REST service to keep records of a taxi fleet: the passengers it serves, the drivers it
//! employs, and the ride orders that link the two.
//!
//! Orders are the one entity with real behavior behind them: once created, they advance
//! through a fixed lifecycle (`not_accepted` to `in_progress` to either `done` or
//! `cancelled`) and the driver layer rejects any update that does not follow it.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use hail_core::db::Db;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod db;
pub(crate) mod driver;
use driver::DispatchDriver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose
/// many crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Box<dyn Db + Send + Sync>,
) -> Result<(), Box<dyn Error>> {
    let driver = DispatchDriver::new(Arc::from(db));
    let app = app(driver);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
