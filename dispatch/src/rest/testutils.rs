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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::DispatchDriver;
use crate::model::{
    Address, CarModel, Client, ClientId, ClientName, Driver, DriverId, DriverName, Order, OrderId,
    OrderParams, OrderStatus,
};
use crate::rest::app;
use axum::Router;
use hail_core::db::{Db, DbError};
use std::sync::Arc;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app under test.
    db: Arc<dyn Db + Send + Sync>,

    /// The application under test.
    app: Router,
}

impl TestContext {
    /// Sets up the application against an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::from(hail_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = DispatchDriver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Inserts a client directly into the backing database.
    pub(crate) async fn create_client(&self, name: &'static str, is_vip: bool) -> Client {
        db::create_client(&mut self.db.ex().await.unwrap(), &ClientName::from(name), is_vip)
            .await
            .unwrap()
    }

    /// Inserts a driver directly into the backing database.
    pub(crate) async fn create_driver(&self, name: &'static str, car: &'static str) -> Driver {
        db::create_driver(
            &mut self.db.ex().await.unwrap(),
            &DriverName::from(name),
            &CarModel::from(car),
        )
        .await
        .unwrap()
    }

    /// Inserts an order with `status` directly into the backing database, wiring it to the
    /// given `client` and `driver`.
    pub(crate) async fn create_order(
        &self,
        client: &Client,
        driver: &Driver,
        status: OrderStatus,
    ) -> Order {
        db::create_order(
            &mut self.db.ex().await.unwrap(),
            &OrderParams::new(
                *client.id(),
                *driver.id(),
                Address::from("5th and Main"),
                Address::from("Airport"),
                datetime!(2023-06-01 10:20:30 UTC),
                status,
            ),
        )
        .await
        .unwrap()
    }

    /// Fetches a client directly from the backing database, if it exists.
    pub(crate) async fn get_client(&self, id: ClientId) -> Option<Client> {
        match db::get_client(&mut self.db.ex().await.unwrap(), id).await {
            Ok(client) => Some(client),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Fetches a driver directly from the backing database, if it exists.
    pub(crate) async fn get_driver(&self, id: DriverId) -> Option<Driver> {
        match db::get_driver(&mut self.db.ex().await.unwrap(), id).await {
            Ok(driver) => Some(driver),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Fetches an order directly from the backing database, if it exists.
    pub(crate) async fn get_order(&self, id: OrderId) -> Option<Order> {
        match db::get_order(&mut self.db.ex().await.unwrap(), id).await {
            Ok(order) => Some(order),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }
}
