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

//! Entry point to the REST server.

use crate::driver::DispatchDriver;
use axum::Router;

mod client_delete;
mod client_get;
mod client_post;
mod driver_delete;
mod driver_get;
mod driver_post;
mod order_get;
mod order_post;
mod order_put;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: DispatchDriver) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/clients", post(client_post::handler))
        .route("/clients/:id", get(client_get::handler).delete(client_delete::handler))
        .route("/drivers", post(driver_post::handler))
        .route("/drivers/:id", get(driver_get::handler).delete(driver_delete::handler))
        .route("/orders", post(order_post::handler))
        .route("/orders/:id", get(order_get::handler).put(order_put::handler))
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use super::client_post::ClientRequest;
    use super::driver_post::DriverRequest;
    use super::order_post::OrderRequest;
    use super::testutils::*;
    use crate::model::{Client, Driver, Order, OrderStatus};
    use axum::http::{Method, StatusCode};
    use hail_core::rest::testutils::*;

    #[tokio::test]
    async fn test_e2e_order_flow() {
        let context = TestContext::setup().await;

        let client = OneShotBuilder::new(context.app(), (Method::POST, "/clients"))
            .send_json(ClientRequest { name: "Ann".to_owned(), is_vip: false })
            .await
            .expect_json::<Client>()
            .await;
        assert_eq!(1, client.id().as_i64());
        assert_eq!("Ann", client.name().as_str());
        assert!(!*client.is_vip());

        let fetched = OneShotBuilder::new(context.app(), (Method::GET, "/clients/1"))
            .send_empty()
            .await
            .expect_json::<Client>()
            .await;
        assert_eq!(client, fetched);

        let driver = OneShotBuilder::new(context.app(), (Method::POST, "/drivers"))
            .send_json(DriverRequest { name: "Bob".to_owned(), car: "Lada Vesta".to_owned() })
            .await
            .expect_json::<Driver>()
            .await;
        assert_eq!(1, driver.id().as_i64());

        let request = OrderRequest {
            client_id: 1,
            driver_id: 1,
            date_created: "2023-06-01T10:20:30Z".to_owned(),
            status: "not_accepted".to_owned(),
            address_from: "5th and Main".to_owned(),
            address_to: "Airport".to_owned(),
        };
        let order = OneShotBuilder::new(context.app(), (Method::POST, "/orders"))
            .send_json(request.clone())
            .await
            .expect_json::<Order>()
            .await;
        assert_eq!(1, order.id().as_i64());
        assert_eq!(&OrderStatus::NotAccepted, order.status());

        // Walk the order through its full lifecycle.
        let order = OneShotBuilder::new(context.app(), (Method::PUT, "/orders/1"))
            .send_json(OrderRequest { status: "in_progress".to_owned(), ..request.clone() })
            .await
            .expect_json::<Order>()
            .await;
        assert_eq!(&OrderStatus::InProgress, order.status());

        let order = OneShotBuilder::new(context.app(), (Method::PUT, "/orders/1"))
            .send_json(OrderRequest { status: "done".to_owned(), ..request.clone() })
            .await
            .expect_json::<Order>()
            .await;
        assert_eq!(&OrderStatus::Done, order.status());

        // The order is now terminal so no further updates are possible.
        OneShotBuilder::new(context.app(), (Method::PUT, "/orders/1"))
            .send_json(OrderRequest { status: "cancelled".to_owned(), ..request })
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("Cannot modify a completed order")
            .await;

        OneShotBuilder::new(context.app(), (Method::DELETE, "/drivers/999"))
            .send_empty()
            .await
            .expect_status(StatusCode::NOT_FOUND)
            .expect_error("Driver not found")
            .await;

        // There is no cascade policy for entities referenced by orders: the database refuses
        // to delete them, while unreferenced entities go away cleanly.
        OneShotBuilder::new(context.app(), (Method::DELETE, "/clients/1"))
            .send_empty()
            .await
            .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("FOREIGN KEY constraint failed")
            .await;
        let unreferenced = OneShotBuilder::new(context.app(), (Method::POST, "/clients"))
            .send_json(ClientRequest { name: "Paul".to_owned(), is_vip: true })
            .await
            .expect_json::<Client>()
            .await;
        OneShotBuilder::new(
            context.app(),
            (Method::DELETE, format!("/clients/{}", unreferenced.id().as_i64())),
        )
        .send_empty()
        .await
        .expect_empty()
        .await;

        let order = OneShotBuilder::new(context.app(), (Method::GET, "/orders/1"))
            .send_empty()
            .await
            .expect_json::<Order>()
            .await;
        assert_eq!(&OrderStatus::Done, order.status());
    }
}
