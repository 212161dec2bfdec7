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

//! Operations on orders and the lifecycle rules that gate them.

use crate::db;
use crate::driver::DispatchDriver;
use crate::model::{Order, OrderId, OrderParams, OrderStatus};
use hail_core::db::{DbError, TxExecutor};
use hail_core::driver::{DriverError, DriverResult};

/// Decides whether an update changing the persisted `order` into `params` is admissible.
///
/// The rules run in a fixed order: the terminal check must come before the in-progress check,
/// and the in-progress check must come before the transition table lookup, so that an earlier
/// restriction is never masked by a later rule.
fn check_update(order: &Order, params: &OrderParams) -> DriverResult<()> {
    if order.status().is_terminal() {
        return Err(DriverError::InvalidInput("Cannot modify a completed order".to_owned()));
    }

    // This rule only fires when the timestamp and both references change at once; an update
    // that touches just one or two of these fields falls through to the transition check.
    // TODO(jmmv): Confirm with the product owners whether changing any single one of these
    // fields on an in-progress order should also be rejected.
    if *order.status() == OrderStatus::InProgress
        && params.date_created() != order.date_created()
        && params.client_id() != order.client_id()
        && params.driver_id() != order.driver_id()
    {
        return Err(DriverError::InvalidInput("Cannot modify an order in progress".to_owned()));
    }

    if !order.status().can_become(*params.status()) {
        return Err(DriverError::InvalidInput(format!(
            "Cannot change order status from {} to {}",
            order.status(),
            params.status()
        )));
    }

    Ok(())
}

/// Ensures the client and the driver referenced by `params` exist.
async fn check_references(tx: &mut TxExecutor, params: &OrderParams) -> DriverResult<()> {
    match db::get_client(tx.ex(), *params.client_id()).await {
        Ok(_) => (),
        Err(DbError::NotFound) => {
            return Err(DriverError::NotFound("Client not found".to_owned()));
        }
        Err(e) => return Err(e.into()),
    }

    match db::get_driver(tx.ex(), *params.driver_id()).await {
        Ok(_) => (),
        Err(DbError::NotFound) => {
            return Err(DriverError::NotFound("Driver not found".to_owned()));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

impl DispatchDriver {
    /// Creates a new order from `params` after validating that the client and the driver it
    /// references exist.
    pub(crate) async fn create_order(self, params: OrderParams) -> DriverResult<Order> {
        let mut tx = self.db.begin().await?;
        check_references(&mut tx, &params).await?;
        let order = db::create_order(tx.ex(), &params).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Gets an existing order by `id`.
    pub(crate) async fn get_order(self, id: OrderId) -> DriverResult<Order> {
        match db::get_order(&mut self.db.ex().await?, id).await {
            Ok(order) => Ok(order),
            Err(DbError::NotFound) => Err(DriverError::NotFound("Order not found".to_owned())),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the caller-controlled fields of order `id` with `params` if the lifecycle rules
    /// admit the change.
    pub(crate) async fn update_order(self, id: OrderId, params: OrderParams) -> DriverResult<Order> {
        let mut tx = self.db.begin().await?;

        let order = match db::get_order(tx.ex(), id).await {
            Ok(order) => order,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Order not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        check_update(&order, &params)?;
        check_references(&mut tx, &params).await?;

        db::update_order(tx.ex(), id, &params).await?;
        tx.commit().await?;

        Ok(Order::new(
            id,
            *params.client_id(),
            *params.driver_id(),
            params.address_from().clone(),
            params.address_to().clone(),
            *params.date_created(),
            *params.status(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{Address, CarModel, Client, ClientId, ClientName, Driver, DriverId, DriverName};
    use time::OffsetDateTime;
    use time::macros::datetime;

    /// Timestamp used by default for the orders created in these tests.
    const DEFAULT_DATE: OffsetDateTime = datetime!(2023-06-01 10:20:30 UTC);

    /// Creates a client to attach test orders to.
    async fn create_test_client(context: &TestContext, name: &'static str) -> Client {
        db::create_client(&mut context.ex().await, &ClientName::from(name), false).await.unwrap()
    }

    /// Creates a driver to attach test orders to.
    async fn create_test_driver(context: &TestContext, name: &'static str) -> Driver {
        db::create_driver(&mut context.ex().await, &DriverName::from(name), &CarModel::from("VW"))
            .await
            .unwrap()
    }

    /// Builds order parameters referencing `client` and `driver` with default addresses.
    fn make_params(client: &Client, driver: &Driver, status: OrderStatus) -> OrderParams {
        OrderParams::new(
            *client.id(),
            *driver.id(),
            Address::from("5th and Main"),
            Address::from("Airport"),
            DEFAULT_DATE,
            status,
        )
    }

    /// Creates an order with `status` directly in the database, bypassing the lifecycle rules.
    async fn create_test_order(
        context: &TestContext,
        client: &Client,
        driver: &Driver,
        status: OrderStatus,
    ) -> Order {
        db::create_order(&mut context.ex().await, &make_params(client, driver, status))
            .await
            .unwrap()
    }

    #[test]
    fn test_check_update_transition_table() {
        use OrderStatus::*;

        let all = [NotAccepted, InProgress, Done, Cancelled];
        let allowed = [
            (NotAccepted, InProgress),
            (NotAccepted, Cancelled),
            (InProgress, Cancelled),
            (InProgress, Done),
        ];

        for from in all {
            for to in all {
                let order = Order::new(
                    OrderId::from(1),
                    ClientId::from(1),
                    DriverId::from(1),
                    Address::from("5th and Main"),
                    Address::from("Airport"),
                    DEFAULT_DATE,
                    from,
                );
                let params = OrderParams::new(
                    ClientId::from(1),
                    DriverId::from(1),
                    Address::from("5th and Main"),
                    Address::from("Airport"),
                    DEFAULT_DATE,
                    to,
                );

                let result = check_update(&order, &params);
                if allowed.contains(&(from, to)) {
                    assert!(result.is_ok(), "{} -> {} must be allowed", from, to);
                } else {
                    assert!(result.is_err(), "{} -> {} must be rejected", from, to);
                }
            }
        }
    }

    #[test]
    fn test_check_update_terminal_takes_precedence() {
        // Build an update that violates every rule at once and make sure the terminal
        // rejection is the one that wins.
        let order = Order::new(
            OrderId::from(1),
            ClientId::from(1),
            DriverId::from(1),
            Address::from("5th and Main"),
            Address::from("Airport"),
            DEFAULT_DATE,
            OrderStatus::Done,
        );
        let params = OrderParams::new(
            ClientId::from(2),
            DriverId::from(2),
            Address::from("5th and Main"),
            Address::from("Airport"),
            datetime!(2023-06-02 00:00:00 UTC),
            OrderStatus::NotAccepted,
        );

        match check_update(&order, &params).unwrap_err() {
            DriverError::InvalidInput(msg) => assert!(msg.contains("completed order")),
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_check_update_in_progress_takes_precedence_over_transitions() {
        // The proposed status is invalid too, but the in-progress restriction must fire first.
        let order = Order::new(
            OrderId::from(1),
            ClientId::from(1),
            DriverId::from(1),
            Address::from("5th and Main"),
            Address::from("Airport"),
            DEFAULT_DATE,
            OrderStatus::InProgress,
        );
        let params = OrderParams::new(
            ClientId::from(2),
            DriverId::from(2),
            Address::from("5th and Main"),
            Address::from("Airport"),
            datetime!(2023-06-02 00:00:00 UTC),
            OrderStatus::NotAccepted,
        );

        match check_update(&order, &params).unwrap_err() {
            DriverError::InvalidInput(msg) => assert!(msg.contains("in progress")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_order_ok() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let params = make_params(&client, &driver, OrderStatus::NotAccepted);
        let order = context.driver().create_order(params.clone()).await.unwrap();
        assert_eq!(params.client_id(), order.client_id());
        assert_eq!(params.status(), order.status());

        let read_order = db::get_order(&mut context.ex().await, *order.id()).await.unwrap();
        assert_eq!(order, read_order);
    }

    #[tokio::test]
    async fn test_create_order_accepts_any_initial_status() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        for status in
            [OrderStatus::NotAccepted, OrderStatus::InProgress, OrderStatus::Done, OrderStatus::Cancelled]
        {
            let order = context
                .driver()
                .create_order(make_params(&client, &driver, status))
                .await
                .unwrap();
            assert_eq!(&status, order.status());
        }
    }

    #[tokio::test]
    async fn test_create_order_unknown_client() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        db::delete_client(&mut context.ex().await, *client.id()).await.unwrap();

        assert_eq!(
            DriverError::NotFound("Client not found".to_owned()),
            context
                .driver()
                .create_order(make_params(&client, &driver, OrderStatus::NotAccepted))
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_create_order_unknown_driver() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        db::delete_driver(&mut context.ex().await, *driver.id()).await.unwrap();

        assert_eq!(
            DriverError::NotFound("Driver not found".to_owned()),
            context
                .driver()
                .create_order(make_params(&client, &driver, OrderStatus::NotAccepted))
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_get_order_ok() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client, &driver, OrderStatus::NotAccepted).await;

        let read_order = context.driver().get_order(*order.id()).await.unwrap();
        assert_eq!(order, read_order);
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Order not found".to_owned()),
            context.driver().get_order(OrderId::from(123)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_update_order_not_found() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        assert_eq!(
            DriverError::NotFound("Order not found".to_owned()),
            context
                .driver()
                .update_order(OrderId::from(123), make_params(&client, &driver, OrderStatus::Done))
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_update_order_applies_all_fields() {
        let context = TestContext::setup().await;
        let client1 = create_test_client(&context, "Ann").await;
        let client2 = create_test_client(&context, "Paul").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client1, &driver, OrderStatus::NotAccepted).await;

        let new_params = OrderParams::new(
            *client2.id(),
            *driver.id(),
            Address::from("Union Square"),
            Address::from("Pier 39"),
            datetime!(2023-06-02 08:00:00 UTC),
            OrderStatus::InProgress,
        );
        let updated = context.driver().update_order(*order.id(), new_params.clone()).await.unwrap();
        assert_eq!(order.id(), updated.id());
        assert_eq!(new_params.client_id(), updated.client_id());
        assert_eq!(new_params.address_to(), updated.address_to());
        assert_eq!(new_params.status(), updated.status());

        let read_order = db::get_order(&mut context.ex().await, *order.id()).await.unwrap();
        assert_eq!(updated, read_order);
    }

    #[tokio::test]
    async fn test_update_order_rejects_bad_transition_from_not_accepted() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client, &driver, OrderStatus::NotAccepted).await;

        for status in [OrderStatus::NotAccepted, OrderStatus::Done] {
            match context
                .driver()
                .update_order(*order.id(), make_params(&client, &driver, status))
                .await
            {
                Err(DriverError::InvalidInput(msg)) => {
                    assert!(msg.contains("Cannot change order status"));
                }
                e => panic!("{:?}", e),
            }
        }

        let read_order = db::get_order(&mut context.ex().await, *order.id()).await.unwrap();
        assert_eq!(&OrderStatus::NotAccepted, read_order.status());
    }

    #[tokio::test]
    async fn test_update_order_rejects_terminal_orders() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        for status in [OrderStatus::Done, OrderStatus::Cancelled] {
            let order = create_test_order(&context, &client, &driver, status).await;

            // Even an update that does not change a single field must be rejected.
            match context
                .driver()
                .update_order(*order.id(), make_params(&client, &driver, status))
                .await
            {
                Err(DriverError::InvalidInput(msg)) => {
                    assert!(msg.contains("Cannot modify a completed order"));
                }
                e => panic!("{:?}", e),
            }
        }
    }

    #[tokio::test]
    async fn test_update_order_in_progress_rejects_full_rewire() {
        let context = TestContext::setup().await;
        let client1 = create_test_client(&context, "Ann").await;
        let client2 = create_test_client(&context, "Paul").await;
        let driver1 = create_test_driver(&context, "Bob").await;
        let driver2 = create_test_driver(&context, "Eve").await;

        let order = create_test_order(&context, &client1, &driver1, OrderStatus::InProgress).await;

        let params = OrderParams::new(
            *client2.id(),
            *driver2.id(),
            Address::from("5th and Main"),
            Address::from("Airport"),
            datetime!(2023-06-02 08:00:00 UTC),
            OrderStatus::Done,
        );
        match context.driver().update_order(*order.id(), params).await {
            Err(DriverError::InvalidInput(msg)) => {
                assert!(msg.contains("Cannot modify an order in progress"));
            }
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_order_in_progress_allows_partial_changes() {
        let context = TestContext::setup().await;
        let client1 = create_test_client(&context, "Ann").await;
        let client2 = create_test_client(&context, "Paul").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client1, &driver, OrderStatus::InProgress).await;

        // Rewiring the client and the timestamp, but not the driver, passes the in-progress
        // restriction because the check requires all three fields to change at once.
        let params = OrderParams::new(
            *client2.id(),
            *driver.id(),
            Address::from("5th and Main"),
            Address::from("Ferry Building"),
            datetime!(2023-06-02 08:00:00 UTC),
            OrderStatus::Cancelled,
        );
        let updated = context.driver().update_order(*order.id(), params).await.unwrap();
        assert_eq!(&OrderStatus::Cancelled, updated.status());

        let read_order = db::get_order(&mut context.ex().await, *order.id()).await.unwrap();
        assert_eq!(updated, read_order);
    }

    #[tokio::test]
    async fn test_update_order_in_progress_allows_address_only_changes() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client, &driver, OrderStatus::InProgress).await;

        let params = OrderParams::new(
            *client.id(),
            *driver.id(),
            Address::from("5th and Main"),
            Address::from("Ferry Building"),
            DEFAULT_DATE,
            OrderStatus::Done,
        );
        let updated = context.driver().update_order(*order.id(), params).await.unwrap();
        assert_eq!(&Address::from("Ferry Building"), updated.address_to());
        assert_eq!(&OrderStatus::Done, updated.status());
    }

    #[tokio::test]
    async fn test_update_order_in_progress_rejects_same_status() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client, &driver, OrderStatus::InProgress).await;

        match context
            .driver()
            .update_order(*order.id(), make_params(&client, &driver, OrderStatus::InProgress))
            .await
        {
            Err(DriverError::InvalidInput(msg)) => {
                assert!(msg.contains("Cannot change order status"));
            }
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_order_unknown_references() {
        let context = TestContext::setup().await;
        let client = create_test_client(&context, "Ann").await;
        let driver = create_test_driver(&context, "Bob").await;

        let order = create_test_order(&context, &client, &driver, OrderStatus::NotAccepted).await;

        let params = OrderParams::new(
            ClientId::from(123),
            *driver.id(),
            Address::from("5th and Main"),
            Address::from("Airport"),
            DEFAULT_DATE,
            OrderStatus::InProgress,
        );
        assert_eq!(
            DriverError::NotFound("Client not found".to_owned()),
            context.driver().update_order(*order.id(), params).await.unwrap_err()
        );

        let read_order = db::get_order(&mut context.ex().await, *order.id()).await.unwrap();
        assert_eq!(&OrderStatus::NotAccepted, read_order.status());
    }
}
