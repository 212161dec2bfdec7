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

//! Database abstraction to manipulate clients, drivers and orders.

use crate::model::{
    Address, CarModel, Client, ClientId, ClientName, Driver, DriverId, DriverName, Order, OrderId,
    OrderParams, OrderStatus,
};
#[cfg(feature = "postgres")]
use hail_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use hail_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use hail_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
#[cfg(feature = "postgres")]
use time::OffsetDateTime;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Client {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let is_vip: bool = row.try_get("is_vip").map_err(postgres::map_sqlx_error)?;

        Ok(Client::new(ClientId::from(id), ClientName::new(name)?, is_vip))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Driver {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let car: String = row.try_get("car").map_err(postgres::map_sqlx_error)?;

        Ok(Driver::new(DriverId::from(id), DriverName::new(name)?, CarModel::new(car)?))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Order {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let client_id: i64 = row.try_get("client_id").map_err(postgres::map_sqlx_error)?;
        let driver_id: i64 = row.try_get("driver_id").map_err(postgres::map_sqlx_error)?;
        let address_from: String = row.try_get("address_from").map_err(postgres::map_sqlx_error)?;
        let address_to: String = row.try_get("address_to").map_err(postgres::map_sqlx_error)?;
        let date_created: OffsetDateTime =
            row.try_get("date_created").map_err(postgres::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;

        Ok(Order::new(
            OrderId::from(id),
            ClientId::from(client_id),
            DriverId::from(driver_id),
            Address::new(address_from)?,
            Address::new(address_to)?,
            date_created,
            OrderStatus::new(&status)?,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Client {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let is_vip: bool = row.try_get("is_vip").map_err(sqlite::map_sqlx_error)?;

        Ok(Client::new(ClientId::from(id), ClientName::new(name)?, is_vip))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Driver {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let car: String = row.try_get("car").map_err(sqlite::map_sqlx_error)?;

        Ok(Driver::new(DriverId::from(id), DriverName::new(name)?, CarModel::new(car)?))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Order {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let client_id: i64 = row.try_get("client_id").map_err(sqlite::map_sqlx_error)?;
        let driver_id: i64 = row.try_get("driver_id").map_err(sqlite::map_sqlx_error)?;
        let address_from: String = row.try_get("address_from").map_err(sqlite::map_sqlx_error)?;
        let address_to: String = row.try_get("address_to").map_err(sqlite::map_sqlx_error)?;
        let date_created_secs: i64 =
            row.try_get("date_created_secs").map_err(sqlite::map_sqlx_error)?;
        let date_created_nsecs: i64 =
            row.try_get("date_created_nsecs").map_err(sqlite::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;

        Ok(Order::new(
            OrderId::from(id),
            ClientId::from(client_id),
            DriverId::from(driver_id),
            Address::new(address_from)?,
            Address::new(address_to)?,
            build_timestamp(date_created_secs, date_created_nsecs)?,
            OrderStatus::new(&status)?,
        ))
    }
}

/// Creates a new client named `name`, persisting it and returning the record with its
/// newly-assigned identifier.
pub(crate) async fn create_client(
    ex: &mut Executor,
    name: &ClientName,
    is_vip: bool,
) -> DbResult<Client> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "INSERT INTO clients (name, is_vip) VALUES ($1, $2) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(is_vip)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO clients (name, is_vip) VALUES (?, ?)";
            let done = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(is_vip)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Client::new(ClientId::from(id), name.clone(), is_vip))
}

/// Gets an existing client by `id`.
pub(crate) async fn get_client(ex: &mut Executor, id: ClientId) -> DbResult<Client> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, name, is_vip FROM clients WHERE id = $1";
            let raw_client = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Client::try_from(raw_client)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, name, is_vip FROM clients WHERE id = ?";
            let raw_client = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Client::try_from(raw_client)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes an existing client by `id`.
pub(crate) async fn delete_client(ex: &mut Executor, id: ClientId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM clients WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM clients WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Creates a new driver named `name` with a `car` descriptor, persisting it and returning the
/// record with its newly-assigned identifier.
pub(crate) async fn create_driver(
    ex: &mut Executor,
    name: &DriverName,
    car: &CarModel,
) -> DbResult<Driver> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "INSERT INTO drivers (name, car) VALUES ($1, $2) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(car.as_str())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO drivers (name, car) VALUES (?, ?)";
            let done = sqlx::query(query_str)
                .bind(name.as_str())
                .bind(car.as_str())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Driver::new(DriverId::from(id), name.clone(), car.clone()))
}

/// Gets an existing driver by `id`.
pub(crate) async fn get_driver(ex: &mut Executor, id: DriverId) -> DbResult<Driver> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, name, car FROM drivers WHERE id = $1";
            let raw_driver = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Driver::try_from(raw_driver)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, name, car FROM drivers WHERE id = ?";
            let raw_driver = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Driver::try_from(raw_driver)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes an existing driver by `id`.
pub(crate) async fn delete_driver(ex: &mut Executor, id: DriverId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM drivers WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM drivers WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Creates a new order from `params`, persisting it and returning the record with its
/// newly-assigned identifier.
pub(crate) async fn create_order(ex: &mut Executor, params: &OrderParams) -> DbResult<Order> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO orders
                    (client_id, driver_id, address_from, address_to, date_created, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(params.client_id().as_i64())
                .bind(params.driver_id().as_i64())
                .bind(params.address_from().as_str())
                .bind(params.address_to().as_str())
                .bind(*params.date_created())
                .bind(params.status().as_str())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (date_created_secs, date_created_nsecs) = unpack_timestamp(*params.date_created());

            let query_str = "
                INSERT INTO orders
                    (client_id, driver_id, address_from, address_to,
                     date_created_secs, date_created_nsecs, status)
                VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(params.client_id().as_i64())
                .bind(params.driver_id().as_i64())
                .bind(params.address_from().as_str())
                .bind(params.address_to().as_str())
                .bind(date_created_secs)
                .bind(date_created_nsecs)
                .bind(params.status().as_str())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Order::new(
        OrderId::from(id),
        *params.client_id(),
        *params.driver_id(),
        params.address_from().clone(),
        params.address_to().clone(),
        *params.date_created(),
        *params.status(),
    ))
}

/// Gets an existing order by `id`.
pub(crate) async fn get_order(ex: &mut Executor, id: OrderId) -> DbResult<Order> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id, client_id, driver_id, address_from, address_to, date_created, status
                FROM orders
                WHERE id = $1";
            let raw_order = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Order::try_from(raw_order)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, client_id, driver_id, address_from, address_to,
                    date_created_secs, date_created_nsecs, status
                FROM orders
                WHERE id = ?";
            let raw_order = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Order::try_from(raw_order)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites all the caller-controlled fields of order `id` with `params`.
///
/// Whether the update is admissible is decided by the driver layer; this operation applies it
/// verbatim.
pub(crate) async fn update_order(
    ex: &mut Executor,
    id: OrderId,
    params: &OrderParams,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE orders
                SET client_id = $1, driver_id = $2, address_from = $3, address_to = $4,
                    date_created = $5, status = $6
                WHERE id = $7";
            let done = sqlx::query(query_str)
                .bind(params.client_id().as_i64())
                .bind(params.driver_id().as_i64())
                .bind(params.address_from().as_str())
                .bind(params.address_to().as_str())
                .bind(*params.date_created())
                .bind(params.status().as_str())
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (date_created_secs, date_created_nsecs) = unpack_timestamp(*params.date_created());

            let query_str = "
                UPDATE orders
                SET client_id = ?, driver_id = ?, address_from = ?, address_to = ?,
                    date_created_secs = ?, date_created_nsecs = ?, status = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(params.client_id().as_i64())
                .bind(params.driver_id().as_i64())
                .bind(params.address_from().as_str())
                .bind(params.address_to().as_str())
                .bind(date_created_secs)
                .bind(date_created_nsecs)
                .bind(params.status().as_str())
                .bind(id.as_i64())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}
