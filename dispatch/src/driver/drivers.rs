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

//! Operations on drivers.

use crate::db;
use crate::driver::DispatchDriver;
use crate::model::{CarModel, Driver, DriverId, DriverName};
use hail_core::db::DbError;
use hail_core::driver::{DriverError, DriverResult};

impl DispatchDriver {
    /// Registers a new driver named `name` operating the given `car`.
    pub(crate) async fn create_driver(
        self,
        name: DriverName,
        car: CarModel,
    ) -> DriverResult<Driver> {
        let mut tx = self.db.begin().await?;
        let driver = match db::create_driver(tx.ex(), &name, &car).await {
            Ok(driver) => driver,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(format!(
                    "A driver named '{}' already exists",
                    name.as_str()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(driver)
    }

    /// Gets an existing driver by `id`.
    pub(crate) async fn get_driver(self, id: DriverId) -> DriverResult<Driver> {
        match db::get_driver(&mut self.db.ex().await?, id).await {
            Ok(driver) => Ok(driver),
            Err(DbError::NotFound) => Err(DriverError::NotFound("Driver not found".to_owned())),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes an existing driver by `id`.
    pub(crate) async fn delete_driver(self, id: DriverId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        match db::delete_driver(tx.ex(), id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Driver not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_create_driver_ok() {
        let context = TestContext::setup().await;

        let driver = context
            .driver()
            .create_driver(DriverName::from("Bob"), CarModel::from("Lada Vesta"))
            .await
            .unwrap();
        assert_eq!("Bob", driver.name().as_str());
        assert_eq!("Lada Vesta", driver.car().as_str());

        let read_driver = db::get_driver(&mut context.ex().await, *driver.id()).await.unwrap();
        assert_eq!(driver, read_driver);
    }

    #[tokio::test]
    async fn test_create_driver_duplicate_name() {
        let context = TestContext::setup().await;

        context
            .driver()
            .create_driver(DriverName::from("Bob"), CarModel::from("Lada Vesta"))
            .await
            .unwrap();

        match context
            .driver()
            .create_driver(DriverName::from("Bob"), CarModel::from("Moskvich"))
            .await
        {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("already exists")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_driver_ok() {
        let context = TestContext::setup().await;

        let driver = db::create_driver(
            &mut context.ex().await,
            &DriverName::from("Bob"),
            &CarModel::from("Lada Vesta"),
        )
        .await
        .unwrap();

        let read_driver = context.driver().get_driver(*driver.id()).await.unwrap();
        assert_eq!(driver, read_driver);
    }

    #[tokio::test]
    async fn test_get_driver_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Driver not found".to_owned()),
            context.driver().get_driver(DriverId::from(123)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_driver_ok() {
        let context = TestContext::setup().await;

        let driver = db::create_driver(
            &mut context.ex().await,
            &DriverName::from("Bob"),
            &CarModel::from("Lada Vesta"),
        )
        .await
        .unwrap();

        context.driver().delete_driver(*driver.id()).await.unwrap();

        assert_eq!(
            DbError::NotFound,
            db::get_driver(&mut context.ex().await, *driver.id()).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_driver_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Driver not found".to_owned()),
            context.driver().delete_driver(DriverId::from(999)).await.unwrap_err()
        );
    }
}
