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

//! Operations on clients.

use crate::db;
use crate::driver::DispatchDriver;
use crate::model::{Client, ClientId, ClientName};
use hail_core::db::DbError;
use hail_core::driver::{DriverError, DriverResult};

impl DispatchDriver {
    /// Registers a new client named `name`.
    pub(crate) async fn create_client(self, name: ClientName, is_vip: bool) -> DriverResult<Client> {
        let mut tx = self.db.begin().await?;
        let client = match db::create_client(tx.ex(), &name, is_vip).await {
            Ok(client) => client,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(format!(
                    "A client named '{}' already exists",
                    name.as_str()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(client)
    }

    /// Gets an existing client by `id`.
    pub(crate) async fn get_client(self, id: ClientId) -> DriverResult<Client> {
        match db::get_client(&mut self.db.ex().await?, id).await {
            Ok(client) => Ok(client),
            Err(DbError::NotFound) => Err(DriverError::NotFound("Client not found".to_owned())),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes an existing client by `id`.
    pub(crate) async fn delete_client(self, id: ClientId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        match db::delete_client(tx.ex(), id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Client not found".to_owned()));
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
    async fn test_create_client_ok() {
        let context = TestContext::setup().await;

        let client =
            context.driver().create_client(ClientName::from("Ann"), true).await.unwrap();
        assert_eq!("Ann", client.name().as_str());
        assert!(*client.is_vip());

        let read_client = db::get_client(&mut context.ex().await, *client.id()).await.unwrap();
        assert_eq!(client, read_client);
    }

    #[tokio::test]
    async fn test_create_client_duplicate_name() {
        let context = TestContext::setup().await;

        context.driver().create_client(ClientName::from("Ann"), false).await.unwrap();

        match context.driver().create_client(ClientName::from("Ann"), true).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("already exists")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_client_ok() {
        let context = TestContext::setup().await;

        let client =
            db::create_client(&mut context.ex().await, &ClientName::from("Ann"), false)
                .await
                .unwrap();

        let read_client = context.driver().get_client(*client.id()).await.unwrap();
        assert_eq!(client, read_client);
    }

    #[tokio::test]
    async fn test_get_client_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Client not found".to_owned()),
            context.driver().get_client(ClientId::from(123)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_client_ok() {
        let context = TestContext::setup().await;

        let client =
            db::create_client(&mut context.ex().await, &ClientName::from("Ann"), false)
                .await
                .unwrap();

        context.driver().delete_client(*client.id()).await.unwrap();

        assert_eq!(
            DbError::NotFound,
            db::get_client(&mut context.ex().await, *client.id()).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_client_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Client not found".to_owned()),
            context.driver().delete_client(ClientId::from(123)).await.unwrap_err()
        );
    }
}
