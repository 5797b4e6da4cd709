//! Corral is a minimal CRUD data-access layer for a single `MongoDB`
//! collection.
//!
//! It holds one connection handle and one collection reference, and exposes
//! four operations that forward to the driver's native insert/find/update/
//! delete primitives. Arguments are validated before any backend traffic;
//! driver failures are logged and propagated as [`Error::Backend`].
//!
//! ## Example
//!
//! ```no_run
//! use corral::{CollectionClient, CollectionConfig};
//! use mongodb::bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> corral::Result<()> {
//!     let config = CollectionConfig::from_env()?;
//!     let client = CollectionClient::connect(&config).await?;
//!
//!     // Insert a document
//!     client.create(doc! { "name": "Rex", "species": "dog" }).await?;
//!
//!     // Select documents by custom fields
//!     let dogs = client.read(doc! { "species": "dog" }).await?;
//!     assert_eq!(dogs.len(), 1);
//!
//!     // Set fields on every matching document
//!     let modified = client
//!         .update(doc! { "species": "dog" }, doc! { "adopted": true })
//!         .await?;
//!     assert_eq!(modified, 1);
//!
//!     // Remove every matching document
//!     let removed = client.delete(doc! { "species": "dog" }).await?;
//!     assert_eq!(removed, 1);
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc
)]

use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, Document, bson, doc},
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{error, info};

pub mod config;
pub mod error;

pub use config::CollectionConfig;
pub use error::{Error, Result};

/// Sort direction for [`CollectionClient::read_with_opts`].
#[derive(Debug)]
pub enum Order {
    Asc,
    Desc,
}

/// A client bound to one `MongoDB` collection.
///
/// Created once at startup and held for the process lifetime. Each call is
/// an independent, stateless request; concurrency safety is delegated to
/// the driver's connection pool.
#[derive(Clone, Debug)]
pub struct CollectionClient {
    db: Database,
    collection: Collection<Document>,
}

impl CollectionClient {
    /// Opens a client for the configured database and collection.
    ///
    /// The driver connects lazily, so this succeeds even when the server is
    /// unreachable; use [`ping`](Self::ping) to verify the connection.
    pub async fn connect(config: &CollectionConfig) -> Result<Self> {
        let client = Client::with_uri_str(config.connection_uri()).await?;
        let db = client.database(&config.database);
        let collection = db.collection(&config.collection);

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            collection = %config.collection,
            "connected to MongoDB"
        );

        Ok(Self { db, collection })
    }

    /// Name of the collection this client targets.
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Round trips a `{ ping: 1 }` command to check the connection.
    pub async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .inspect_err(|error| error!(%error, "ping failed"))?;

        Ok(())
    }

    /// Inserts one document into the collection.
    ///
    /// Returns `true` if the backend confirmed an assigned id.
    pub async fn create(&self, document: Document) -> Result<bool> {
        if document.is_empty() {
            return Err(Error::InvalidArgument("document"));
        }

        let result = self
            .collection
            .insert_one(document)
            .await
            .inspect_err(|error| error!(%error, "insert failed"))?;

        let confirmed = !matches!(result.inserted_id, Bson::Null);
        info!(confirmed, "inserted document");

        Ok(confirmed)
    }

    /// Returns every document matching `query`, materialized into a `Vec`.
    ///
    /// An empty query matches all documents.
    pub async fn read(&self, query: Document) -> Result<Vec<Document>> {
        self.read_with_opts(query, None, None, None).await
    }

    /// [`read`](Self::read) with skip, limit and sort options.
    pub async fn read_with_opts(
        &self,
        query: Document,
        skip: Option<u64>,
        limit: Option<i64>,
        sort: Option<BTreeMap<String, Order>>,
    ) -> Result<Vec<Document>> {
        let mut find = self.collection.find(query);

        if let Some(skip) = skip {
            find = find.skip(skip);
        }

        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        if let Some(sort) = sort {
            find = find.sort(sort_document(sort));
        }

        let documents: Vec<Document> = async { find.await?.try_collect().await }
            .await
            .inspect_err(|error| error!(%error, "query failed"))?;

        info!(count = documents.len(), "query matched documents");

        Ok(documents)
    }

    /// Returns every document matching `query`, deserialized into `T`.
    pub async fn read_as<T>(&self, query: Document) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let typed = self.collection.clone_with_type::<T>();

        let entities = async { typed.find(query).await?.try_collect().await }
            .await
            .inspect_err(|error| error!(%error, "query failed"))?;

        Ok(entities)
    }

    /// Sets the fields in `update` on every document matching `query`.
    ///
    /// Fields not named in `update` are preserved. Returns the number of
    /// documents actually modified.
    pub async fn update(&self, query: Document, update: Document) -> Result<u64> {
        if query.is_empty() {
            return Err(Error::InvalidArgument("query"));
        }
        if update.is_empty() {
            return Err(Error::InvalidArgument("update"));
        }

        let result = self
            .collection
            .update_many(query, doc! { "$set": update })
            .await
            .inspect_err(|error| error!(%error, "update failed"))?;

        info!(modified = result.modified_count, "updated documents");

        Ok(result.modified_count)
    }

    /// Removes every document matching `query` and returns the count.
    pub async fn delete(&self, query: Document) -> Result<u64> {
        if query.is_empty() {
            return Err(Error::InvalidArgument("query"));
        }

        let result = self
            .collection
            .delete_many(query)
            .await
            .inspect_err(|error| error!(%error, "delete failed"))?;

        info!(deleted = result.deleted_count, "deleted documents");

        Ok(result.deleted_count)
    }
}

fn sort_document(sort: BTreeMap<String, Order>) -> Document {
    sort.into_iter()
        .map(|(field, order)| {
            (
                field,
                match order {
                    Order::Asc => bson!(1),
                    Order::Desc => bson!(-1),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> CollectionConfig {
        CollectionConfig::new("aacuser", "secret", "localhost", 27017, "aac", "animals").unwrap()
    }

    // The driver connects lazily, so these run without a live server: the
    // argument checks must reject the call before any backend traffic.
    async fn offline_client() -> CollectionClient {
        CollectionClient::connect(&local_config()).await.unwrap()
    }

    #[tokio::test]
    async fn connect_resolves_collection_handle() {
        let client = offline_client().await;
        assert_eq!(client.name(), "animals");
    }

    #[tokio::test]
    async fn create_rejects_empty_document() {
        let client = offline_client().await;
        let err = client.create(doc! {}).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument("document")));
    }

    #[tokio::test]
    async fn update_rejects_empty_arguments() {
        let client = offline_client().await;

        let err = client
            .update(doc! {}, doc! { "adopted": true })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument("query")));

        let err = client
            .update(doc! { "species": "dog" }, doc! {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument("update")));
    }

    #[tokio::test]
    async fn delete_rejects_empty_query() {
        let client = offline_client().await;
        let err = client.delete(doc! {}).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument("query")));
    }

    #[test]
    fn sort_document_maps_orders() {
        let sort = BTreeMap::from([
            ("age".to_string(), Order::Desc),
            ("name".to_string(), Order::Asc),
        ]);

        assert_eq!(sort_document(sort), doc! { "age": -1, "name": 1 });
    }
}
