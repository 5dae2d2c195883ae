use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DocumentStore, StorageError};
use crate::domain::aggregates::{AddressBook, CartSnapshot, CartStore, Order};
use crate::domain::value_objects::UserId;

const ORDERS_KEY: &str = "orders";

/// Per-user address collections, read and written whole.
#[derive(Clone)]
pub struct AddressRepository {
    store: Arc<dyn DocumentStore>,
}

impl AddressRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store } }

    fn key(user: &UserId) -> String { format!("addresses_{user}") }

    pub async fn load(&self, user: &UserId) -> Result<AddressBook, StorageError> {
        match self.store.get(&Self::key(user)).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(AddressBook::new()),
        }
    }

    pub async fn save(&self, user: &UserId, book: &AddressBook) -> Result<(), StorageError> {
        let value = serde_json::to_value(book)?;
        self.store.put(&Self::key(user), value).await
    }
}

/// Durable carts. Saving never changes the in-memory cart.
#[derive(Clone)]
pub struct CartRepository {
    store: Arc<dyn DocumentStore>,
}

impl CartRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store } }

    fn key(user: &UserId) -> String { format!("cart_{user}") }

    pub async fn load(&self, user: &UserId) -> Result<Option<CartStore>, StorageError> {
        let Some(value) = self.store.get(&Self::key(user)).await? else { return Ok(None) };
        let snapshot: CartSnapshot = serde_json::from_value(value)?;
        Ok(Some(CartStore::restore(snapshot)))
    }

    pub async fn save(&self, cart: &CartStore) -> Result<(), StorageError> {
        let value = serde_json::to_value(cart.snapshot())?;
        self.store.put(&Self::key(cart.owner()), value).await.inspect_err(|e| {
            tracing::error!(owner = %cart.owner(), error = %e, "cart save failed; keeping local cart");
        })
    }
}

/// All orders in one document; writers are serialized so concurrent
/// handlers do not lose each other's updates.
pub struct OrderRepository {
    store: Arc<dyn DocumentStore>,
    write: Mutex<()>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store, write: Mutex::new(()) } }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Order>, StorageError> {
        let mut orders = self.load().await?;
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Order>, StorageError> {
        Ok(self.load().await?.into_iter().find(|o| o.id() == id))
    }

    pub async fn insert(&self, order: Order) -> Result<Order, StorageError> {
        self.modify(|orders| {
            orders.push(order.clone());
            order
        }).await
    }

    pub async fn remove(&self, id: &str) -> Result<Option<Order>, StorageError> {
        self.modify(|orders| {
            let index = orders.iter().position(|o| o.id() == id)?;
            Some(orders.remove(index))
        }).await
    }

    /// Read-modify-write of the whole collection under the writer lock.
    pub async fn modify<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Vec<Order>) -> T + Send,
        T: Send,
    {
        let _guard = self.write.lock().await;
        let mut orders = self.load().await?;
        let result = f(&mut orders);
        self.store.put(ORDERS_KEY, serde_json::to_value(&orders)?).await?;
        Ok(result)
    }

    async fn load(&self) -> Result<Vec<Order>, StorageError> {
        match self.store.get(ORDERS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(vec![]),
        }
    }
}
