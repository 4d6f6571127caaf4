//! Order document store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use tokio::sync::RwLock;

use crate::error::{DomainError, Result};
use crate::order::model::Order;

/// Storage for order documents, owned by the order service.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order, failing if the id already exists.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Returns the order with the given id, if any.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Writes the full document back. This is the local transaction.
    async fn save(&self, order: Order) -> Result<()>;
}

/// In-memory order store for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(DomainError::Validation(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn save(&self, order: Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }
}
