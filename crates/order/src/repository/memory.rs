use crate::{
    abstract_trait::{
        cart::{CartLock, CartLockTrait, CartRepositoryTrait},
        order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
    },
    domain::requests::order::CreateOrderRecordRequest,
    model::{
        cart::Cart,
        order::{Order, OrderStatus, OrderWithItems},
        order_item::OrderItem,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
struct OrderTable {
    next_order_id: i64,
    next_item_id: i64,
    orders: BTreeMap<i64, OrderWithItems>,
}

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    table: Arc<Mutex<OrderTable>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.table.lock().await.orders.len()
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for InMemoryOrderRepository {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut table = self.table.lock().await;

        if table
            .orders
            .values()
            .any(|o| o.order.order_number == req.order_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "order number {} already exists",
                req.order_number
            )));
        }

        table.next_order_id += 1;
        let order_id = table.next_order_id;
        let now = Utc::now().naive_utc();

        let mut items = Vec::with_capacity(req.items.len());
        for item in &req.items {
            table.next_item_id += 1;
            items.push(OrderItem {
                order_item_id: table.next_item_id,
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
                subtotal: item.subtotal,
            });
        }

        let created = OrderWithItems {
            order: Order {
                order_id,
                order_number: req.order_number.clone(),
                customer_id: req.customer_id,
                total_amount: req.total_amount,
                status: req.status.as_str().to_string(),
                shipping_address: req.shipping_address.clone(),
                created_at: Some(now),
                updated_at: Some(now),
            },
            items,
        };

        table.orders.insert(order_id, created.clone());
        Ok(created)
    }

    async fn transition_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let mut table = self.table.lock().await;

        let entry = table
            .orders
            .get_mut(&order_id)
            .ok_or(RepositoryError::NotFound)?;

        let terminal = OrderStatus::TERMINAL
            .iter()
            .any(|s| s.as_str() == entry.order.status);
        if terminal {
            return Ok(None);
        }

        entry.order.status = status.as_str().to_string();
        entry.order.updated_at = Some(Utc::now().naive_utc());

        Ok(Some(entry.clone()))
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryOrderRepository {
    async fn find_all(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        Ok(self.table.lock().await.orders.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<OrderWithItems>, RepositoryError> {
        Ok(self.table.lock().await.orders.get(&id).cloned())
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        Ok(self
            .table
            .lock()
            .await
            .orders
            .values()
            .find(|o| o.order.order_number == order_number)
            .cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        Ok(self
            .table
            .lock()
            .await
            .orders
            .values()
            .filter(|o| o.order.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

type CartSlot = Arc<Mutex<Option<Cart>>>;

#[derive(Clone, Default)]
pub struct InMemoryCartRepository {
    carts: Arc<Mutex<HashMap<i64, CartSlot>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, user_id: i64) -> CartSlot {
        self.carts.lock().await.entry(user_id).or_default().clone()
    }
}

struct InMemoryCartLock {
    slot: OwnedMutexGuard<Option<Cart>>,
}

#[async_trait]
impl CartLockTrait for InMemoryCartLock {
    async fn save(self: Box<Self>, cart: &Cart) -> Result<(), RepositoryError> {
        let InMemoryCartLock { mut slot } = *self;
        *slot = Some(cart.clone());
        Ok(())
    }
}

#[async_trait]
impl CartRepositoryTrait for InMemoryCartRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        let slot = self.slot(user_id).await;
        let cart = slot.lock().await.clone();
        Ok(cart)
    }

    async fn lock(
        &self,
        user_id: i64,
        create: bool,
    ) -> Result<Option<(Cart, CartLock)>, RepositoryError> {
        let slot = self.slot(user_id).await.lock_owned().await;

        let cart = match slot.as_ref() {
            Some(cart) => cart.clone(),
            None if create => Cart::new(user_id),
            None => return Ok(None),
        };

        let lock: CartLock = Box::new(InMemoryCartLock { slot });
        Ok(Some((cart, lock)))
    }
}
