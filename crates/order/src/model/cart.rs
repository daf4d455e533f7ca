use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
}

impl CartItem {
    pub fn subtotal(&self) -> i64 {
        (self.quantity as i64).saturating_mul(self.unit_price)
    }

    fn checked_subtotal(&self) -> Option<i64> {
        (self.quantity as i64).checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: i64,
    items: Vec<CartItem>,
    total: i64,
    item_count: i64,
}

fn overflow() -> ServiceError {
    ServiceError::validation("cart total exceeds the supported range")
}

fn derive_totals(items: &[CartItem]) -> Option<(i64, i64)> {
    items.iter().try_fold((0i64, 0i64), |(total, count), item| {
        Some((
            total.checked_add(item.checked_subtotal()?)?,
            count.checked_add(item.quantity as i64)?,
        ))
    })
}

impl Cart {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total: 0,
            item_count: 0,
        }
    }

    pub fn from_parts(user_id: i64, items: Vec<CartItem>) -> Result<Self, ServiceError> {
        let mut cart = Self::new(user_id);
        cart.replace_items(items)?;
        Ok(cart)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn item_count(&self) -> i64 {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(
        &mut self,
        product_id: i64,
        quantity: i32,
        unit_price: i64,
    ) -> Result<(), ServiceError> {
        if quantity <= 0 {
            return Ok(());
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    ServiceError::validation(format!("quantity overflow for product {product_id}"))
                })?;
            }
            None => items.push(CartItem {
                product_id,
                quantity,
                unit_price,
            }),
        }

        self.replace_items(items)
    }

    pub fn update_quantity(&mut self, product_id: i64, quantity: i32) -> Result<bool, ServiceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        let mut items = self.items.clone();
        let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) else {
            return Ok(false);
        };
        item.quantity = quantity;

        self.replace_items(items)?;
        Ok(true)
    }

    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let Some(pos) = self.items.iter().position(|i| i.product_id == product_id) else {
            return false;
        };

        let removed = self.items.remove(pos);
        self.total -= removed.subtotal();
        self.item_count -= removed.quantity as i64;
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = 0;
        self.item_count = 0;
    }

    fn replace_items(&mut self, items: Vec<CartItem>) -> Result<(), ServiceError> {
        let (total, item_count) = derive_totals(&items).ok_or_else(overflow)?;
        self.items = items;
        self.total = total;
        self.item_count = item_count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_derived(cart: &Cart) {
        let total: i64 = cart.items().iter().map(|i| i.quantity as i64 * i.unit_price).sum();
        let count: i64 = cart.items().iter().map(|i| i.quantity as i64).sum();
        assert_eq!(cart.total(), total);
        assert_eq!(cart.item_count(), count);
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new(1);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn adding_same_product_increments_line() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 2, 500).unwrap();
        cart.add_item(10, 3, 700).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[0].unit_price, 500);
        assert_eq!(cart.total(), 2_500);
        assert_derived(&cart);
    }

    #[test]
    fn totals_follow_every_mutation() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 2, 500).unwrap();
        cart.add_item(11, 1, 1_200).unwrap();
        assert_derived(&cart);
        assert_eq!(cart.item_count(), 3);

        assert!(cart.update_quantity(11, 4).unwrap());
        assert_derived(&cart);
        assert_eq!(cart.total(), 2 * 500 + 4 * 1_200);

        assert!(cart.remove_item(10));
        assert_derived(&cart);
        assert_eq!(cart.item_count(), 4);

        cart.clear();
        assert_derived(&cart);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_to_zero_removes_line() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 2, 500).unwrap();

        assert!(cart.update_quantity(10, 0).unwrap());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn missing_lines_report_false() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 1, 100).unwrap();

        assert!(!cart.update_quantity(99, 3).unwrap());
        assert!(!cart.remove_item(99));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn non_positive_add_is_ignored() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 0, 100).unwrap();
        cart.add_item(10, -2, 100).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn overflowing_add_is_rejected_and_leaves_cart_unchanged() {
        let mut cart = Cart::new(1);
        cart.add_item(10, i32::MAX, 1).unwrap();

        let err = cart.add_item(10, 5, 1).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(cart.items()[0].quantity, i32::MAX);
        assert_eq!(cart.item_count(), i32::MAX as i64);
        assert_derived(&cart);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let mut cart = Cart::new(1);
        cart.add_item(10, 2, i64::MAX / 2).unwrap();

        assert!(cart.add_item(11, 1, i64::MAX / 2).is_err());
        assert!(cart.update_quantity(10, 3).is_err());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_derived(&cart);
    }

    #[test]
    fn from_parts_derives_totals() {
        let cart = Cart::from_parts(
            3,
            vec![
                CartItem {
                    product_id: 1,
                    quantity: 2,
                    unit_price: 300,
                },
                CartItem {
                    product_id: 2,
                    quantity: 1,
                    unit_price: 50,
                },
            ],
        )
        .unwrap();
        assert_eq!(cart.total(), 650);
        assert_eq!(cart.item_count(), 3);
    }
}
