//! Allocation catalog
//!
//! Read-only queries over orders and their line items, including each
//! item's budget allocation per expense category.

use crate::error::{GastosError, GastosResult};
use crate::models::{ExpenseCategory, ItemId, Money, NumberFormat, Order, OrderId, OrderLineItem};
use crate::storage::Storage;

/// Service for order/item lookups
pub struct CatalogService<'a> {
    storage: &'a Storage,
    format: NumberFormat,
}

impl<'a> CatalogService<'a> {
    pub fn new(storage: &'a Storage, format: NumberFormat) -> Self {
        Self { storage, format }
    }

    pub fn list_orders(&self) -> GastosResult<Vec<Order>> {
        self.storage.orders.get_all()
    }

    pub fn get_order(&self, id: OrderId) -> GastosResult<Order> {
        self.storage
            .orders
            .get(id)?
            .ok_or_else(|| GastosError::order_not_found(id.to_string()))
    }

    /// Find an order by number (e.g. `OP-2025-0012`) or by id
    pub fn find_order(&self, identifier: &str) -> GastosResult<Order> {
        if let Some(order) = self.storage.orders.find_by_number(identifier)? {
            return Ok(order);
        }

        let mut matches: Vec<Order> = self
            .list_orders()?
            .into_iter()
            .filter(|o| o.id.matches(identifier))
            .collect();

        match matches.len() {
            0 => Err(GastosError::order_not_found(identifier)),
            1 => Ok(matches.remove(0)),
            n => Err(GastosError::Validation(format!(
                "'{}' matches {} orders",
                identifier, n
            ))),
        }
    }

    /// Find a line item by id, together with the order that owns it
    pub fn find_item(&self, identifier: &str) -> GastosResult<(Order, OrderLineItem)> {
        let mut matches = Vec::new();
        for order in self.list_orders()? {
            for item in &order.items {
                if item.id.matches(identifier) {
                    matches.push((order.clone(), item.clone()));
                }
            }
        }

        match matches.len() {
            0 => Err(GastosError::item_not_found(identifier)),
            1 => Ok(matches.remove(0)),
            n => Err(GastosError::Validation(format!(
                "'{}' matches {} order items",
                identifier, n
            ))),
        }
    }

    /// Owning order of an item id
    pub fn order_for_item(&self, item_id: ItemId) -> GastosResult<Order> {
        self.list_orders()?
            .into_iter()
            .find(|o| o.has_item(item_id))
            .ok_or_else(|| GastosError::item_not_found(item_id.to_string()))
    }

    pub fn item_allocation(
        &self,
        item: &OrderLineItem,
        category: ExpenseCategory,
    ) -> GastosResult<Money> {
        Ok(item.allocation(category, &self.format)?)
    }

    /// Sum of the category allocation over every item of the order
    pub fn order_allocation(&self, order: &Order, category: ExpenseCategory) -> GastosResult<Money> {
        Ok(order.allocation(category, &self.format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::GastosPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = GastosPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed_order(storage: &Storage) -> Order {
        let order = Order::new("OP-2025-0012", "Acme")
            .with_item(OrderLineItem::new("Prime").with_budgets("100.000", "1.000.000", ""))
            .with_item(OrderLineItem::new("Late").with_budgets("50.000", "", "20.000"));
        storage.orders.upsert(order.clone()).unwrap();
        order
    }

    #[test]
    fn test_find_order_by_number_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let order = seed_order(&storage);
        let service = CatalogService::new(&storage, NumberFormat::default());

        assert_eq!(service.find_order("OP-2025-0012").unwrap().id, order.id);
        assert_eq!(service.find_order(&order.id.to_string()).unwrap().id, order.id);
        assert!(service.find_order("OP-404").unwrap_err().is_not_found());

        assert_eq!(service.get_order(order.id).unwrap().number, "OP-2025-0012");
        assert!(service.get_order(OrderId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_item_returns_owner() {
        let (_temp_dir, storage) = create_test_storage();
        let order = seed_order(&storage);
        let service = CatalogService::new(&storage, NumberFormat::default());
        let item_id = order.items[1].id;

        let (owner, item) = service.find_item(&item_id.to_string()).unwrap();
        assert_eq!(owner.id, order.id);
        assert_eq!(item.program, "Late");
        assert_eq!(service.order_for_item(item_id).unwrap().id, order.id);
    }

    #[test]
    fn test_allocations() {
        let (_temp_dir, storage) = create_test_storage();
        let order = seed_order(&storage);
        let service = CatalogService::new(&storage, NumberFormat::default());

        assert_eq!(
            service
                .item_allocation(&order.items[0], ExpenseCategory::Talent)
                .unwrap(),
            Money::from_units(1_000_000)
        );
        assert_eq!(
            service
                .order_allocation(&order, ExpenseCategory::Implementation)
                .unwrap(),
            Money::from_units(150_000)
        );
        assert!(service
            .order_allocation(&order, ExpenseCategory::Direct)
            .unwrap()
            .is_zero());
    }

    #[test]
    fn test_unparsable_allocation_is_validation_error() {
        let (_temp_dir, storage) = create_test_storage();
        let order = Order::new("OP-9", "Broken")
            .with_item(OrderLineItem::new("X").with_budgets("", "mucho", ""));
        let service = CatalogService::new(&storage, NumberFormat::default());

        let err = service
            .order_allocation(&order, ExpenseCategory::Talent)
            .unwrap_err();
        assert!(err.is_validation());
    }
}
