//! Order repository for JSON storage
//!
//! Orders are authored elsewhere; this store is read-mostly and only written
//! through `import`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{GastosError, GastosResult};
use crate::models::{Order, OrderId};

use super::file_io::{read_json, read_json_required, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct OrderData {
    orders: Vec<Order>,
}

/// Repository for order persistence
pub struct OrderRepository {
    path: PathBuf,
    data: RwLock<HashMap<OrderId, Order>>,
}

impl OrderRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> GastosResult<()> {
        let file_data: OrderData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for order in file_data.orders {
            data.insert(order.id, order);
        }

        Ok(())
    }

    pub fn save(&self) -> GastosResult<()> {
        let file_data = OrderData {
            orders: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: OrderId) -> GastosResult<Option<Order>> {
        let data = self
            .data
            .read()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All orders sorted by number
    pub fn get_all(&self) -> GastosResult<Vec<Order>> {
        let data = self
            .data
            .read()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut orders: Vec<_> = data.values().cloned().collect();
        orders.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(orders)
    }

    pub fn find_by_number(&self, number: &str) -> GastosResult<Option<Order>> {
        let data = self
            .data
            .read()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let number = number.trim();
        Ok(data
            .values()
            .find(|o| o.number.eq_ignore_ascii_case(number))
            .cloned())
    }

    /// Insert or replace an order (in memory only; call `save`)
    pub fn upsert(&self, order: Order) -> GastosResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(clash) = data
            .values()
            .find(|o| o.id != order.id && o.number.eq_ignore_ascii_case(&order.number))
        {
            return Err(GastosError::Validation(format!(
                "Order number {} is already used by {}",
                order.number, clash.id
            )));
        }

        data.insert(order.id, order);
        Ok(())
    }

    /// Import orders from a JSON array file and save
    ///
    /// Returns how many orders were imported. Nothing is saved if any order
    /// in the file is rejected.
    pub fn import(&self, source: &Path) -> GastosResult<usize> {
        let orders: Vec<Order> = read_json_required(source)?;

        let backup = self.get_all()?;
        let count = orders.len();
        for order in orders {
            if let Err(e) = self.upsert(order) {
                self.restore(backup)?;
                return Err(e);
            }
        }

        self.save()?;
        tracing::info!(count, source = %source.display(), "imported orders");
        Ok(count)
    }

    fn restore(&self, orders: Vec<Order>) -> GastosResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.clear();
        data.extend(orders.into_iter().map(|o| (o.id, o)));
        Ok(())
    }

    pub fn count(&self) -> GastosResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
