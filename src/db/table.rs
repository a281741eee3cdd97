// src/db/table.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    catalog::{Product, Supplier},
    markup::MarkupRule,
    project::Project,
    purchase::ExternalPurchase,
    stock::{ReturnRecord, StockAdjustment},
    voucher::Voucher,
};

/// Registro endereçável por id dentro de uma `Table`.
pub trait Entity: Clone {
    fn id(&self) -> Uuid;
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(impl Entity for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        })*
    };
}

impl_entity!(
    Project,
    Product,
    Supplier,
    Voucher,
    ExternalPurchase,
    ReturnRecord,
    StockAdjustment,
    MarkupRule,
);

/// Coleção em memória, serializada como um array JSON simples.
/// Mantém a ordem de inserção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Entity> Table<T> {
    pub fn insert(&mut self, row: T) -> T {
        self.rows.push(row.clone());
        row
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.rows.iter_mut().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Aplica `f` ao registro e devolve uma cópia do resultado.
    pub fn update<F>(&mut self, id: Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let row = self.get_mut(id)?;
        f(row);
        Some(row.clone())
    }

    /// Remove filtrando a coleção. Não há exclusão em cascata.
    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let position = self.rows.iter().position(|r| r.id() == id)?;
        Some(self.rows.remove(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows.iter().filter(|r| predicate(r)).cloned().collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.rows
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.rows.clone()
    }

    pub fn replace_all(&mut self, rows: Vec<T>) {
        self.rows = rows;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            city: None,
            active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        }
    }

    #[test]
    fn insert_update_remove_keep_order() {
        let mut table = Table::default();
        let a = table.insert(project("A"));
        let b = table.insert(project("B"));
        let c = table.insert(project("C"));

        let updated = table.update(b.id, |p| p.name = "B2".into()).unwrap();
        assert_eq!(updated.name, "B2");

        assert_eq!(table.remove(a.id).unwrap().name, "A");
        assert!(table.remove(a.id).is_none());

        let names: Vec<_> = table.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B2", "C"]);
        assert!(table.contains(c.id));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut table = Table::default();
        table.insert(project("A"));
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "A");
    }
}
