use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

use crate::models::{MealPlan, NewMealPlan, Product};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            // AUTOINCREMENT keeps ids unique for the lifetime of the file,
            // even after a clear-all.
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS meal_plans (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    fn meal_plan_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealPlan> {
        Ok(MealPlan {
            id: row.get(0)?,
            name: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    // --- Products ---

    pub fn insert_product(&self, name: &str) -> Result<Product> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO products (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_product_by_id(id)
    }

    pub fn get_product_by_id(&self, id: i64) -> Result<Product> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM products WHERE id = ?1",
                params![id],
                Self::product_from_row,
            )
            .context("Product not found")
    }

    pub fn list_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM products ORDER BY id")?;
        let products = stmt
            .query_map([], Self::product_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Products whose name starts with `prefix`, ignoring case.
    ///
    /// Filtering happens in Rust because SQLite's `LIKE` only folds ASCII
    /// and pantry names are mostly Polish.
    pub fn search_products(&self, prefix: &str) -> Result<Vec<Product>> {
        let prefix = prefix.to_lowercase();
        Ok(self
            .list_products()?
            .into_iter()
            .filter(|p| p.name.to_lowercase().starts_with(&prefix))
            .collect())
    }

    pub fn delete_product(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn delete_all_products(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM products", [])?;
        Ok(rows)
    }

    // --- Meal plans ---

    pub fn insert_meal_plan(&self, plan: &NewMealPlan) -> Result<MealPlan> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO meal_plans (name, content, created_at) VALUES (?1, ?2, ?3)",
            params![plan.name, plan.content, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_meal_plan_by_id(id)
    }

    pub fn get_meal_plan_by_id(&self, id: i64) -> Result<MealPlan> {
        self.conn
            .query_row(
                "SELECT id, name, content, created_at FROM meal_plans WHERE id = ?1",
                params![id],
                Self::meal_plan_from_row,
            )
            .context("Meal plan not found")
    }

    pub fn list_meal_plans(&self) -> Result<Vec<MealPlan>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, content, created_at FROM meal_plans ORDER BY id")?;
        let plans = stmt
            .query_map([], Self::meal_plan_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plans)
    }

    pub fn delete_meal_plan(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM meal_plans WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn delete_all_meal_plans(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM meal_plans", [])?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> NewMealPlan {
        NewMealPlan {
            name: "Niedzielny obiad".to_string(),
            content: "Kurczak pieczony z ryżem i warzywami.".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get_product() {
        let db = Database::open_in_memory().unwrap();
        let product = db.insert_product("marchew").unwrap();

        assert!(product.id > 0);
        assert_eq!(product.name, "marchew");
        assert!(!product.created_at.is_empty());

        let fetched = db.get_product_by_id(product.id).unwrap();
        assert_eq!(fetched, product);
    }

    #[test]
    fn test_product_ids_unique() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_product("jajka").unwrap();
        let b = db.insert_product("jajka").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(db.list_products().unwrap().len(), 2);
    }

    #[test]
    fn test_list_products_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        for name in ["mleko", "chleb", "masło"] {
            db.insert_product(name).unwrap();
        }
        let names: Vec<String> = db
            .list_products()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["mleko", "chleb", "masło"]);
    }

    #[test]
    fn test_search_products_prefix_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        db.insert_product("Żurek").unwrap();
        db.insert_product("żółty ser").unwrap();
        db.insert_product("ser biały").unwrap();

        let results = db.search_products("ż").unwrap();
        assert_eq!(results.len(), 2);

        let results = db.search_products("SER").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "ser biały");

        // Prefix only, not substring
        assert!(db.search_products("biały").unwrap().is_empty());
        assert_eq!(db.search_products("").unwrap().len(), 3);
    }

    #[test]
    fn test_delete_product() {
        let db = Database::open_in_memory().unwrap();
        let product = db.insert_product("cebula").unwrap();

        assert!(db.delete_product(product.id).unwrap());
        assert!(db.get_product_by_id(product.id).is_err());
        assert!(db.list_products().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_product_is_noop() {
        let db = Database::open_in_memory().unwrap();
        db.insert_product("cebula").unwrap();
        let before = db.list_products().unwrap();

        assert!(!db.delete_product(9999).unwrap());
        assert_eq!(db.list_products().unwrap(), before);
    }

    #[test]
    fn test_delete_all_products_keeps_meal_plans() {
        let db = Database::open_in_memory().unwrap();
        db.insert_product("pomidor").unwrap();
        db.insert_product("ogórek").unwrap();
        db.insert_meal_plan(&sample_plan()).unwrap();

        assert_eq!(db.delete_all_products().unwrap(), 2);
        assert!(db.list_products().unwrap().is_empty());
        assert_eq!(db.list_meal_plans().unwrap().len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_product("pomidor").unwrap();
        db.delete_all_products().unwrap();
        let second = db.insert_product("pomidor").unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_insert_and_get_meal_plan() {
        let db = Database::open_in_memory().unwrap();
        let plan = db.insert_meal_plan(&sample_plan()).unwrap();

        assert_eq!(plan.name, "Niedzielny obiad");
        assert_eq!(plan.content, "Kurczak pieczony z ryżem i warzywami.");

        let fetched = db.get_meal_plan_by_id(plan.id).unwrap();
        assert_eq!(fetched, plan);
    }

    #[test]
    fn test_delete_meal_plan() {
        let db = Database::open_in_memory().unwrap();
        let plan = db.insert_meal_plan(&sample_plan()).unwrap();

        assert!(db.delete_meal_plan(plan.id).unwrap());
        assert!(!db.delete_meal_plan(plan.id).unwrap());
        assert!(db.list_meal_plans().unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_meal_plans_keeps_products() {
        let db = Database::open_in_memory().unwrap();
        db.insert_product("pomidor").unwrap();
        db.insert_meal_plan(&sample_plan()).unwrap();
        db.insert_meal_plan(&sample_plan()).unwrap();

        assert_eq!(db.delete_all_meal_plans().unwrap(), 2);
        assert!(db.list_meal_plans().unwrap().is_empty());
        assert_eq!(db.list_products().unwrap().len(), 1);
    }

    #[test]
    fn test_collections_have_separate_id_spaces() {
        let db = Database::open_in_memory().unwrap();
        let product = db.insert_product("pomidor").unwrap();
        let plan = db.insert_meal_plan(&sample_plan()).unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(plan.id, 1);

        db.delete_meal_plan(plan.id).unwrap();
        assert!(db.get_product_by_id(product.id).is_ok());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("larder.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_product("kasza").unwrap();
            db.insert_meal_plan(&sample_plan()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_products().unwrap()[0].name, "kasza");
        assert_eq!(db.list_meal_plans().unwrap().len(), 1);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("larder.db");
        Database::open(&path).unwrap();
        let db = Database::open(&path).unwrap();
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
