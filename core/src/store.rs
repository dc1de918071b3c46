use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::db::Database;
use crate::models::{MealPlan, NewMealPlan, Product};

/// Asynchronous access to the two persisted collections.
///
/// Each call is an independent unit of work: nothing spans two calls, so a
/// batch of `add_product` calls can partially succeed. Removing an id that
/// does not exist is not an error.
pub trait PantryStore: Send + Sync {
    fn add_product(&self, name: &str) -> impl Future<Output = Result<Product>> + Send;
    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send;
    fn remove_product(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
    fn remove_all_products(&self) -> impl Future<Output = Result<()>> + Send;

    fn add_meal_plan(
        &self,
        name: &str,
        content: &str,
    ) -> impl Future<Output = Result<MealPlan>> + Send;
    fn get_meal_plans(&self) -> impl Future<Output = Result<Vec<MealPlan>>> + Send;
    fn remove_meal_plan(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
    fn remove_all_meal_plans(&self) -> impl Future<Output = Result<()>> + Send;
}

/// [`PantryStore`] over a SQLite [`Database`], run on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    async fn with_db<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        debug!(op, "store call");
        tokio::task::spawn_blocking(move || {
            let db = db.lock().map_err(|_| anyhow!("Database lock poisoned"))?;
            f(&db)
        })
        .await
        .with_context(|| format!("Storage task '{op}' did not complete"))?
    }
}

impl PantryStore for SqliteStore {
    async fn add_product(&self, name: &str) -> Result<Product> {
        let name = name.to_string();
        self.with_db("add_product", move |db| db.insert_product(&name))
            .await
    }

    async fn get_products(&self) -> Result<Vec<Product>> {
        self.with_db("get_products", Database::list_products).await
    }

    async fn remove_product(&self, id: i64) -> Result<()> {
        let deleted = self
            .with_db("remove_product", move |db| db.delete_product(id))
            .await?;
        if !deleted {
            debug!(id, "remove_product: no such product");
        }
        Ok(())
    }

    async fn remove_all_products(&self) -> Result<()> {
        let removed = self
            .with_db("remove_all_products", Database::delete_all_products)
            .await?;
        debug!(removed, "pantry cleared");
        Ok(())
    }

    async fn add_meal_plan(&self, name: &str, content: &str) -> Result<MealPlan> {
        let plan = NewMealPlan {
            name: name.to_string(),
            content: content.to_string(),
        };
        self.with_db("add_meal_plan", move |db| db.insert_meal_plan(&plan))
            .await
    }

    async fn get_meal_plans(&self) -> Result<Vec<MealPlan>> {
        self.with_db("get_meal_plans", Database::list_meal_plans)
            .await
    }

    async fn remove_meal_plan(&self, id: i64) -> Result<()> {
        let deleted = self
            .with_db("remove_meal_plan", move |db| db.delete_meal_plan(id))
            .await?;
        if !deleted {
            debug!(id, "remove_meal_plan: no such meal plan");
        }
        Ok(())
    }

    async fn remove_all_meal_plans(&self) -> Result<()> {
        let removed = self
            .with_db("remove_all_meal_plans", Database::delete_all_meal_plans)
            .await?;
        debug!(removed, "meal plans cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_add_then_get_includes_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_product("jabłko").await.unwrap();
        let added = store.add_product("gruszka").await.unwrap();

        let products = store.get_products().await.unwrap();
        assert!(products.iter().any(|p| p.id == added.id && p.name == "gruszka"));

        let ids: HashSet<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[tokio::test]
    async fn test_consecutive_reads_identical() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_product("mąka").await.unwrap();
        store.add_product("cukier").await.unwrap();

        let first = store.get_products().await.unwrap();
        let second = store.get_products().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_remove_product() {
        let store = SqliteStore::open_in_memory().unwrap();
        let p = store.add_product("mąka").await.unwrap();
        store.add_product("cukier").await.unwrap();

        store.remove_product(p.id).await.unwrap();
        let products = store.get_products().await.unwrap();
        assert!(products.iter().all(|x| x.id != p.id));
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_product_leaves_collection() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_product("mąka").await.unwrap();
        let before = store.get_products().await.unwrap();

        store.remove_product(424_242).await.unwrap();
        assert_eq!(store.get_products().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove_all_products_leaves_meal_plans() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_product("mąka").await.unwrap();
        store.add_meal_plan("Placki", "Usmaż placki.").await.unwrap();

        store.remove_all_products().await.unwrap();
        assert!(store.get_products().await.unwrap().is_empty());
        assert_eq!(store.get_meal_plans().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_meal_plan_operations() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.add_meal_plan("Śniadanie", "Owsianka").await.unwrap();
        let b = store.add_meal_plan("Obiad", "Zupa").await.unwrap();
        assert_ne!(a.id, b.id);

        store.remove_meal_plan(a.id).await.unwrap();
        store.remove_meal_plan(a.id).await.unwrap();
        let plans = store.get_meal_plans().await.unwrap();
        assert_eq!(plans, vec![b]);

        store.add_product("mąka").await.unwrap();
        store.remove_all_meal_plans().await.unwrap();
        assert!(store.get_meal_plans().await.unwrap().is_empty());
        assert_eq!(store.get_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = SqliteStore::open_in_memory().unwrap();
        let other = store.clone();
        store.add_product("sól").await.unwrap();
        assert_eq!(other.get_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (a, b) = tokio::join!(store.add_product("sól"), store.add_product("pieprz"));
        assert_ne!(a.unwrap().id, b.unwrap().id);
    }
}
