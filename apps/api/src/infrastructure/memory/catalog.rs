use async_trait::async_trait;
use uuid::Uuid;

use super::{paginate, MemoryStore};
use crate::domain::inventory::{InventoryItem, StockLine};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::product::{Brand, Category, Product, ProductFilter, Rating};
use crate::domain::repositories::{
    CatalogRepository, InventoryRepository, ProductRepository, RepoResult, RepositoryError,
};

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: &Product) -> RepoResult<()> {
        self.tables
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn update(&self, product: &Product) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let slot = t
            .products
            .get_mut(&product.id)
            .ok_or_else(|| RepositoryError::not_found("Product not found"))?;
        *slot = product.clone();
        Ok(())
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> RepoResult<Paginated<Product>> {
        let t = self.tables.read().await;
        let mut products: Vec<Product> = t
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| filter.sort.compare(a, b));
        Ok(paginate(products, page))
    }

    async fn set_rating(&self, id: Uuid, rating: Rating) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if let Some(product) = t.products.get_mut(&id) {
            product.rating = rating;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_category(&self, category: &Category) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t
            .categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(RepositoryError::conflict("Category already exists"));
        }
        t.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn find_category(&self, id: Uuid) -> RepoResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn update_category(&self, category: &Category) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t
            .categories
            .values()
            .any(|c| c.id != category.id && c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(RepositoryError::conflict("Category already exists"));
        }
        let slot = t
            .categories
            .get_mut(&category.id)
            .ok_or_else(|| RepositoryError::not_found("Category not found"))?;
        *slot = category.clone();
        Ok(())
    }

    async fn list_categories(&self, active_only: bool) -> RepoResult<Vec<Category>> {
        let t = self.tables.read().await;
        let mut categories: Vec<Category> = t
            .categories
            .values()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_brand(&self, brand: &Brand) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t.brands.values().any(|b| b.name.eq_ignore_ascii_case(&brand.name)) {
            return Err(RepositoryError::conflict("Brand already exists"));
        }
        t.brands.insert(brand.id, brand.clone());
        Ok(())
    }

    async fn list_brands(&self, active_only: bool) -> RepoResult<Vec<Brand>> {
        let t = self.tables.read().await;
        let mut brands: Vec<Brand> = t
            .brands
            .values()
            .filter(|b| !active_only || b.is_active)
            .cloned()
            .collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn ensure(&self, items: &[InventoryItem]) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        for item in items {
            let exists = t
                .inventory
                .values()
                .any(|i| i.product_id == item.product_id && i.variant.sku == item.variant.sku);
            if !exists {
                t.inventory.insert(item.id, item.clone());
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<InventoryItem>> {
        Ok(self.tables.read().await.inventory.get(&id).cloned())
    }

    async fn find_by_variant(&self, product_id: Uuid, sku: &str) -> RepoResult<Option<InventoryItem>> {
        let t = self.tables.read().await;
        Ok(t
            .inventory
            .values()
            .find(|i| i.product_id == product_id && i.variant.sku == sku)
            .cloned())
    }

    async fn update(&self, item: &InventoryItem) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let slot = t
            .inventory
            .get_mut(&item.id)
            .ok_or_else(|| RepositoryError::not_found("Inventory item not found"))?;
        *slot = item.clone();
        Ok(())
    }

    async fn list(&self, low_stock_only: bool, page: PageRequest) -> RepoResult<Paginated<InventoryItem>> {
        let t = self.tables.read().await;
        let mut items: Vec<InventoryItem> = t
            .inventory
            .values()
            .filter(|i| !low_stock_only || i.is_low_stock)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.quantity.cmp(&b.quantity).then(a.variant.sku.cmp(&b.variant.sku)));
        Ok(paginate(items, page))
    }

    async fn release(&self, lines: &[StockLine]) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        super::orders::apply_stock(&mut t, lines, 1)
    }
}
