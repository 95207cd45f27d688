use crate::application::ApplicationError;
use crate::domain::model::{Product, ProductId, WarehouseId};
use crate::domain::port::{ProductRepository, StockRepository};
use std::sync::Arc;

/// 倉庫内の商品と手持ち数量の組
#[derive(Debug, Clone, PartialEq)]
pub struct ProductStock {
    pub product: Product,
    pub quantity: u32,
}

/// 在庫クエリサービス
/// 読み取り専用の在庫台帳操作を提供する
pub struct StockQueryService {
    stock_repository: Arc<dyn StockRepository>,
    product_repository: Arc<dyn ProductRepository>,
}

impl StockQueryService {
    /// 新しい在庫クエリサービスを作成
    pub fn new(
        stock_repository: Arc<dyn StockRepository>,
        product_repository: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            stock_repository,
            product_repository,
        }
    }

    /// (商品, 倉庫) の手持ち数量を取得
    /// 関連が存在しない場合は0
    pub async fn quantity_on_hand(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<u32, ApplicationError> {
        let entry = self.stock_repository.find(product_id, warehouse_id).await?;
        Ok(entry.map(|entry| entry.quantity()).unwrap_or(0))
    }

    /// 指定された倉庫にある商品を数量付きで取得
    /// 論理削除済みの商品は含まれない
    pub async fn products_in_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<ProductStock>, ApplicationError> {
        let entries = self.stock_repository.find_by_warehouse(warehouse_id).await?;

        let mut stocks = Vec::with_capacity(entries.len());
        for entry in entries {
            let product = self
                .product_repository
                .find_by_id(entry.product_id())
                .await?;
            if let Some(product) = product.filter(|product| !product.is_deleted()) {
                stocks.push(ProductStock {
                    product,
                    quantity: entry.quantity(),
                });
            }
        }

        Ok(stocks)
    }
}
