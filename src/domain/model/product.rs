use crate::domain::error::DomainError;
use crate::domain::model::{CategoryId, Money, ProductId};

/// 商品エンティティ
/// 論理削除フラグを持ち、カテゴリと多対多で関連する。
/// 倉庫ごとの数量は商品の属性ではなく在庫台帳（StockEntry）が持つ
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    unit_price: Money,
    category_ids: Vec<CategoryId>,
    deleted: bool,
}

impl Product {
    /// 新しい商品を作成
    pub fn new(
        id: ProductId,
        name: String,
        description: String,
        unit_price: Money,
        category_ids: Vec<CategoryId>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "商品名は空にできません".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            description,
            unit_price,
            category_ids,
            deleted: false,
        })
    }

    /// データベースから取得したデータで商品を再構築
    pub fn reconstruct(
        id: ProductId,
        name: String,
        description: String,
        unit_price: Money,
        category_ids: Vec<CategoryId>,
        deleted: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            unit_price,
            category_ids,
            deleted,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// 商品情報を更新
    pub fn update(
        &mut self,
        name: String,
        description: String,
        unit_price: Money,
    ) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "商品名は空にできません".to_string(),
            ));
        }
        self.name = name;
        self.description = description;
        self.unit_price = unit_price;
        Ok(())
    }

    /// カテゴリの割り当てを置き換える
    pub fn set_categories(&mut self, category_ids: Vec<CategoryId>) {
        self.category_ids = category_ids;
    }

    /// 論理削除する
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// 論理削除を取り消す
    pub fn restore(&mut self) {
        self.deleted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_creation() {
        let product = Product::new(
            ProductId::new(),
            "ボルトM8".to_string(),
            "八角ボルト 8mm".to_string(),
            Money::new(dec!(5.00)),
            vec![CategoryId::new()],
        )
        .unwrap();

        assert_eq!(product.name(), "ボルトM8");
        assert!(!product.is_deleted());
        assert_eq!(product.category_ids().len(), 1);
    }

    #[test]
    fn test_product_empty_name_fails() {
        let result = Product::new(
            ProductId::new(),
            "  ".to_string(),
            String::new(),
            Money::new(dec!(5.00)),
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_product_soft_delete_and_restore() {
        let mut product = Product::new(
            ProductId::new(),
            "ボルトM8".to_string(),
            String::new(),
            Money::new(dec!(5.00)),
            Vec::new(),
        )
        .unwrap();

        product.mark_deleted();
        assert!(product.is_deleted());

        product.restore();
        assert!(!product.is_deleted());
    }
}
