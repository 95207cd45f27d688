use crate::domain::error::DomainError;
use crate::domain::model::WarehouseId;

/// 倉庫エンティティ
#[derive(Debug, Clone, PartialEq)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    deleted: bool,
}

impl Warehouse {
    /// 新しい倉庫を作成
    pub fn new(id: WarehouseId, name: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "倉庫名は空にできません".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            deleted: false,
        })
    }

    /// データベースから取得したデータで倉庫を再構築
    pub fn reconstruct(id: WarehouseId, name: String, deleted: bool) -> Self {
        Self { id, name, deleted }
    }

    pub fn id(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// 倉庫名を変更
    pub fn rename(&mut self, name: String) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "倉庫名は空にできません".to_string(),
            ));
        }
        self.name = name;
        Ok(())
    }

    /// 論理削除する（無効化）
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

    #[test]
    fn test_warehouse_creation() {
        let warehouse = Warehouse::new(WarehouseId::new(), "東京第1倉庫".to_string()).unwrap();
        assert_eq!(warehouse.name(), "東京第1倉庫");
        assert!(!warehouse.is_deleted());
    }

    #[test]
    fn test_warehouse_empty_name_fails() {
        assert!(Warehouse::new(WarehouseId::new(), "".to_string()).is_err());
    }

    #[test]
    fn test_warehouse_soft_delete_and_restore() {
        let mut warehouse = Warehouse::new(WarehouseId::new(), "東京第1倉庫".to_string()).unwrap();
        warehouse.mark_deleted();
        assert!(warehouse.is_deleted());
        warehouse.restore();
        assert!(!warehouse.is_deleted());
    }
}
