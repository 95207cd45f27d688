use crate::domain::error::DomainError;
use crate::domain::model::CategoryId;

/// カテゴリエンティティ
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    /// 新しいカテゴリを作成
    pub fn new(id: CategoryId, name: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "カテゴリ名は空にできません".to_string(),
            ));
        }
        Ok(Self { id, name })
    }

    /// データベースから取得したデータでカテゴリを再構築
    pub fn reconstruct(id: CategoryId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// カテゴリ名を変更
    pub fn rename(&mut self, name: String) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "カテゴリ名は空にできません".to_string(),
            ));
        }
        self.name = name;
        Ok(())
    }
}
