use crate::domain::error::DomainError;
use crate::domain::model::{Actor, Role, UserId, WarehouseId};

/// スタッフユーザーエンティティ
/// 役割と所属倉庫を持つ。認証そのものは外部コラボレーターの責務
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: Role,
    warehouse_id: Option<WarehouseId>,
    deleted: bool,
}

impl User {
    /// 新しいユーザーを作成
    pub fn new(
        id: UserId,
        name: String,
        email: String,
        role: Role,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "ユーザー名は空にできません".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            email,
            role,
            warehouse_id,
            deleted: false,
        })
    }

    /// データベースから取得したデータでユーザーを再構築
    pub fn reconstruct(
        id: UserId,
        name: String,
        email: String,
        role: Role,
        warehouse_id: Option<WarehouseId>,
        deleted: bool,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            warehouse_id,
            deleted,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn warehouse_id(&self) -> Option<WarehouseId> {
        self.warehouse_id
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// ユーザー情報を更新
    pub fn update(
        &mut self,
        name: String,
        email: String,
        role: Role,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "ユーザー名は空にできません".to_string(),
            ));
        }
        self.name = name;
        self.email = email;
        self.role = role;
        self.warehouse_id = warehouse_id;
        Ok(())
    }

    /// 論理削除する
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// このユーザーをワークフローの作業者として解決する
    /// 倉庫が割り当てられていないユーザーは在庫を動かす操作を実行できない
    pub fn as_actor(&self) -> Result<Actor, DomainError> {
        let warehouse_id = self.warehouse_id.ok_or_else(|| {
            DomainError::InvalidValue("作業者に倉庫が割り当てられていません".to_string())
        })?;
        Ok(Actor::new(self.id, self.role, warehouse_id))
    }
}
