//! 任务访问控制
//!
//! 只看两个身份字段：创建者（owner）和被指派人（assignee）。
//! owner 可以查看、修改、删除、完成；assignee 只能查看和完成。

use crate::db::TaskOwnership;

pub fn can_view(actor_id: i64, task: TaskOwnership) -> bool {
    actor_id == task.created_by || task.assigned_to == Some(actor_id)
}

pub fn can_mutate(actor_id: i64, task: TaskOwnership) -> bool {
    actor_id == task.created_by
}

pub fn can_complete(actor_id: i64, task: TaskOwnership) -> bool {
    can_view(actor_id, task)
}
