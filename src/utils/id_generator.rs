use uuid::Uuid;

/// 生成选项 / 历史记录 ID（UUID v4，不会复用）
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
