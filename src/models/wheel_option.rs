use serde::{Deserialize, Deserializer, Serialize};

/// 转盘选项
/// - quantity: 权重（剩余数量），被抽中概率 = quantity / 总数量；为 0 时仍展示但不会被抽中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelOption {
    /// 创建时分配，之后不变
    pub id: String,
    /// 展示名称（创建时去除首尾空白）
    pub name: String,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: u32,
}

/// 浏览器端编辑框留空时会存成 `null`（NaN），负数 / 小数同样可能出现
/// 统一归一为非负整数，无效值视为 0
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    })
}

impl WheelOption {
    pub fn is_selectable(&self) -> bool {
        self.quantity > 0
    }
}

/// 新增选项输入框的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub name: String,
    pub quantity: u32,
}

impl OptionDraft {
    pub const MIN_QUANTITY: u32 = 1;

    /// 数量输入框最小值为 1
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(Self::MIN_QUANTITY);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Default for OptionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: Self::MIN_QUANTITY,
        }
    }
}

/// 选项总数量（抽奖分母）
pub fn total_quantity(options: &[WheelOption]) -> u64 {
    options.iter().map(|o| u64::from(o.quantity)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(name: &str, quantity: u32) -> WheelOption {
        WheelOption {
            id: name.to_lowercase(),
            name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_total_quantity() {
        let options = vec![option("Red", 3), option("Blue", 0), option("Green", 5)];
        assert_eq!(total_quantity(&options), 8);
        assert_eq!(total_quantity(&[]), 0);
        assert!(!options[1].is_selectable());
    }

    #[test]
    fn test_draft_quantity_is_clamped() {
        let mut draft = OptionDraft::default();
        draft.set_quantity(0);
        assert_eq!(draft.quantity, 1);
        draft.set_quantity(7);
        draft.name = "Red".into();
        draft.clear();
        assert_eq!(draft, OptionDraft::default());
    }

    #[test]
    fn test_quantity_deserializes_leniently() {
        let parse = |quantity: &str| {
            let json = format!(r#"{{"id":"1","name":"Red","quantity":{quantity}}}"#);
            serde_json::from_str::<WheelOption>(&json).unwrap().quantity
        };
        assert_eq!(parse("4"), 4);
        assert_eq!(parse("null"), 0);
        assert_eq!(parse("-3"), 0);
        assert_eq!(parse("2.7"), 2);
        assert!(serde_json::from_str::<WheelOption>(r#"{"id":"1","name":"Red","quantity":"x"}"#).is_err());
    }

    #[test]
    fn test_option_json_shape() {
        let json = serde_json::to_value(option("Red", 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "red", "name": "Red", "quantity": 2 })
        );
    }
}
