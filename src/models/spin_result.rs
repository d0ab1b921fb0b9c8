use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 抽奖历史记录
/// winner 为抽中时的名称快照，之后改名 / 删除选项不影响历史
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub id: String,
    pub winner: String,
    /// 动画结束、结果公布的时间
    pub time: DateTime<Utc>,
}

/// 中奖弹窗展示内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerReveal {
    pub name: String,
    /// 扣减后的剩余数量
    pub remaining: u32,
}

impl WinnerReveal {
    pub fn remaining_message(&self) -> Option<String> {
        (self.remaining > 0).then(|| format!("Remaining quantity: {}", self.remaining))
    }
}
