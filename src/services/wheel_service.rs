use crate::config::StorageConfig;
use crate::database::SharedStorage;
use crate::error::{AppError, AppResult};
use crate::models::{OptionDraft, SpinResult, WheelOption, WinnerReveal, total_quantity};
use crate::services::SpinEngine;
use crate::utils::generate_id;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 已开始、等待动画结束的一次抽奖
/// 中奖选项的 id 与名称在开始时快照
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpin {
    pub winner_index: usize,
    pub winner_id: String,
    pub winner_name: String,
    pub rotation: f64,
}

/// 转盘状态（选项、历史、输入框 / 确认框等交互状态）
/// 所有修改都经由此处：先写入新快照，写入成功后才替换内存状态，
/// 因此返回 Err 时状态保持不变
pub struct WheelStore {
    storage: SharedStorage,
    options_key: String,
    history_key: String,
    options: Vec<WheelOption>,
    history: Vec<SpinResult>,
    draft: OptionDraft,
    editing_id: Option<String>,
    pending_option_delete: Option<String>,
    pending_history_delete: Option<String>,
    rotation: f64,
    spinning: bool,
    winner: Option<WinnerReveal>,
    winner_dialog_open: bool,
}

impl WheelStore {
    pub fn new(storage: SharedStorage, config: &StorageConfig) -> Self {
        Self {
            storage,
            options_key: config.options_key.clone(),
            history_key: config.history_key.clone(),
            options: Vec::new(),
            history: Vec::new(),
            draft: OptionDraft::default(),
            editing_id: None,
            pending_option_delete: None,
            pending_history_delete: None,
            rotation: 0.0,
            spinning: false,
            winner: None,
            winner_dialog_open: false,
        }
    }

    /// 从存储恢复；数据缺失或损坏时对应集合为空
    pub fn load(storage: SharedStorage, config: &StorageConfig) -> Self {
        let mut store = Self::new(storage, config);
        store.options = store.read_snapshot(&store.options_key);
        store.history = store.read_snapshot(&store.history_key);
        log::info!(
            "Wheel restored: {} options, {} history entries",
            store.options.len(),
            store.history.len()
        );
        store
    }

    /// 整体快照写入；空集合跳过，避免覆盖已有数据
    pub fn save(&self) -> AppResult<()> {
        self.write_snapshot(&self.options_key, &self.options)?;
        self.write_snapshot(&self.history_key, &self.history)
    }

    // -----------------------------
    // 读取
    // -----------------------------

    pub fn options(&self) -> &[WheelOption] {
        &self.options
    }

    pub fn option(&self, id: &str) -> Option<&WheelOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn history(&self) -> &[SpinResult] {
        &self.history
    }

    /// 侧边栏按时间倒序展示
    pub fn history_newest_first(&self) -> impl Iterator<Item = &SpinResult> {
        self.history.iter().rev()
    }

    pub fn total_quantity(&self) -> u64 {
        total_quantity(&self.options)
    }

    pub fn draft(&self) -> &OptionDraft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn pending_option_delete(&self) -> Option<&str> {
        self.pending_option_delete.as_deref()
    }

    pub fn pending_history_delete(&self) -> Option<&str> {
        self.pending_history_delete.as_deref()
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn winner(&self) -> Option<&WinnerReveal> {
        self.winner.as_ref()
    }

    pub fn winner_dialog_open(&self) -> bool {
        self.winner_dialog_open
    }

    pub fn dismiss_winner(&mut self) {
        self.winner_dialog_open = false;
    }

    // -----------------------------
    // 选项
    // -----------------------------

    pub fn set_draft_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_draft_quantity(&mut self, quantity: u32) {
        self.draft.set_quantity(quantity);
    }

    pub fn submit_draft(&mut self) -> AppResult<WheelOption> {
        let OptionDraft { name, quantity } = self.draft.clone();
        self.add_option(&name, quantity)
    }

    /// 新增选项（名称去空白后不能为空且不能与现有选项重名）
    pub fn add_option(&mut self, name: &str, quantity: u32) -> AppResult<WheelOption> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Option name is empty".into()));
        }
        if self.options.iter().any(|o| o.name == name) {
            return Err(AppError::ValidationError(format!(
                "Option {name:?} already exists"
            )));
        }

        let option = WheelOption {
            id: generate_id(),
            name: name.to_string(),
            quantity,
        };
        let mut options = self.options.clone();
        options.push(option.clone());
        self.write_snapshot(&self.options_key, &options)?;

        self.options = options;
        self.draft.clear();
        log::debug!("Option added: {} ({})", option.name, option.quantity);
        Ok(option)
    }

    pub fn begin_edit(&mut self, id: &str) -> AppResult<()> {
        if self.option(id).is_none() {
            return Err(AppError::NotFound(format!("option {id}")));
        }
        self.editing_id = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    /// 原地修改名称与数量
    /// 不重新校验重名（与新增不同），但名称仍不能为空
    pub fn update_option(&mut self, id: &str, name: &str, quantity: u32) -> AppResult<()> {
        self.editing_id = None;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Option name is empty".into()));
        }
        let mut options = self.options.clone();
        let option = options
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound(format!("option {id}")))?;
        option.name = name.to_string();
        option.quantity = quantity;
        self.write_snapshot(&self.options_key, &options)?;
        self.options = options;
        Ok(())
    }

    pub fn request_delete_option(&mut self, id: &str) {
        self.pending_option_delete = Some(id.to_string());
    }

    pub fn cancel_delete_option(&mut self) {
        self.pending_option_delete = None;
    }

    /// 确认删除待删除的选项
    pub fn confirm_delete_option(&mut self) -> AppResult<WheelOption> {
        let id = self
            .pending_option_delete
            .take()
            .ok_or_else(|| AppError::ValidationError("No option deletion pending".into()))?;
        self.delete_option(&id)
    }

    pub fn delete_option(&mut self, id: &str) -> AppResult<WheelOption> {
        let index = self
            .options
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound(format!("option {id}")))?;
        let mut options = self.options.clone();
        let removed = options.remove(index);
        self.write_snapshot(&self.options_key, &options)?;

        self.options = options;
        log::debug!("Option deleted: {}", removed.name);
        Ok(removed)
    }

    // -----------------------------
    // 抽奖
    // -----------------------------

    /// 开始一次抽奖：检查并设置进行中标记，计算中奖项与新角度
    pub fn begin_spin<R: Rng>(&mut self, engine: &SpinEngine, rng: &mut R) -> AppResult<PendingSpin> {
        if self.spinning {
            return Err(AppError::SpinInProgress);
        }
        let plan = engine.plan(self.rotation, &self.options, rng)?;
        let winner = &self.options[plan.winner_index];
        let pending = PendingSpin {
            winner_index: plan.winner_index,
            winner_id: winner.id.clone(),
            winner_name: winner.name.clone(),
            rotation: plan.rotation,
        };

        self.spinning = true;
        self.winner = None;
        self.winner_dialog_open = false;
        self.rotation = plan.rotation;
        log::debug!(
            "Spin started: winner index {} rotation {}",
            pending.winner_index,
            pending.rotation
        );
        Ok(pending)
    }

    /// 动画结束后公布结果：清除进行中标记、扣减数量、追加历史、打开中奖弹窗
    /// 在动画期间被删除的选项不会恢复，历史仍记录开始时的名称
    /// 写入失败只记录日志，内存状态仍以本次结果为准
    pub fn finalize_spin(&mut self, pending: &PendingSpin) -> SpinResult {
        let staged = self.stage_spin_result(&pending.winner_id, &pending.winner_name);
        let entry = self.commit_spin_result(staged);
        self.spinning = false;
        self.winner_dialog_open = true;
        if self.save().is_err() {
            // 下一次成功的写入会带上本次结果
            log::warn!("Spin result for {} kept in memory only", entry.winner);
        }
        entry
    }

    /// 记录中奖：数量减 1（最低为 0），追加历史
    pub fn record_spin(&mut self, winner_id: &str) -> AppResult<SpinResult> {
        let name = self
            .option(winner_id)
            .map(|o| o.name.clone())
            .ok_or_else(|| AppError::NotFound(format!("option {winner_id}")))?;
        let staged = self.stage_spin_result(winner_id, &name);
        self.write_snapshot(&self.options_key, &staged.options)?;
        if let Err(e) = self.write_snapshot(&self.history_key, &staged.history) {
            // 尽力恢复已写入的选项快照，失败时同样只能记录日志
            if self.write_snapshot(&self.options_key, &self.options).is_err() {
                log::error!("Options snapshot and history are out of sync");
            }
            return Err(e);
        }
        Ok(self.commit_spin_result(staged))
    }

    fn stage_spin_result(&self, winner_id: &str, winner_name: &str) -> StagedSpin {
        let mut options = self.options.clone();
        let remaining = match options.iter_mut().find(|o| o.id == winner_id) {
            Some(option) => {
                option.quantity = option.quantity.saturating_sub(1);
                option.quantity
            }
            None => {
                log::warn!("Winner {winner_name} was removed before the spin finished");
                0
            }
        };

        let entry = SpinResult {
            id: generate_id(),
            winner: winner_name.to_string(),
            time: Utc::now(),
        };
        let mut history = self.history.clone();
        history.push(entry.clone());
        StagedSpin {
            options,
            history,
            entry,
            reveal: WinnerReveal {
                name: winner_name.to_string(),
                remaining,
            },
        }
    }

    fn commit_spin_result(&mut self, staged: StagedSpin) -> SpinResult {
        let StagedSpin {
            options,
            history,
            entry,
            reveal,
        } = staged;
        log::info!(
            "Spin finished: {} (remaining {})",
            reveal.name,
            reveal.remaining
        );
        self.options = options;
        self.history = history;
        self.winner = Some(reveal);
        entry
    }

    // -----------------------------
    // 历史
    // -----------------------------

    pub fn request_delete_history(&mut self, id: &str) {
        self.pending_history_delete = Some(id.to_string());
    }

    pub fn cancel_delete_history(&mut self) {
        self.pending_history_delete = None;
    }

    pub fn confirm_delete_history(&mut self) -> AppResult<SpinResult> {
        let id = self
            .pending_history_delete
            .take()
            .ok_or_else(|| AppError::ValidationError("No history deletion pending".into()))?;
        self.delete_history_entry(&id)
    }

    pub fn delete_history_entry(&mut self, id: &str) -> AppResult<SpinResult> {
        let index = self
            .history
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| AppError::NotFound(format!("history entry {id}")))?;
        let mut history = self.history.clone();
        let removed = history.remove(index);
        self.write_snapshot(&self.history_key, &history)?;
        self.history = history;
        Ok(removed)
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    /// 空集合跳过，避免覆盖已有数据
    fn write_snapshot<T: Serialize>(&self, key: &str, items: &[T]) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let json = serde_json::to_string(items)?;
        self.storage.set(key, &json).inspect_err(|e| e.log())
    }

    /// 逐条解析，无法解析的条目跳过并记录日志
    fn read_snapshot<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read {key}, starting empty: {e}");
                return Vec::new();
            }
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Malformed data under {key}, starting empty: {e}");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value(entry)
                    .inspect_err(|e| log::warn!("Skipping entry {index} under {key}: {e}"))
                    .ok()
            })
            .collect()
    }
}

/// 已计算但尚未写入的一次中奖结果
struct StagedSpin {
    options: Vec<WheelOption>,
    history: Vec<SpinResult>,
    entry: SpinResult,
    reveal: WinnerReveal,
}
