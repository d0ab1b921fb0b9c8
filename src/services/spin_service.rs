use crate::config::SpinConfig;
use crate::error::AppResult;
use crate::models::{SpinResult, WinnerReveal};
use crate::services::{PendingSpin, SpinEngine, WheelStore};
use crate::tasks::ScheduledTask;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};

const EVENT_CAPACITY: usize = 16;

/// 推送给展示层的事件
#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    /// 开始转动，展示层据此播放动画
    SpinStarted { winner_index: usize, rotation: f64 },
    /// 动画结束，结果已记录
    SpinFinalized {
        result: SpinResult,
        reveal: Option<WinnerReveal>,
    },
    /// 每次结果公布后触发一次（彩带特效）
    Celebrate,
}

/// 已开始的一次抽奖，可等待其结果公布
pub struct SpinTicket {
    pub winner_index: usize,
    pub rotation: f64,
    task: ScheduledTask<SpinResult>,
}

impl SpinTicket {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn finished(self) -> AppResult<SpinResult> {
        self.task.join().await
    }
}

/// 抽奖流程：开始 → 等待动画时长 → 公布结果
#[derive(Clone)]
pub struct SpinService {
    store: Arc<Mutex<WheelStore>>,
    engine: SpinEngine,
    delay: Duration,
    events: broadcast::Sender<WheelEvent>,
}

impl SpinService {
    pub fn new(store: Arc<Mutex<WheelStore>>, config: &SpinConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            engine: SpinEngine::new(config),
            delay: Duration::from_millis(config.duration_ms),
            events,
        }
    }

    pub fn store(&self) -> Arc<Mutex<WheelStore>> {
        self.store.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WheelEvent> {
        self.events.subscribe()
    }

    /// 开始抽奖
    ///
    /// 逻辑:
    /// 1. 在持有状态锁时检查并设置进行中标记（进行中则拒绝）
    /// 2. 按数量加权抽取中奖项，计算新角度
    /// 3. 动画时长结束后扣减数量、记录历史、触发庆祝
    pub async fn initiate_spin(&self) -> AppResult<SpinTicket> {
        let pending = {
            let mut store = self.store.lock().await;
            store
                .begin_spin(&self.engine, &mut rand::rng())
                .inspect_err(|e| e.log())?
        };

        let _ = self.events.send(WheelEvent::SpinStarted {
            winner_index: pending.winner_index,
            rotation: pending.rotation,
        });

        let winner_index = pending.winner_index;
        let rotation = pending.rotation;
        let store = self.store.clone();
        let events = self.events.clone();
        let task = ScheduledTask::schedule(self.delay, move || finalize(store, events, pending));

        Ok(SpinTicket {
            winner_index,
            rotation,
            task,
        })
    }
}

async fn finalize(
    store: Arc<Mutex<WheelStore>>,
    events: broadcast::Sender<WheelEvent>,
    pending: PendingSpin,
) -> SpinResult {
    let (result, reveal) = {
        let mut store = store.lock().await;
        let result = store.finalize_spin(&pending);
        (result, store.winner().cloned())
    };

    // 没有订阅者时发送失败，忽略即可
    let _ = events.send(WheelEvent::SpinFinalized {
        result: result.clone(),
        reveal,
    });
    let _ = events.send(WheelEvent::Celebrate);
    result
}
