//! # Tween 模块
//!
//! 补间实体与其状态机。
//!
//! ## 状态转换
//!
//! ```text
//! Initialized ─start─► Scheduled ─advance─► Running ─advance(t≥1)─► PendingCompletion ─complete─► Finished
//!                          │                   │
//!                          └──────cancel───────┴──► Canceled
//! Initialized / Scheduled / Running ─terminate─► Terminated
//! ```
//!
//! `PendingCompletion` 表示最终值已写入、回调尚未执行。管理器先把这些补间移出活跃集合，
//! 再逐个调用 [`Tween::complete`]，回调里可以放心地启动新的补间。

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, trace};

use crate::binding::{ConflictKey, Slot, Target};
use crate::easing::Curve;
use crate::error::{StateError, TweenError, TweenResult};
use crate::fade::{check_curve, fade};
use crate::manager::{AnimationManager, WeakManager};
use crate::value::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// 补间身份
///
/// 进程内单调递增，只用于相等性判断和稳定的迭代顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TweenId(u64);

impl TweenId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始数值
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TweenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 补间生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenState {
    /// 已创建，尚未启动
    Initialized,
    /// 已启动，等待开始时间
    Scheduled,
    /// 正在插值
    Running,
    /// 最终值已写入，等待管理器完成
    PendingCompletion,
    /// 正常结束
    Finished,
    /// 被取消（不修改目标值）
    Canceled,
    /// 被强制结束（目标值直接设为结束值）
    Terminated,
}

impl TweenState {
    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Canceled | Self::Terminated)
    }

    /// 是否处于可被推进的状态
    pub fn is_active(self) -> bool {
        matches!(self, Self::Scheduled | Self::Running)
    }
}

/// 完成回调
///
/// 正常结束、取消、强制结束时都会调用，回调内可通过 [`Tween::state`] 区分。
pub type Callback = Box<dyn FnOnce(&Tween)>;

struct TweenInner {
    id: TweenId,
    slot: Slot,
    end: Value,
    duration: f32,
    curve: Curve,

    state: Cell<TweenState>,
    start_value: Cell<Option<Value>>,
    start_time: Cell<f32>,
    callback: RefCell<Option<Callback>>,
    manager: RefCell<Option<WeakManager>>,
}

/// 补间
///
/// 廉价克隆的句柄，克隆体指向同一个补间。
#[derive(Clone)]
pub struct Tween {
    inner: Rc<TweenInner>,
}

impl Tween {
    /// 基于已解析的槽位创建补间
    ///
    /// 负时长按 0 处理。倒数/对数曲线只接受标量结束值。
    pub fn new(slot: Slot, end: Value, duration: f32, curve: Curve) -> TweenResult<Self> {
        check_curve(curve, &end)?;
        let tween = Self {
            inner: Rc::new(TweenInner {
                id: TweenId::next(),
                slot,
                end,
                duration: duration.max(0.0),
                curve,
                state: Cell::new(TweenState::Initialized),
                start_value: Cell::new(None),
                start_time: Cell::new(0.0),
                callback: RefCell::new(None),
                manager: RefCell::new(None),
            }),
        };
        trace!(id = %tween.id(), key = %tween.conflict_key(), "补间已创建");
        Ok(tween)
    }

    /// 解析目标成员并创建补间
    pub fn animate(
        target: &Target,
        member: &str,
        end: Value,
        duration: f32,
        curve: Curve,
    ) -> TweenResult<Self> {
        let slot = Slot::resolve(target, member, None)?;
        Self::new(slot, end, duration, curve)
    }

    /// 解析目标序列成员中的单个元素并创建补间
    pub fn animate_element(
        target: &Target,
        member: &str,
        index: usize,
        end: Value,
        duration: f32,
        curve: Curve,
    ) -> TweenResult<Self> {
        let slot = Slot::resolve(target, member, Some(index))?;
        Self::new(slot, end, duration, curve)
    }

    // ========== 观察 ==========

    pub fn id(&self) -> TweenId {
        self.inner.id
    }

    pub fn state(&self) -> TweenState {
        self.inner.state.get()
    }

    /// 起始值，首次推进时才捕获
    pub fn start_value(&self) -> Option<Value> {
        self.inner.start_value.get()
    }

    pub fn end_value(&self) -> Value {
        self.inner.end
    }

    /// 计划开始时间（启动前为 0）
    pub fn start_time(&self) -> f32 {
        self.inner.start_time.get()
    }

    pub fn duration(&self) -> f32 {
        self.inner.duration
    }

    pub fn curve(&self) -> Curve {
        self.inner.curve
    }

    pub fn slot(&self) -> &Slot {
        &self.inner.slot
    }

    pub fn conflict_key(&self) -> &ConflictKey {
        self.inner.slot.conflict_key()
    }

    /// 归一化时间
    ///
    /// 未启动或尚未到开始时间为 0，终止状态为 1。
    pub fn progress(&self, now: f32) -> f32 {
        match self.state() {
            TweenState::Initialized => 0.0,
            TweenState::Scheduled | TweenState::Running => self.normalized_time(now).max(0.0),
            _ => 1.0,
        }
    }

    /// 是否与另一个句柄指向同一个补间
    pub fn ptr_eq(&self, other: &Tween) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 操作 ==========

    /// 启动补间
    ///
    /// 开始时间为管理器最近一次 tick 的时间加上 `delay`。
    /// 若已有补间作用于同一槽位，旧补间会先被取消。
    pub fn start(&self, manager: &AnimationManager, delay: f32) -> TweenResult<()> {
        self.schedule(manager, delay, None)
    }

    /// 启动补间并注册完成回调
    pub fn start_with_callback<F>(
        &self,
        manager: &AnimationManager,
        delay: f32,
        on_complete: F,
    ) -> TweenResult<()>
    where
        F: FnOnce(&Tween) + 'static,
    {
        self.schedule(manager, delay, Some(Box::new(on_complete)))
    }

    fn schedule(
        &self,
        manager: &AnimationManager,
        delay: f32,
        on_complete: Option<Callback>,
    ) -> TweenResult<()> {
        self.expect_state("start", &[TweenState::Initialized])?;

        self.inner.start_time.set(manager.now() + delay);
        *self.inner.callback.borrow_mut() = on_complete;
        *self.inner.manager.borrow_mut() = Some(manager.downgrade());
        self.transition(TweenState::Scheduled);

        debug!(
            id = %self.id(),
            key = %self.conflict_key(),
            start_time = self.start_time(),
            duration = self.duration(),
            curve = %self.curve(),
            "补间已启动"
        );
        manager.register(self)
    }

    /// 取消补间
    ///
    /// 目标值保持当前状态，随后调用回调。
    pub fn cancel(&self) -> TweenResult<()> {
        self.expect_state("cancel", &[TweenState::Scheduled, TweenState::Running])?;

        self.transition(TweenState::Canceled);
        self.detach();
        self.fire_callback();
        Ok(())
    }

    /// 强制结束
    ///
    /// 直接把结束值写入目标（不经过缓动），随后调用回调。
    pub fn terminate(&self) -> TweenResult<()> {
        self.expect_state(
            "terminate",
            &[
                TweenState::Initialized,
                TweenState::Scheduled,
                TweenState::Running,
            ],
        )?;

        self.inner.slot.set(self.inner.end)?;
        self.transition(TweenState::Terminated);
        self.detach();
        self.fire_callback();
        Ok(())
    }

    /// 推进到时间 `now`
    ///
    /// 尚未到开始时间时什么也不做。首次到达开始时间时捕获起始值。
    pub fn advance(&self, now: f32) -> TweenResult<()> {
        self.expect_state("advance", &[TweenState::Scheduled, TweenState::Running])?;

        if now < self.start_time() {
            return Ok(());
        }

        let start = match self.inner.start_value.get() {
            Some(start) => start,
            None => {
                let start = self.inner.slot.get(self.inner.end.kind())?;
                self.inner.start_value.set(Some(start));
                self.transition(TweenState::Running);
                start
            }
        };

        let t = self.normalized_time(now);
        let value = fade(&start, &self.inner.end, t, self.inner.curve)?;
        self.inner.slot.set(value)?;
        trace!(id = %self.id(), t, value = ?value, "补间推进");

        if t >= 1.0 {
            self.transition(TweenState::PendingCompletion);
        }
        Ok(())
    }

    /// 完成补间（由管理器调用）
    pub fn complete(&self) -> TweenResult<()> {
        self.expect_state("complete", &[TweenState::PendingCompletion])?;

        self.transition(TweenState::Finished);
        self.fire_callback();
        Ok(())
    }

    // ========== 内部 ==========

    fn normalized_time(&self, now: f32) -> f32 {
        if self.inner.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time()) / self.inner.duration).min(1.0)
    }

    fn expect_state(&self, operation: &'static str, allowed: &[TweenState]) -> TweenResult<()> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(TweenError::State(StateError::InvalidTransition {
                id: self.id().get(),
                operation,
                state,
            }))
        }
    }

    fn transition(&self, to: TweenState) {
        let from = self.inner.state.replace(to);
        trace!(id = %self.id(), ?from, ?to, "补间状态转换");
    }

    /// 从管理器注销
    fn detach(&self) {
        let manager = self.inner.manager.borrow().as_ref().and_then(WeakManager::upgrade);
        if let Some(manager) = manager {
            manager.deregister(self);
        }
    }

    /// 取出回调再调用，保证至多调用一次
    fn fire_callback(&self) {
        let callback = self.inner.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback(self);
        }
    }
}

impl PartialEq for Tween {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Tween {}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id())
            .field("slot", &self.inner.slot)
            .field("state", &self.state())
            .field("end", &self.inner.end)
            .field("duration", &self.inner.duration)
            .field("curve", &self.inner.curve)
            .finish()
    }
}
