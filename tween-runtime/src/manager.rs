//! # Manager 模块
//!
//! 帧驱动的补间管理器。
//!
//! 管理器持有当前活跃的补间（按冲突标识索引），每帧由宿主调用一次 [`AnimationManager::tick`]。
//! 每帧分两遍处理：
//! 1. 推进所有活跃补间，收集进入 `PendingCompletion` 的补间
//! 2. 遍历结束后把收集到的补间移出活跃集合，再依次完成（调用回调）
//!
//! 回调里启动的新补间（包括与正在处理的补间冲突的）不会破坏本帧的遍历。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use crate::binding::ConflictKey;
use crate::error::TweenResult;
use crate::tween::{Tween, TweenState};

#[derive(Default)]
struct ManagerState {
    active: RefCell<HashMap<ConflictKey, Tween>>,
    now: Cell<f32>,
}

/// 补间管理器
///
/// 廉价克隆的句柄。由宿主显式创建，并传给 [`Tween::start`]。
#[derive(Clone, Default)]
pub struct AnimationManager {
    state: Rc<ManagerState>,
}

/// 补间持有的管理器弱引用，避免补间与管理器互相持有
#[derive(Clone)]
pub(crate) struct WeakManager(Weak<ManagerState>);

impl WeakManager {
    pub(crate) fn upgrade(&self) -> Option<AnimationManager> {
        self.0.upgrade().map(|state| AnimationManager { state })
    }
}

impl AnimationManager {
    /// 创建管理器，时间从 0 开始
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建管理器，时钟从 `now` 开始
    ///
    /// 宿主时钟不从 0 开始时使用：首帧之前启动的补间以 `now` 为基准计算开始时间。
    pub fn with_time(now: f32) -> Self {
        let manager = Self::default();
        manager.state.now.set(now);
        manager
    }

    pub(crate) fn downgrade(&self) -> WeakManager {
        WeakManager(Rc::downgrade(&self.state))
    }

    /// 最近一次 tick 的时间
    pub fn now(&self) -> f32 {
        self.state.now.get()
    }

    /// 活跃补间数量
    pub fn active_count(&self) -> usize {
        self.state.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.active.borrow().is_empty()
    }

    /// 该槽位上是否有活跃补间
    pub fn is_animating(&self, key: &ConflictKey) -> bool {
        self.state.active.borrow().contains_key(key)
    }

    /// 该槽位上的活跃补间
    pub fn active(&self, key: &ConflictKey) -> Option<Tween> {
        self.state.active.borrow().get(key).cloned()
    }

    /// 注册补间
    ///
    /// 同一槽位上已有其他补间时先让出槽位：仍在推进的旧补间被取消，
    /// 上一帧中止时遗留的 `PendingCompletion` 补间直接完成。旧补间的回调同步执行；
    /// 回调里又占用同一槽位的补间同样被让出，最终登记的总是本次注册的补间。
    /// 若本补间在回调里被取消，则不再登记。
    pub fn register(&self, tween: &Tween) -> TweenResult<()> {
        let key = tween.conflict_key().clone();

        while let Some(existing) = self.take_occupant(&key, tween) {
            debug!(
                key = %key,
                old = %existing.id(),
                new = %tween.id(),
                state = ?existing.state(),
                "槽位冲突，让出旧补间"
            );
            match existing.state() {
                TweenState::Scheduled | TweenState::Running => existing.cancel()?,
                TweenState::PendingCompletion => existing.complete()?,
                _ => {}
            }
        }

        if tween.state() == TweenState::Scheduled {
            self.state.active.borrow_mut().insert(key, tween.clone());
        }
        Ok(())
    }

    /// 移出槽位上登记的其他补间
    fn take_occupant(&self, key: &ConflictKey, tween: &Tween) -> Option<Tween> {
        let mut active = self.state.active.borrow_mut();
        let occupied = active.get(key).is_some_and(|existing| !existing.ptr_eq(tween));
        if occupied { active.remove(key) } else { None }
    }

    /// 注销补间
    ///
    /// 只有当槽位上登记的正是这个补间时才移除，否则什么也不做。
    pub fn deregister(&self, tween: &Tween) {
        let mut active = self.state.active.borrow_mut();
        let key = tween.conflict_key();
        if active.get(key).is_some_and(|stored| stored.ptr_eq(tween)) {
            active.remove(key);
        }
    }

    /// 推进一帧
    ///
    /// `now` 必须单调不减。任一补间出错时，该补间被移出活跃集合，本帧中止并返回错误；
    /// 本帧已写入最终值的补间留到下一帧完成。
    pub fn tick(&self, now: f32) -> TweenResult<()> {
        self.state.now.set(now);

        let mut snapshot: Vec<Tween> = self.state.active.borrow().values().cloned().collect();
        snapshot.sort_by_key(Tween::id);

        // 第一遍：推进
        let mut finished = Vec::new();
        for tween in snapshot {
            match tween.state() {
                TweenState::Scheduled | TweenState::Running => {
                    if let Err(e) = tween.advance(now) {
                        error!(id = %tween.id(), key = %tween.conflict_key(), error = %e, "补间推进失败");
                        self.deregister(&tween);
                        return Err(e);
                    }
                    if tween.state() == TweenState::PendingCompletion {
                        finished.push(tween);
                    }
                }
                // 上一帧中止时遗留
                TweenState::PendingCompletion => finished.push(tween),
                _ => {}
            }
        }

        // 第二遍：先全部移出，再完成
        for tween in &finished {
            self.deregister(tween);
        }
        for tween in &finished {
            debug!(id = %tween.id(), key = %tween.conflict_key(), "补间完成");
            if let Err(e) = tween.complete() {
                error!(id = %tween.id(), error = %e, "补间完成失败");
                return Err(e);
            }
        }

        Ok(())
    }

    /// 取消全部活跃补间
    pub fn cancel_all(&self) -> TweenResult<()> {
        for tween in self.drain_sorted() {
            if tween.state().is_active() {
                tween.cancel()?;
            }
        }
        Ok(())
    }

    /// 强制结束全部活跃补间（目标值直接设为结束值）
    pub fn terminate_all(&self) -> TweenResult<()> {
        for tween in self.drain_sorted() {
            match tween.state() {
                TweenState::Scheduled | TweenState::Running => tween.terminate()?,
                TweenState::PendingCompletion => tween.complete()?,
                _ => {}
            }
        }
        Ok(())
    }

    fn drain_sorted(&self) -> Vec<Tween> {
        let mut tweens: Vec<Tween> = self
            .state
            .active
            .borrow_mut()
            .drain()
            .map(|(_, tween)| tween)
            .collect();
        tweens.sort_by_key(Tween::id);
        tweens
    }
}

impl std::fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationManager")
            .field("now", &self.now())
            .field("active", &self.active_count())
            .finish()
    }
}
