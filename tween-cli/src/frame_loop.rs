//! # FrameLoop 模块
//!
//! 固定步长的帧驱动器：每帧调用一次 [`AnimationManager::tick`]。
//!
//! 帧时间按 `起始时间 + frame * step` 计算而不是逐帧累加，保证时间单调且不积累误差。
//! 起始时间取管理器当前时钟，已推进过的管理器可以继续驱动。

use serde::Serialize;
use tracing::{debug, info};
use tween_runtime::{AnimationManager, TweenResult};

use crate::config::CliConfig;

/// 运行结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// 已执行的帧数
    pub frames: u64,
    /// 最后一帧的时间
    pub final_time: f32,
    /// 是否所有补间都已结束
    pub drained: bool,
    /// 结束时仍活跃的补间数量
    pub remaining: usize,
}

/// 帧驱动器
pub struct FrameLoop {
    manager: AnimationManager,
    step: f32,
    max_duration: f32,
}

impl FrameLoop {
    pub fn new(manager: AnimationManager, config: &CliConfig) -> Self {
        Self {
            manager,
            step: config.frame_step(),
            max_duration: config.max_duration,
        }
    }

    pub fn manager(&self) -> &AnimationManager {
        &self.manager
    }

    /// 运行直到所有补间结束，或本次运行超过最长模拟时间
    ///
    /// `on_frame` 在每帧 tick 之后调用，参数为帧序号和帧时间。
    pub fn run(&self, mut on_frame: impl FnMut(u64, f32)) -> TweenResult<RunReport> {
        let origin = self.manager.now();
        let deadline = origin + self.max_duration;
        let mut frames = 0u64;
        let mut time = origin;

        while !self.manager.is_empty() && time < deadline {
            frames += 1;
            time = origin + (frames as f32 * self.step).min(self.max_duration);
            self.manager.tick(time)?;
            on_frame(frames, time);
        }

        let report = RunReport {
            frames,
            final_time: time,
            drained: self.manager.is_empty(),
            remaining: self.manager.active_count(),
        };

        if report.drained {
            info!(frames, time, "所有补间已结束");
        } else {
            debug!(frames, time, remaining = report.remaining, "达到最长模拟时间");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tween_runtime::{Animatable, Curve, Member, Target, Tween, Value};

    struct Dial(Cell<f32>);

    impl Animatable for Dial {
        fn has_property(&self, name: &str) -> bool {
            name == "angle"
        }

        fn get_property(&self, _name: &str) -> Option<Member> {
            Some(Member::Value(Value::Scalar(self.0.get())))
        }

        fn set_property(&self, _name: &str, value: Member) -> bool {
            match value {
                Member::Value(Value::Scalar(v)) => {
                    self.0.set(v);
                    true
                }
                _ => false,
            }
        }
    }

    fn config(fps: u32, max_duration: f32) -> CliConfig {
        CliConfig {
            fps,
            max_duration,
            ..CliConfig::default()
        }
    }

    #[test]
    fn test_empty_manager_runs_no_frames() {
        let frame_loop = FrameLoop::new(AnimationManager::new(), &CliConfig::default());
        let report = frame_loop.run(|_, _| {}).unwrap();

        assert_eq!(report.frames, 0);
        assert!(report.drained);
    }

    #[test]
    fn test_runs_until_drained() {
        let manager = AnimationManager::new();
        let dial = Rc::new(Dial(Cell::new(0.0)));
        let tween = Tween::animate(
            &Target::object(dial.clone()),
            "angle",
            Value::Scalar(90.0),
            0.5,
            Curve::Linear,
        )
        .unwrap();
        tween.start(&manager, 0.0).unwrap();

        let frame_loop = FrameLoop::new(manager, &config(4, 10.0));
        let mut times = Vec::new();
        let report = frame_loop.run(|_, t| times.push(t)).unwrap();

        assert_eq!(times, vec![0.25, 0.5]);
        assert_eq!(report.frames, 2);
        assert!(report.drained);
        assert_eq!(dial.0.get(), 90.0);
    }

    #[test]
    fn test_continues_from_manager_clock() {
        let manager = AnimationManager::new();
        manager.tick(5.0).unwrap();
        let dial = Rc::new(Dial(Cell::new(0.0)));
        let tween = Tween::animate(
            &Target::object(dial.clone()),
            "angle",
            Value::Scalar(10.0),
            0.5,
            Curve::Linear,
        )
        .unwrap();
        tween.start(&manager, 0.0).unwrap();

        let frame_loop = FrameLoop::new(manager, &config(4, 10.0));
        let mut times = Vec::new();
        let report = frame_loop.run(|_, t| times.push(t)).unwrap();

        // 帧时间从管理器当前时钟继续，不回退
        assert_eq!(times, vec![5.25, 5.5]);
        assert_eq!(report.final_time, 5.5);
        assert!(report.drained);
        assert_eq!(dial.0.get(), 10.0);
    }

    #[test]
    fn test_stops_at_max_duration() {
        let manager = AnimationManager::new();
        let dial = Rc::new(Dial(Cell::new(0.0)));
        let tween = Tween::animate(
            &Target::object(dial.clone()),
            "angle",
            Value::Scalar(1.0),
            100.0,
            Curve::Linear,
        )
        .unwrap();
        tween.start(&manager, 0.0).unwrap();

        let frame_loop = FrameLoop::new(manager, &config(10, 1.0));
        let report = frame_loop.run(|_, _| {}).unwrap();

        assert!(!report.drained);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.final_time, 1.0);
        assert_eq!(report.frames, 10);
    }
}
