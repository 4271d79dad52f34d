//! # Curves 模块
//!
//! 缓动曲线采样表。

use tween_runtime::Curve;

/// 曲线名列宽
const NAME_WIDTH: usize = 24;

/// 在 [0, 1] 上等距取 `samples` 个点（至少两个端点）
pub fn sample_points(samples: usize) -> Vec<f32> {
    let n = samples.max(2);
    let last = (n - 1) as f32;
    (0..n).map(|i| i as f32 / last).collect()
}

/// 渲染全部曲线的缓动进度表
pub fn render_table(samples: usize) -> String {
    let points = sample_points(samples);

    let mut lines = Vec::with_capacity(Curve::ALL.len() + 1);
    let mut header = format!("{:<NAME_WIDTH$}", "curve");
    for t in &points {
        header.push_str(&format!("{t:>8.2}"));
    }
    lines.push(header);

    for curve in Curve::ALL {
        let mut row = format!("{:<NAME_WIDTH$}", curve.name());
        for &t in &points {
            row.push_str(&format!("{:>8.4}", curve.apply(t)));
        }
        lines.push(row);
    }

    lines.join("\n")
}
