use serde::Serialize;

use super::{WheelOption, total_quantity};

/// 扇区配色，按选项下标循环使用
pub const WHEEL_COLORS: [&str; 6] = [
    "#01ff84", "#80ffc2", "#aaffd6", "#2ce1ff", "#72ebff", "#b9f5ff",
];

pub fn wheel_color(index: usize) -> &'static str {
    WHEEL_COLORS[index % WHEEL_COLORS.len()]
}

/// 单个选项在转盘上的扇区（角度制，0° 为三点钟方向，顺时针递增）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wedge {
    pub start_angle: f64,
    pub end_angle: f64,
    pub mid_angle: f64,
}

impl Wedge {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// SVG arc 的 large-arc-flag
    pub fn large_arc(&self) -> bool {
        self.sweep() > 180.0
    }
}

/// 按数量比例切分扇区；总数量为 0 时全部退化为 0°
pub fn wedges(options: &[WheelOption]) -> Vec<Wedge> {
    let total = total_quantity(options);
    let mut start = 0.0;
    options
        .iter()
        .map(|option| {
            let sweep = if total == 0 {
                0.0
            } else {
                f64::from(option.quantity) / total as f64 * 360.0
            };
            let wedge = Wedge {
                start_angle: start,
                end_angle: start + sweep,
                mid_angle: start + sweep / 2.0,
            };
            start += sweep;
            wedge
        })
        .collect()
}
