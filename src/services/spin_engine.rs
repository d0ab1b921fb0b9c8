use crate::config::{Alignment, SpinConfig};
use crate::error::{AppError, AppResult};
use crate::models::{WheelOption, total_quantity, wedges};
use rand::Rng;

/// 指针位于转盘正上方（0° 为三点钟方向，顺时针）
pub const POINTER_ANGLE: f64 = 270.0;

const FULL_TURN: f64 = 360.0;

/// 一次抽奖的计算结果：中奖下标与新的转盘角度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub winner_index: usize,
    pub rotation: f64,
}

#[derive(Debug, Clone)]
pub struct SpinEngine {
    full_turns: u32,
    alignment: Alignment,
}

impl SpinEngine {
    pub fn new(config: &SpinConfig) -> Self {
        Self {
            full_turns: config.full_turns,
            alignment: config.alignment,
        }
    }

    /// 按数量加权随机抽取，返回中奖下标
    /// 选项为空或总数量为 0 时拒绝抽奖
    pub fn select_winner<R: Rng>(
        &self,
        options: &[WheelOption],
        rng: &mut R,
    ) -> AppResult<usize> {
        if !options.iter().any(WheelOption::is_selectable) {
            return Err(AppError::NothingToSpin);
        }
        let draw = rng.random_range(0..total_quantity(options));
        select_winner_with_draw(options, draw)
    }

    /// 计算新的转盘角度（只增不减）
    pub fn rotation_for(&self, current: f64, winner_index: usize, options: &[WheelOption]) -> f64 {
        match self.alignment {
            Alignment::Uniform => {
                compute_rotation(current, winner_index, options.len(), self.full_turns)
            }
            Alignment::Weighted => {
                weighted_rotation(current, winner_index, options, self.full_turns)
            }
        }
    }

    pub fn plan<R: Rng>(
        &self,
        current: f64,
        options: &[WheelOption],
        rng: &mut R,
    ) -> AppResult<SpinPlan> {
        let winner_index = self.select_winner(options, rng)?;
        Ok(SpinPlan {
            winner_index,
            rotation: self.rotation_for(current, winner_index, options),
        })
    }
}

impl Default for SpinEngine {
    fn default() -> Self {
        Self::new(&SpinConfig::default())
    }
}

/// 给定抽取值 `draw ∈ [0, total)`，按列表顺序累加数量，
/// 第一个满足 `draw < 累计值` 的选项中奖
pub fn select_winner_with_draw(options: &[WheelOption], draw: u64) -> AppResult<usize> {
    let total = total_quantity(options);
    if total == 0 {
        return Err(AppError::NothingToSpin);
    }
    if draw >= total {
        return Err(AppError::InternalError(format!(
            "draw {draw} out of range 0..{total}"
        )));
    }

    let mut acc = 0u64;
    for (index, option) in options.iter().enumerate() {
        acc += u64::from(option.quantity);
        if draw < acc {
            return Ok(index);
        }
    }

    // draw < total 时不可达
    Err(AppError::InternalError("winner not found".into()))
}

/// 均分对齐：`current + 整圈 + (360 - 360 * index / count)`
pub fn compute_rotation(current: f64, winner_index: usize, option_count: usize, full_turns: u32) -> f64 {
    let turns = f64::from(full_turns) * FULL_TURN;
    if option_count == 0 {
        return current + turns;
    }
    let offset = FULL_TURN - FULL_TURN * winner_index as f64 / option_count as f64;
    current + turns + offset
}

/// 加权对齐：让中奖扇区的中点停在指针下
pub fn weighted_rotation(
    current: f64,
    winner_index: usize,
    options: &[WheelOption],
    full_turns: u32,
) -> f64 {
    let turns = f64::from(full_turns) * FULL_TURN;
    let Some(wedge) = wedges(options).get(winner_index).copied() else {
        return current + turns;
    };
    // 旋转 R 后扇区中点位于 mid + R，需满足 (mid + R) ≡ POINTER_ANGLE (mod 360)
    let target = (POINTER_ANGLE - wedge.mid_angle).rem_euclid(FULL_TURN);
    let delta = (target - current.rem_euclid(FULL_TURN)).rem_euclid(FULL_TURN);
    current + turns + delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn options(quantities: &[u32]) -> Vec<WheelOption> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| WheelOption {
                id: format!("id-{i}"),
                name: format!("Option {i}"),
                quantity,
            })
            .collect()
    }

    #[test]
    fn test_select_with_fixed_draw() {
        let list = options(&[3, 2, 5]);
        // 累计 3, 5, 10
        assert_eq!(select_winner_with_draw(&list, 4).unwrap(), 1);
        assert_eq!(select_winner_with_draw(&list, 0).unwrap(), 0);
        assert_eq!(select_winner_with_draw(&list, 2).unwrap(), 0);
        assert_eq!(select_winner_with_draw(&list, 3).unwrap(), 1);
        assert_eq!(select_winner_with_draw(&list, 5).unwrap(), 2);
        assert_eq!(select_winner_with_draw(&list, 9).unwrap(), 2);
        assert!(select_winner_with_draw(&list, 10).is_err());
    }

    #[test]
    fn test_zero_quantity_never_selected_for_any_draw() {
        let list = options(&[0, 2, 0, 1, 0]);
        for draw in 0..3 {
            let index = select_winner_with_draw(&list, draw).unwrap();
            assert!(list[index].quantity > 0, "draw {draw} picked {index}");
        }
    }

    #[test]
    fn test_nothing_to_spin() {
        let engine = SpinEngine::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            engine.select_winner(&[], &mut rng),
            Err(AppError::NothingToSpin)
        ));
        assert!(matches!(
            engine.select_winner(&options(&[0, 0]), &mut rng),
            Err(AppError::NothingToSpin)
        ));
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let engine = SpinEngine::default();
        let list = options(&[1, 3, 0, 6]);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let mut counts = [0u32; 4];
        for _ in 0..draws {
            counts[engine.select_winner(&list, &mut rng).unwrap()] += 1;
        }
        assert_eq!(counts[2], 0);
        for (i, option) in list.iter().enumerate() {
            let expected = f64::from(option.quantity) / 10.0;
            let observed = f64::from(counts[i]) / f64::from(draws);
            assert!(
                (observed - expected).abs() < 0.01,
                "option {i}: expected {expected}, observed {observed}"
            );
        }
    }

    #[test]
    fn test_uniform_rotation_formula() {
        assert_eq!(compute_rotation(0.0, 0, 4, 4), 1800.0);
        assert_eq!(compute_rotation(0.0, 1, 4, 4), 1710.0);
        assert_eq!(compute_rotation(100.0, 3, 4, 4), 100.0 + 1440.0 + 90.0);
    }

    #[test]
    fn test_rotation_is_monotonic_across_spins() {
        let list = options(&[5, 1, 1, 2]);
        for alignment in [Alignment::Uniform, Alignment::Weighted] {
            let engine = SpinEngine::new(&SpinConfig {
                alignment,
                ..Default::default()
            });
            let mut rng = StdRng::seed_from_u64(7);
            let mut rotation = 0.0;
            for _ in 0..200 {
                let plan = engine.plan(rotation, &list, &mut rng).unwrap();
                assert!(plan.rotation > rotation);
                assert!(plan.rotation - rotation >= 1440.0 - 1e-6);
                rotation = plan.rotation;
            }
        }
    }

    #[test]
    fn test_weighted_rotation_lands_on_wedge_midpoint() {
        let list = options(&[1, 1, 2]);
        let wedge_list = wedges(&list);
        let mut rotation = 0.0;
        for winner in [2, 0, 1, 1, 2] {
            rotation = weighted_rotation(rotation, winner, &list, 4);
            let landed = (wedge_list[winner].mid_angle + rotation).rem_euclid(360.0);
            assert!((landed - POINTER_ANGLE).abs() < 1e-9, "winner {winner}: {landed}");
        }
    }

    #[test]
    fn test_weighted_rotation_exact_values() {
        let list = options(&[1, 1, 2]);
        // 扇区 2 中点恰为 270°，无需额外偏移
        assert_eq!(weighted_rotation(0.0, 2, &list, 4), 1440.0);
        // 扇区 0 中点 45°，需 225°
        assert_eq!(weighted_rotation(1440.0, 0, &list, 4), 3105.0);
    }
}
