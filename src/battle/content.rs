//! Static stage and enemy content.

use std::sync::OnceLock;

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub name_ja: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub exp_reward: u32,
    pub gold_reward: u32,
    /// Probability in [0, 1] that a victory mints a card.
    pub card_drop_rate: f64,
    /// Bosses can be defeated once and are never re-fought.
    pub is_boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Stage {
    pub id: u32,
    pub name: String,
    pub name_ja: String,
    pub description: String,
    pub required_level: u32,
    /// Card drops come from this topic.
    pub topic_code: String,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Enemy>,
}

struct EnemyRow(
    &'static str,
    &'static str,
    &'static str,
    u32,
    u32,
    u32,
    u32,
    u32,
    f64,
);

impl EnemyRow {
    fn build(self, is_boss: bool) -> Enemy {
        let EnemyRow(id, name, name_ja, hp, attack, defense, exp_reward, gold_reward, drop) = self;
        Enemy {
            id: id.to_string(),
            name: name.to_string(),
            name_ja: name_ja.to_string(),
            hp,
            attack,
            defense,
            exp_reward,
            gold_reward,
            card_drop_rate: drop,
            is_boss,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn stage(
    id: u32,
    name: &str,
    name_ja: &str,
    description: &str,
    required_level: u32,
    topic_code: &str,
    enemies: [EnemyRow; 2],
    boss: EnemyRow,
) -> Stage {
    Stage {
        id,
        name: name.to_string(),
        name_ja: name_ja.to_string(),
        description: description.to_string(),
        required_level,
        topic_code: topic_code.to_string(),
        enemies: enemies.into_iter().map(|e| e.build(false)).collect(),
        boss: Some(boss.build(true)),
    }
}

#[rustfmt::skip]
fn build_stages() -> Vec<Stage> {
    vec![
        stage(1, "Equity Arena", "株式投資のアリーナ", "株式評価の基礎を学ぶ", 1, "EQ",
            [
                EnemyRow("eq1", "P/E Slime", "PERスライム", 40, 6, 2, 15, 20, 0.7),
                EnemyRow("eq2", "Dividend Goblin", "配当ゴブリン", 50, 8, 3, 20, 25, 0.65),
            ],
            EnemyRow("eq_king", "Warren the Value King", "バリュー王ウォーレン", 150, 15, 8, 100, 150, 1.0)),
        stage(2, "Equity Tower", "株式評価の塔", "バリュエーションの深淵", 3, "EQ",
            [
                EnemyRow("eq3", "Valuation Golem", "バリュエーションゴーレム", 80, 12, 5, 35, 40, 0.55),
                EnemyRow("eq4", "DCF Phantom", "DCFファントム", 70, 14, 4, 30, 35, 0.6),
            ],
            EnemyRow("eq_dragon", "DCF Dragon", "DCF竜", 250, 22, 12, 180, 250, 1.0)),
        stage(3, "Ethics Forest", "倫理の森", "CFA倫理基準の基礎を学ぶ", 5, "ETH",
            [
                EnemyRow("eth1", "Compliance Goblin", "コンプラゴブリン", 60, 10, 4, 25, 30, 0.6),
                EnemyRow("eth2", "Ethics Slime", "倫理スライム", 45, 8, 3, 20, 25, 0.65),
            ],
            EnemyRow("eth_guardian", "Ethics Guardian", "倫理の守護者", 200, 18, 10, 150, 200, 1.0)),
        stage(4, "Quantitative Cave", "定量分析の洞窟", "数値と統計の迷宮", 7, "QM",
            [
                EnemyRow("qm1", "Statistics Golem", "統計ゴーレム", 90, 14, 6, 40, 50, 0.5),
                EnemyRow("qm2", "Probability Phantom", "確率ファントム", 75, 16, 5, 35, 45, 0.55),
            ],
            EnemyRow("qm_sigma", "Sigma Master", "シグママスター", 280, 25, 14, 200, 280, 1.0)),
        stage(5, "Economics Plains", "経済学の平原", "マクロ・ミクロ経済の戦場", 9, "ECON",
            [
                EnemyRow("econ1", "Inflation Dragon", "インフレドラゴン", 120, 18, 8, 50, 60, 0.45),
                EnemyRow("econ2", "Supply Demon", "供給デーモン", 90, 14, 6, 40, 50, 0.5),
            ],
            EnemyRow("econ_titan", "Central Bank Titan", "中央銀行の巨人", 350, 28, 16, 250, 350, 1.0)),
        stage(6, "Financial Statement Tower", "財務諸表の塔", "会計の迷宮を攻略せよ", 11, "FSA",
            [
                EnemyRow("fsa1", "Balance Sheet Beast", "BS獣", 150, 22, 10, 65, 80, 0.4),
                EnemyRow("fsa2", "Income Wraith", "PL亡霊", 110, 20, 7, 55, 70, 0.45),
            ],
            EnemyRow("fsa_emperor", "Audit Emperor", "監査皇帝", 420, 32, 18, 300, 420, 1.0)),
        stage(7, "Fixed Income Fortress", "債券の要塞", "金利と債券の城", 13, "FI",
            [
                EnemyRow("fi1", "Duration Dragon", "デュレーションドラゴン", 200, 26, 12, 80, 100, 0.35),
                EnemyRow("fi2", "Yield Hydra", "利回りヒドラ", 180, 24, 10, 70, 90, 0.4),
            ],
            EnemyRow("fi_king", "Bond King", "債券王", 500, 36, 20, 380, 500, 1.0)),
        stage(8, "Derivatives Dungeon", "デリバティブの地下牢", "オプションと先物の深淵", 15, "DER",
            [
                EnemyRow("der1", "Options Overlord", "オプション魔王", 250, 30, 14, 100, 130, 0.3),
                EnemyRow("der2", "Futures Fiend", "先物フィーンド", 220, 28, 12, 90, 120, 0.35),
            ],
            EnemyRow("der_demon", "Black-Scholes Demon", "ブラックショールズ魔神", 600, 42, 22, 450, 600, 1.0)),
        stage(9, "Portfolio Summit", "ポートフォリオの頂", "最終試練の地", 18, "PM",
            [
                EnemyRow("pm1", "CAPM Colossus", "CAPMコロッサス", 350, 38, 18, 130, 180, 0.25),
                EnemyRow("pm2", "Sharpe Sovereign", "シャープ皇帝", 400, 42, 20, 150, 200, 0.2),
            ],
            EnemyRow("pm_ultimate", "CFA Ultimate", "CFA究極体", 800, 50, 25, 600, 800, 1.0)),
    ]
}

/// All stages in unlock order.
pub fn stages() -> &'static [Stage] {
    static STAGES: OnceLock<Vec<Stage>> = OnceLock::new();
    STAGES.get_or_init(build_stages)
}

pub fn stage_by_id(stage_id: u32) -> Option<&'static Stage> {
    stages().iter().find(|s| s.id == stage_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_table_is_well_formed() {
        let all = stages();
        assert_eq!(all.len(), 9);
        for (i, s) in all.iter().enumerate() {
            assert_eq!(s.id as usize, i + 1);
            assert!(s.enemies.iter().all(|e| !e.is_boss));
            assert!(s.boss.as_ref().map_or(false, |b| b.is_boss));
        }
        let first = stage_by_id(1).unwrap();
        assert_eq!(first.enemies[0].exp_reward, 15);
        assert_eq!(first.enemies[0].card_drop_rate, 0.7);
        assert!(stage_by_id(10).is_none());
    }

    #[test]
    fn required_levels_increase() {
        let levels: Vec<u32> = stages().iter().map(|s| s.required_level).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }
}
