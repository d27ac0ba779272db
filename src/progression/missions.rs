//! Daily missions: three per calendar day, drawn from five templates.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{DailyMission, DailyMissionState, MissionType};

pub const MISSIONS_PER_DAY: usize = 3;

struct MissionTemplate {
    mission_type: MissionType,
    name: &'static str,
    /// `{target}` is replaced with the chosen target.
    description: &'static str,
    targets: &'static [u32],
    gold_base: u32,
    exp_base: u32,
}

static TEMPLATES: [MissionTemplate; 5] = [
    MissionTemplate {
        mission_type: MissionType::BattleWins,
        name: "バトル勝利",
        description: "バトルに{target}回勝利する",
        targets: &[3, 5, 7],
        gold_base: 100,
        exp_base: 50,
    },
    MissionTemplate {
        mission_type: MissionType::QuizCorrect,
        name: "クイズマスター",
        description: "クイズに{target}回正解する",
        targets: &[5, 10, 15],
        gold_base: 80,
        exp_base: 40,
    },
    MissionTemplate {
        mission_type: MissionType::CardCollect,
        name: "カードコレクター",
        description: "カードを{target}枚獲得する",
        targets: &[2, 3, 5],
        gold_base: 150,
        exp_base: 75,
    },
    MissionTemplate {
        mission_type: MissionType::GoldEarn,
        name: "ゴールドハンター",
        description: "ゴールドを{target}G稼ぐ",
        targets: &[100, 200, 300],
        gold_base: 50,
        exp_base: 30,
    },
    MissionTemplate {
        mission_type: MissionType::BossDefeat,
        name: "ボスハンター",
        description: "ボスを{target}体倒す",
        targets: &[1],
        gold_base: 300,
        exp_base: 150,
    },
];

/// Three missions from distinct templates. Rewards scale with the target tier.
pub fn generate_daily<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<DailyMission> {
    TEMPLATES
        .choose_multiple(rng, MISSIONS_PER_DAY)
        .collect::<Vec<_>>()
        .into_iter()
        .enumerate()
        .map(|(index, template)| {
            let tier = match template.targets.len() {
                1 => 0,
                len => rng.gen_range(0..len),
            };
            let target = template.targets[tier];
            let difficulty = tier as u32 + 1;
            DailyMission {
                id: format!("daily_{}_{}", today.format("%Y%m%d"), index),
                mission_type: template.mission_type,
                name: template.name.to_string(),
                description: template
                    .description
                    .replace("{target}", &target.to_string()),
                target,
                current: 0,
                completed: false,
                claimed: false,
                reward_gold: template.gold_base * difficulty,
                reward_exp: template.exp_base * difficulty,
            }
        })
        .collect()
}

impl DailyMissionState {
    /// Replace the missions if they were generated on another day.
    /// Returns true when a new set was rolled.
    pub fn refresh_if_stale<R: Rng + ?Sized>(&mut self, today: NaiveDate, rng: &mut R) -> bool {
        if self.last_reset_date == Some(today) {
            return false;
        }
        self.missions = generate_daily(today, rng);
        self.last_reset_date = Some(today);
        log::info!("rolled daily missions for {}", today);
        true
    }

    /// Add `amount` to every open mission of `mission_type`, capped at its target.
    pub fn record_progress(&mut self, mission_type: MissionType, amount: u32) -> bool {
        let mut changed = false;
        for mission in self
            .missions
            .iter_mut()
            .filter(|m| m.mission_type == mission_type && !m.completed)
        {
            mission.current = mission.current.saturating_add(amount).min(mission.target);
            if mission.current >= mission.target {
                mission.completed = true;
                log::info!("mission {} completed", mission.id);
            }
            changed = true;
        }
        changed
    }

    /// Mark a completed mission claimed and return its `(gold, exp)` reward.
    /// `None` if it is missing, incomplete or already claimed.
    pub fn claim(&mut self, mission_id: &str) -> Option<(u32, u32)> {
        let mission = self
            .missions
            .iter_mut()
            .find(|m| m.id == mission_id && m.completed && !m.claimed)?;
        mission.claimed = true;
        self.total_completed += 1;
        Some((mission.reward_gold, mission.reward_exp))
    }
}
