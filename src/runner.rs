use crate::error::*;
use crate::narration::EventSink;
use crate::trial::{simulate, Strategy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, trace};
use uuid::Uuid;

/// 默认参与比较的门数
pub const DEFAULT_DOOR_COUNTS: [u32; 3] = [3, 10, 10000];

/// 默认每种策略的试验次数
pub const DEFAULT_TRIALS: u32 = 10000;

/// 单个门数配置的设置
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub struct Settings {
    /// 门数
    pub doors: u32,

    /// 每种策略的试验次数
    pub trials: u32,
}

impl Settings {
    pub fn new(doors: u32, trials: u32) -> Self {
        Self { doors, trials }
    }

    /// 检查门数至少为 3、试验次数至少为 1
    pub fn validate(&self) -> Result<()> {
        if self.doors < 3 {
            return Err(Error::InvalidDoorCount { doors: self.doors });
        }
        if self.trials == 0 {
            return Err(Error::InvalidTrialCount);
        }
        Ok(())
    }
}

/// 一个门数配置下两种策略的统计结果
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub struct Tally {
    /// 设置
    settings: Settings,
    /// 坚持选择后赢的次数
    stay_wins: u32,
    /// 改变选择后赢的次数
    switch_wins: u32,
}

impl Tally {
    pub fn new(settings: Settings, stay_wins: u32, switch_wins: u32) -> Self {
        Self {
            settings,
            stay_wins,
            switch_wins,
        }
    }

    /// 设置
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// 门数
    pub fn doors(&self) -> u32 {
        self.settings.doors
    }

    /// 每种策略的试验次数
    pub fn trials(&self) -> u32 {
        self.settings.trials
    }

    /// 坚持选择后赢的次数
    pub fn stay_wins(&self) -> u32 {
        self.stay_wins
    }

    /// 改变选择后赢的次数
    pub fn switch_wins(&self) -> u32 {
        self.switch_wins
    }

    /// 指定策略赢的次数
    pub fn wins(&self, strategy: Strategy) -> u32 {
        match strategy {
            Strategy::Switch => self.switch_wins,
            Strategy::Stay => self.stay_wins,
        }
    }

    /// 胜率（百分比）
    pub fn win_percentage(&self, strategy: Strategy) -> f64 {
        self.wins(strategy) as f64 * 100.0 / self.settings.trials as f64
    }

    /// 理论胜率（百分比）：坚持为 1/N，改变为 (N-1)/N
    pub fn expected_percentage(&self, strategy: Strategy) -> f64 {
        let doors = self.settings.doors as f64;
        match strategy {
            Strategy::Switch => (doors - 1.0) * 100.0 / doors,
            Strategy::Stay => 100.0 / doors,
        }
    }
}

/// 在同一个门数配置下分别以两种策略各进行 `trials` 次独立试验
///
/// 先进行全部改变选择的试验，再进行全部坚持选择的试验，两组试验不共享随机抽样，
/// 因此两个胜场数之和不必等于 `trials`。
pub fn run_trials<R, S>(settings: Settings, rng: &mut R, sink: &mut S) -> Tally
where
    R: Rng + ?Sized,
    S: EventSink + ?Sized,
{
    let mut play = |strategy| {
        let mut wins = 0;
        for _ in 0..settings.trials {
            let trial = simulate(settings.doors, strategy, rng, sink);
            trace!(?trial, "trial finished");
            if trial.win() {
                wins += 1;
            }
        }
        wins
    };

    let switch_wins = play(Strategy::Switch);
    let stay_wins = play(Strategy::Stay);
    Tally::new(settings, stay_wins, switch_wins)
}

/// 一次完整实验：对多个门数配置分别统计两种策略的胜率
#[derive(Debug, Clone)]
pub struct Experiment {
    id: Uuid,
    trials: u32,
    door_counts: Vec<u32>,
    seed: Option<u64>,
}

impl Experiment {
    /// 创建实验，任一门数配置不合法时返回错误
    pub fn new(trials: u32, door_counts: Vec<u32>, seed: Option<u64>) -> Result<Self> {
        if door_counts.is_empty() {
            return Err(Error::NoDoorCounts);
        }
        for &doors in &door_counts {
            Settings::new(doors, trials).validate()?;
        }

        Ok(Self {
            id: Uuid::new_v4(),
            trials,
            door_counts,
            seed,
        })
    }

    /// 实验 ID
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// 每种策略的试验次数
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// 参与比较的门数
    pub fn door_counts(&self) -> &[u32] {
        &self.door_counts
    }

    /// 随机数种子
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// 依次运行每个门数配置，整个实验共用一个随机数发生器
    pub fn run<S>(&self, sink: &mut S) -> Report
    where
        S: EventSink + ?Sized,
    {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        info!(
            id = %self.id,
            trials = self.trials,
            configs = self.door_counts.len(),
            seed = ?self.seed,
            "simulating {} trials per strategy",
            self.trials
        );

        let tallies = self
            .door_counts
            .iter()
            .map(|&doors| {
                let _span = info_span!("doors", doors).entered();
                let tally = run_trials(Settings::new(doors, self.trials), &mut rng, sink);
                debug!(
                    stay_wins = tally.stay_wins(),
                    switch_wins = tally.switch_wins(),
                    "configuration finished"
                );
                tally
            })
            .collect();

        Report {
            id: self.id,
            seed: self.seed,
            trials: self.trials,
            tallies,
        }
    }
}

/// 一次实验的全部结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Report {
    /// 实验 ID
    pub id: Uuid,
    /// 随机数种子
    pub seed: Option<u64>,
    /// 每种策略的试验次数
    pub trials: u32,
    /// 按请求顺序排列的各门数配置结果
    pub tallies: Vec<Tally>,
}
