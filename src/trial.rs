use crate::narration::{EventSink, TrialEvent};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 挑战者的最终策略
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// 改变选择
    Switch,

    /// 坚持选择
    Stay,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Switch => f.write_str("改变选择"),
            Strategy::Stay => f.write_str("坚持选择"),
        }
    }
}

/// 一次试验的结果
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub struct Trial {
    /// 奖品所在门序号
    prize: u32,

    /// 挑战者最初选择的门序号
    chosen: u32,

    /// 主持人开门后留下的另一扇门
    left: u32,

    /// 挑战者的策略
    strategy: Strategy,

    /// 是否赢得奖品
    win: bool,
}

impl Trial {
    /// 奖品所在门序号
    pub fn prize(&self) -> u32 {
        self.prize
    }

    /// 挑战者最初选择的门序号
    pub fn chosen(&self) -> u32 {
        self.chosen
    }

    /// 主持人开门后留下的另一扇门
    pub fn left(&self) -> u32 {
        self.left
    }

    /// 挑战者的策略
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// 挑战者最终打开的门
    pub fn final_choice(&self) -> u32 {
        match self.strategy {
            Strategy::Switch => self.left,
            Strategy::Stay => self.chosen,
        }
    }

    /// 是否赢得奖品
    pub fn win(&self) -> bool {
        self.win
    }
}

/// 主持人开门的结果
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Reveal {
    /// 被打开的门，按打开顺序排列
    pub opened: Vec<u32>,

    /// 除挑战者选择的门之外，仍然关闭的那扇门
    pub left: u32,
}

/// 进行一次随机试验
///
/// 奖品位置与挑战者的选择相互独立且均匀随机；主持人打开 `doors - 2` 扇既没有奖品、
/// 也不是挑战者所选的门。`doors` 小于 3 时直接 panic。
pub fn simulate<R, S>(doors: u32, strategy: Strategy, rng: &mut R, sink: &mut S) -> Trial
where
    R: Rng + ?Sized,
    S: EventSink + ?Sized,
{
    assert!(doors >= 3, "doors = {}, at least 3 doors are required", doors);

    let narrate = sink.enabled();
    if narrate {
        sink.record(TrialEvent::Started { doors, strategy });
    }

    let prize = rng.gen_range(0..doors);
    let chosen = rng.gen_range(0..doors);
    if narrate {
        sink.record(TrialEvent::PrizePlaced { prize });
        sink.record(TrialEvent::Chosen { chosen });
    }

    let Reveal { opened, left } = host_reveal(doors, prize, chosen, rng);
    if narrate {
        sink.record(TrialEvent::Revealed { opened, left });
    }

    let trial = Trial {
        prize,
        chosen,
        left,
        strategy,
        win: match strategy {
            Strategy::Switch => left == prize,
            Strategy::Stay => chosen == prize,
        },
    };

    if narrate {
        sink.record(TrialEvent::Decided {
            strategy,
            choice: trial.final_choice(),
        });
        sink.record(TrialEvent::Finished { win: trial.win });
    }

    trial
}

/// 主持人开门，直到只剩两扇门关闭
///
/// 可打开的门是除 `prize` 与 `chosen` 之外的所有门，从中不放回地随机抽取
/// `doors - 2` 扇打开。`prize == chosen` 时剩下的那扇门在其余门中均匀分布。
pub fn host_reveal<R>(doors: u32, prize: u32, chosen: u32, rng: &mut R) -> Reveal
where
    R: Rng + ?Sized,
{
    assert!(
        doors >= 3 && prize < doors && chosen < doors,
        "doors = {}, prize = {}, chosen = {}",
        doors,
        prize,
        chosen
    );

    let candidates: Vec<u32> = (0..doors)
        .filter(|&door| door != prize && door != chosen)
        .collect();
    let opened: Vec<u32> = index::sample(rng, candidates.len(), (doors - 2) as usize)
        .into_iter()
        .map(|i| candidates[i])
        .collect();

    let mut closed = vec![true; doors as usize];
    for &door in &opened {
        closed[door as usize] = false;
    }
    let remaining: Vec<u32> = (0..doors).filter(|&door| closed[door as usize]).collect();

    // 开门结束后必须恰好剩两扇门，且其中之一是挑战者选择的门
    let left = match *remaining.as_slice() {
        [a, b] if a == chosen => b,
        [a, b] if b == chosen => a,
        _ => panic!(
            "host left {:?} closed, chosen = {}, prize = {}",
            remaining, chosen, prize
        ),
    };

    Reveal { opened, left }
}
