use crate::error::*;
use crate::trial::Strategy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// 一次试验过程中发生的事件
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TrialEvent {
    /// 试验开始
    Started { doors: u32, strategy: Strategy },

    /// 奖品已放入门内
    PrizePlaced { prize: u32 },

    /// 挑战者做出最初选择
    Chosen { chosen: u32 },

    /// 主持人开门
    Revealed {
        /// 被打开的门
        opened: Vec<u32>,

        /// 留给挑战者的另一扇门
        left: u32,
    },

    /// 挑战者按策略做出最终抉择
    Decided { strategy: Strategy, choice: u32 },

    /// 揭晓结果
    Finished { win: bool },
}

/// 试验事件的接收方
pub trait EventSink {
    /// 返回 `false` 时模拟过程不会构造任何事件
    fn enabled(&self) -> bool {
        true
    }

    fn record(&mut self, event: TrialEvent);
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl EventSink for Silent {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&mut self, _event: TrialEvent) {}
}

impl EventSink for Vec<TrialEvent> {
    fn record(&mut self, event: TrialEvent) {
        self.push(event);
    }
}

/// 打开的门超过这个数量时只输出数量
const MAX_LISTED_DOORS: usize = 16;

/// 把试验过程逐行写成文字
///
/// 第一次写入失败后不再写入，错误由 [`TextNarrator::finish`] 返回。
#[derive(Debug)]
pub struct TextNarrator<W> {
    writer: W,
    trials: u64,
    error: Option<io::Error>,
}

impl<W: Write> TextNarrator<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            trials: 0,
            error: None,
        }
    }

    /// 已经开始讲述的试验次数
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// 结束讲述，返回底层输出或第一次写入失败的错误
    pub fn finish(mut self) -> Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn line(&mut self, event: &TrialEvent) -> String {
        match event {
            TrialEvent::Started { doors, strategy } => {
                self.trials += 1;
                format!("第 {} 次试验：共 {} 扇门，策略为{}", self.trials, doors, strategy)
            }
            TrialEvent::PrizePlaced { prize } => format!("  奖品在 {} 号门后", prize),
            TrialEvent::Chosen { chosen } => format!("  挑战者选择了 {} 号门", chosen),
            TrialEvent::Revealed { opened, left } if opened.len() <= MAX_LISTED_DOORS => {
                let opened = opened
                    .iter()
                    .map(|door| door.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("  主持人打开了 [{}]，留下 {} 号门", opened, left)
            }
            TrialEvent::Revealed { opened, left } => {
                format!("  主持人打开了 {} 扇门，留下 {} 号门", opened.len(), left)
            }
            TrialEvent::Decided { strategy, choice } => {
                format!("  挑战者{}，最终打开 {} 号门", strategy, choice)
            }
            TrialEvent::Finished { win: true } => "  赢得奖品！".to_string(),
            TrialEvent::Finished { win: false } => "  未赢得奖品。".to_string(),
        }
    }
}

impl<W: Write> EventSink for TextNarrator<W> {
    fn enabled(&self) -> bool {
        self.error.is_none()
    }

    fn record(&mut self, event: TrialEvent) {
        if self.error.is_some() {
            return;
        }
        let line = self.line(&event);
        if let Err(e) = writeln!(self.writer, "{}", line) {
            tracing::warn!(error = %e, "failed to write narration, narration stopped");
            self.error = Some(e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::runner::{run_trials, Settings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn narrate(events: Vec<TrialEvent>) -> String {
        let mut narrator = TextNarrator::new(Vec::new());
        for event in events {
            narrator.record(event);
        }
        String::from_utf8(narrator.finish().unwrap()).unwrap()
    }

    #[test]
    fn narrates_a_trial() {
        let text = narrate(vec![
            TrialEvent::Started {
                doors: 3,
                strategy: Strategy::Switch,
            },
            TrialEvent::PrizePlaced { prize: 2 },
            TrialEvent::Chosen { chosen: 0 },
            TrialEvent::Revealed {
                opened: vec![1],
                left: 2,
            },
            TrialEvent::Decided {
                strategy: Strategy::Switch,
                choice: 2,
            },
            TrialEvent::Finished { win: true },
        ]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "第 1 次试验：共 3 扇门，策略为改变选择");
        assert_eq!(lines[3], "  主持人打开了 [1]，留下 2 号门");
        assert_eq!(lines[5], "  赢得奖品！");
    }

    #[test]
    fn long_reveals_are_summarized() {
        let text = narrate(vec![TrialEvent::Revealed {
            opened: (2..100).collect(),
            left: 1,
        }]);
        assert_eq!(text, "  主持人打开了 98 扇门，留下 1 号门\n");
    }

    #[test]
    fn counts_trials() {
        let mut narrator = TextNarrator::new(Vec::new());
        for _ in 0..3 {
            narrator.record(TrialEvent::Started {
                doors: 4,
                strategy: Strategy::Stay,
            });
        }
        assert_eq!(narrator.trials(), 3);
    }

    /// 每次写入都失败的输出，记录尝试写入的次数
    struct ClosedPipe(Rc<Cell<usize>>);

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.0.set(self.0.get() + 1);
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn stops_after_first_failed_write() {
        let attempts = Rc::new(Cell::new(0));
        let mut narrator = TextNarrator::new(ClosedPipe(attempts.clone()));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let tally = run_trials(Settings::new(3, 1000), &mut rng, &mut narrator);

        assert_eq!(tally.trials(), 1000);
        assert_eq!(attempts.get(), 1);
        assert_eq!(narrator.trials(), 1);
        assert!(!narrator.enabled());
        match narrator.finish() {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn silent_is_disabled() {
        assert!(!Silent.enabled());
        assert!(Vec::<TrialEvent>::new().enabled());
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_value(TrialEvent::Chosen { chosen: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "Chosen", "chosen": 4 }));
    }
}
