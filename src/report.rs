use crate::error::*;
use crate::runner::{Report, Tally};
use crate::trial::Strategy;
use std::io::Write;

/// 实验结果的接收方
pub trait ResultsSink {
    fn publish(&mut self, report: &Report) -> Result<()>;
}

/// 以文字表格和字符折线图输出结果
#[derive(Debug)]
pub struct ConsoleReport<W> {
    writer: W,
    chart: Chart,
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            chart: Chart::default(),
        }
    }

    /// 取回底层输出
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn summary(&mut self, tally: &Tally) -> Result<()> {
        writeln!(self.writer, "\n{} 扇门：", tally.doors())?;
        writeln!(
            self.writer,
            "    改变选择赢得 {:5} 次，共 {} 次（胜率 {:.2}%）",
            tally.switch_wins(),
            tally.trials(),
            tally.win_percentage(Strategy::Switch)
        )?;
        writeln!(
            self.writer,
            "    坚持选择赢得 {:5} 次，共 {} 次（胜率 {:.2}%）",
            tally.stay_wins(),
            tally.trials(),
            tally.win_percentage(Strategy::Stay)
        )?;
        Ok(())
    }

    fn table(&mut self, tallies: &[Tally]) -> Result<()> {
        writeln!(
            self.writer,
            "\n{:>8} {:>10} {:>10} {:>9} {:>9} {:>9} {:>9}",
            "门数", "坚持赢", "改变赢", "坚持%", "改变%", "理论坚持%", "理论改变%"
        )?;
        for tally in tallies {
            writeln!(
                self.writer,
                "{:>10} {:>13} {:>13} {:>11.2} {:>11.2} {:>13.2} {:>13.2}",
                tally.doors(),
                tally.stay_wins(),
                tally.switch_wins(),
                tally.win_percentage(Strategy::Stay),
                tally.win_percentage(Strategy::Switch),
                tally.expected_percentage(Strategy::Stay),
                tally.expected_percentage(Strategy::Switch)
            )?;
        }
        Ok(())
    }
}

impl<W: Write> ResultsSink for ConsoleReport<W> {
    fn publish(&mut self, report: &Report) -> Result<()> {
        writeln!(
            self.writer,
            "实验 {}：每种策略进行 {} 次试验",
            report.id, report.trials
        )?;
        for tally in &report.tallies {
            self.summary(tally)?;
        }
        self.table(&report.tallies)?;

        writeln!(self.writer, "\n蒙提霍尔问题：坚持与改变选择的胜率（横轴为对数刻度）")?;
        let chart = self.chart.render(&report.tallies);
        self.writer.write_all(chart.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// 以 JSON 输出结果
#[derive(Debug)]
pub struct JsonReport<W> {
    writer: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 取回底层输出
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultsSink for JsonReport<W> {
    fn publish(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

const STAY_MARK: char = 'o';
const SWITCH_MARK: char = 'x';
const LINE_MARK: char = '.';

/// 胜率随门数变化的字符折线图，纵轴 0% 到 100%，横轴为门数的对数
#[derive(Debug, Clone, Copy)]
pub struct Chart {
    /// 绘图区宽度（列）
    pub width: usize,
    /// 绘图区高度（行）
    pub height: usize,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            width: 60,
            height: 21,
        }
    }
}

impl Chart {
    pub fn render(&self, tallies: &[Tally]) -> String {
        let width = self.width.max(2);
        let height = self.height.max(2);
        let mut grid = vec![vec![' '; width]; height];

        let (min, max) = tallies
            .iter()
            .map(|t| (t.doors() as f64).log10())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        let column = |doors: u32| -> usize {
            if max > min {
                let x = ((doors as f64).log10() - min) / (max - min);
                (x * (width - 1) as f64).round() as usize
            } else {
                width / 2
            }
        };
        let row = |percentage: f64| -> usize {
            let y = (100.0 - percentage.clamp(0.0, 100.0)) / 100.0;
            (y * (height - 1) as f64).round() as usize
        };

        let mut sorted: Vec<&Tally> = tallies.iter().collect();
        sorted.sort_by_key(|t| t.doors());

        for (strategy, mark) in [(Strategy::Stay, STAY_MARK), (Strategy::Switch, SWITCH_MARK)] {
            let points: Vec<(usize, f64)> = sorted
                .iter()
                .map(|t| (column(t.doors()), t.win_percentage(strategy)))
                .collect();

            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                for x in x0..=x1 {
                    let y = if x1 > x0 {
                        y0 + (y1 - y0) * (x - x0) as f64 / (x1 - x0) as f64
                    } else {
                        y0
                    };
                    let cell = &mut grid[row(y)][x];
                    if *cell == ' ' {
                        *cell = LINE_MARK;
                    }
                }
            }
            for &(x, y) in &points {
                grid[row(y)][x] = mark;
            }
        }

        let mut out = String::new();
        for (i, line) in grid.iter().enumerate() {
            let label = if i == 0 {
                "100%".to_string()
            } else if i == height - 1 {
                "0%".to_string()
            } else if i == (height - 1) / 2 && (height - 1) % 2 == 0 {
                "50%".to_string()
            } else {
                String::new()
            };
            out.push_str(&format!("{:>5} |", label));
            out.extend(line.iter());
            out.push('\n');
        }
        out.push_str(&format!("{:>5} +{}\n", "", "-".repeat(width)));

        let mut axis = vec![' '; width + 8];
        for t in &sorted {
            let label = t.doors().to_string();
            let start = column(t.doors()).min(width + 8 - label.len());
            for (offset, c) in label.chars().enumerate() {
                axis[start + offset] = c;
            }
        }
        out.push_str(&format!("{:>5}  {}\n", "", axis.iter().collect::<String>().trim_end()));
        out.push_str(&format!(
            "{:>5}  {} 坚持选择   {} 改变选择   （横轴：门数，对数刻度）\n",
            "", STAY_MARK, SWITCH_MARK
        ));
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::runner::Settings;
    use uuid::Uuid;

    fn report() -> Report {
        Report {
            id: Uuid::new_v4(),
            seed: Some(1),
            trials: 1000,
            tallies: vec![
                Tally::new(Settings::new(3, 1000), 334, 668),
                Tally::new(Settings::new(10, 1000), 98, 903),
                Tally::new(Settings::new(10000, 1000), 0, 1000),
            ],
        }
    }

    #[test]
    fn console_report_lists_every_configuration() {
        let report = report();
        let mut console = ConsoleReport::new(Vec::new());
        console.publish(&report).unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();

        assert!(text.contains(&report.id.to_string()));
        assert!(text.contains("改变选择赢得   668 次，共 1000 次（胜率 66.80%）"));
        assert!(text.contains("坚持选择赢得    98 次，共 1000 次（胜率 9.80%）"));
        assert!(text.contains("100.00"));
        assert!(text.contains("33.33"));
        assert!(text.contains("99.99"));
    }

    #[test]
    fn chart_heading_fits_any_door_count() {
        let mut report = report();
        report.tallies.retain(|t| t.doors() != 3);
        let mut console = ConsoleReport::new(Vec::new());
        console.publish(&report).unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();

        assert!(text.contains("蒙提霍尔问题：坚持与改变选择的胜率"));
        assert!(!text.contains("三门"));
    }

    #[test]
    fn chart_places_markers_on_log_axis() {
        let chart = Chart {
            width: 41,
            height: 11,
        };
        let text = chart.render(&report().tallies);
        let lines: Vec<&str> = text.lines().collect();

        // 11 行绘图区 + 横轴 + 刻度 + 图例
        assert_eq!(lines.len(), 14);
        let plot: Vec<Vec<char>> = lines[..11]
            .iter()
            .map(|line| line.chars().skip(7).collect())
            .collect();

        // 10000 扇门时改变选择的胜率是 100%，位于右上角
        assert_eq!(plot[0][40], SWITCH_MARK);
        // 10000 扇门时坚持选择的胜率是 0%，位于右下角
        assert_eq!(plot[10][40], STAY_MARK);
        // 3 扇门位于最左侧：66.8% 与 33.4%
        assert_eq!(plot[3][0], SWITCH_MARK);
        assert_eq!(plot[7][0], STAY_MARK);
        assert!(lines[0].starts_with(" 100% |"));
        assert!(lines[10].starts_with("   0% |"));
        assert!(lines[12].contains("10000"));
    }

    #[test]
    fn chart_with_single_configuration() {
        let tallies = [Tally::new(Settings::new(3, 10), 3, 7)];
        let text = Chart::default().render(&tallies);
        assert!(text.contains(SWITCH_MARK));
        assert!(text.contains(STAY_MARK));
    }

    #[test]
    fn json_report_round_trips() {
        let report = report();
        let mut json = JsonReport::new(Vec::new());
        json.publish(&report).unwrap();
        let parsed: Report = serde_json::from_slice(&json.into_inner()).unwrap();
        assert_eq!(parsed, report);
    }
}
