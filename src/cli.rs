use clap::Parser;
use montyhall::*;
use std::io;
use tracing_subscriber::EnvFilter;

/// 蒙提霍尔问题模拟：比较坚持与改变选择在不同门数下的胜率
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// 每个门数配置下、每种策略的试验次数
    #[arg(short, long, default_value_t = DEFAULT_TRIALS)]
    trials: u32,

    /// 参与比较的门数，以逗号分隔
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_DOOR_COUNTS)]
    doors: Vec<u32>,

    /// 逐次讲述每一次试验的过程
    #[arg(short, long)]
    verbose: bool,

    /// 随机数种子，相同种子得到相同结果
    #[arg(short, long)]
    seed: Option<u64>,

    /// 以 JSON 输出结果，不能与 --verbose 同时使用
    #[arg(long, conflicts_with = "verbose")]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MONTYHALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("montyhall=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let experiment = Experiment::new(args.trials, args.doors, args.seed)?;

    let report = if args.verbose {
        let mut narrator = TextNarrator::new(io::stdout().lock());
        let report = experiment.run(&mut narrator);
        narrator.finish()?;
        report
    } else {
        experiment.run(&mut Silent)
    };

    // 结果输出到标准输出，日志输出到标准错误
    let stdout = io::stdout().lock();
    if args.json {
        JsonReport::new(stdout).publish(&report)?;
    } else {
        ConsoleReport::new(stdout).publish(&report)?;
    }

    Ok(())
}
