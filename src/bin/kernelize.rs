use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};

use ::log::{LevelFilter, info};
use anyhow::Context;
use multicut::{log::build_logger_for_verbosity, prelude::*};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Reduces a multicut-in-trees instance to its kernel")]
struct Opt {
    /// Instance in JSON format; a random instance is generated if omitted
    #[structopt(short = "i", long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Number of nodes of the random instance
    #[structopt(long, default_value = "100")]
    nodes: NumNodes,

    /// Number of demand pairs of the random instance
    #[structopt(long, default_value = "30")]
    pairs: usize,

    #[structopt(long, default_value = "1")]
    seed: u64,

    /// Generate a caterpillar instead of a uniform random tree
    #[structopt(long)]
    caterpillar: bool,

    /// Budget; overrides the budget of the input file
    #[structopt(short = "k", long)]
    budget: Option<i64>,

    /// Preset (guo-niedermeier, guo-niedermeier-improved, guo-niedermeier-swap34, chen,
    /// bousquet) or a comma separated list of rules
    #[structopt(short = "r", long)]
    rules: Option<RuleSet>,

    /// Kernel configuration in JSON format; `--rules` takes precedence
    #[structopt(short = "c", long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[structopt(short = "o", long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Store the (possibly generated) input instance
    #[structopt(long, parse(from_os_str))]
    write_instance: Option<PathBuf>,

    /// Write the kernel tree in DOT format
    #[structopt(long, parse(from_os_str))]
    dot: Option<PathBuf>,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,
}

fn load_instance(opt: &Opt) -> anyhow::Result<MulticutInstance> {
    let mut instance = match &opt.input {
        Some(path) => MulticutInstance::try_read_json_file(path)
            .with_context(|| format!("cannot read instance {}", path.display()))?,
        None => {
            let mut rng = Pcg64Mcg::seed_from_u64(opt.seed);
            let budget = opt.budget.unwrap_or(opt.pairs as i64 / 2);
            if opt.caterpillar {
                MulticutInstance::random_caterpillar(&mut rng, opt.nodes, opt.pairs, budget)
            } else {
                MulticutInstance::random(&mut rng, opt.nodes, opt.pairs, budget)
            }
        }
    };

    if let Some(budget) = opt.budget {
        instance.budget = budget;
    }

    Ok(instance)
}

fn load_config(opt: &Opt) -> anyhow::Result<KernelConfig> {
    let mut config = match &opt.config {
        Some(path) => {
            let reader = BufReader::new(
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
            );
            serde_json::from_reader(reader)
                .with_context(|| format!("cannot parse config {}", path.display()))?
        }
        None => KernelConfig::default(),
    };

    if let Some(rules) = &opt.rules {
        config.rule_set = rules.clone();
    }

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    build_logger_for_verbosity(LevelFilter::Info, opt.verbose);

    let instance = load_instance(&opt)?;
    let config = load_config(&opt)?;

    if let Some(path) = &opt.write_instance {
        instance.try_write_json_file(path)?;
    }

    info!(
        "Kernelize with {}: n = {}, |P| = {}, k = {}",
        config.rule_set,
        instance.tree.number_of_nodes(),
        instance.demand_pairs.len(),
        instance.budget
    );

    let budget = instance.budget;
    let kernel = Kernelizer::from_config(instance.tree, &instance.demand_pairs, budget, &config)?
        .run()?;

    if let Some(path) = &opt.dot {
        let writer = BufWriter::new(File::create(path)?);
        kernel.tree.try_write_dot(writer, &[])?;
    }

    let report = KernelReport::new(&kernel, budget);
    match &opt.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            report.try_write_json(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            report.try_write_json(&mut writer)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
