use clap::{Parser, Subcommand};
use hmmtrellis::{
    prelude::*,
    trellis::mocks::{mock_general_model, mock_random_model, mock_random_sequence},
    utils::timer,
};

#[derive(Parser, Debug)]
#[clap(author, about, version)]
struct Opts {
    #[clap(subcommand)]
    command: Commands,
}

/// Parameters of the generated model and sequence
#[derive(clap::Args, Debug)]
struct MockOpts {
    /// Number of states
    #[clap(short = 'n', default_value_t = 20)]
    n_states: usize,
    /// Number of symbols
    #[clap(short = 'a', default_value_t = 4)]
    n_symbols: usize,
    /// Length of the sequence
    #[clap(short = 'l', default_value_t = 1000)]
    length: usize,
    /// Probability that a transition is defined
    #[clap(short = 'd', default_value_t = 0.3)]
    density: f64,
    /// Use a model with context emissions and positional transitions
    #[clap(long)]
    general: bool,
    /// Seed of the random model and sequence
    #[clap(short = 's', default_value_t = 0)]
    seed: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the backward algorithm once
    Run {
        #[clap(flatten)]
        mock: MockOpts,
        /// reference, pruned, general or auto
        #[clap(short = 'm', long, default_value_t = Mode::Auto)]
        mode: Mode,
        /// Compute the states of a position in parallel (reference only)
        #[clap(long)]
        parallel: bool,
        /// Print the whole table
        #[clap(long)]
        print_table: bool,
        /// Read BackwardConfig from a json file instead of mode/parallel
        #[clap(long)]
        config: Option<std::path::PathBuf>,
    },
    /// Run every mode and compare the tables with the reference
    Compare {
        #[clap(flatten)]
        mock: MockOpts,
    },
}

fn generate(opts: &MockOpts) -> (HmmModel, EncodedSequence) {
    let model = if opts.general {
        mock_general_model(opts.n_states, opts.n_symbols, opts.seed)
    } else {
        mock_random_model(opts.n_states, opts.n_symbols, opts.density, opts.seed)
    };
    let seq = mock_random_sequence(opts.length, opts.n_symbols, opts.seed);
    (model, seq)
}

fn load_config(path: &std::path::Path) -> std::result::Result<BackwardConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# n_threads={}", rayon::current_num_threads());
    println!("# opts={:?}", opts);
    match &opts.command {
        Commands::Run {
            mock,
            mode,
            parallel,
            print_table,
            config,
        } => {
            let config = match config {
                Some(path) => match load_config(path) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("cannot load config {}", e);
                        std::process::exit(2);
                    }
                },
                None => BackwardConfig::new(*mode).parallel(*parallel),
            };
            let (model, seq) = generate(mock);
            println!(
                "# n_states={} n_edges={} basic={}",
                model.n_states(),
                model.n_edges(),
                model.is_basic()
            );
            let (r, t) = timer(|| compute_backward(&model, &seq, &config));
            match r {
                Ok(output) => {
                    if *print_table {
                        print!("{}", output);
                    }
                    println!(
                        "mode={}\tdense={}\tp={}\tt={}",
                        config.mode,
                        output.is_dense(),
                        output.ending_posterior(),
                        t
                    );
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Compare { mock } => {
            let (model, seq) = generate(mock);
            let (reference, t) = timer(|| {
                compute_backward(&model, &seq, &BackwardConfig::new(Mode::Reference))
            });
            let reference = match reference {
                Ok(reference) => reference,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            println!(
                "mode=reference\tp={}\tt={}",
                reference.ending_posterior(),
                t
            );
            for mode in [Mode::Pruned, Mode::General] {
                let (r, t) = timer(|| compute_backward(&model, &seq, &BackwardConfig::new(mode)));
                match r {
                    Ok(output) => println!(
                        "mode={}\tp={}\tt={}\tdiff={}",
                        mode,
                        output.ending_posterior(),
                        t,
                        reference.max_log_diff(&output)
                    ),
                    Err(e) => println!("mode={}\terror={}", mode, e),
                }
            }
        }
    }
    println!("# finished_at={}", chrono::Local::now());
}
