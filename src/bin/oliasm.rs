use clap::{AppSettings, Arg, Command};
use oligo_asm::file_reader;
use oligo_asm::file_writer;
use oligo_asm::overseer::Overseer;
use oligo_asm::parse_cmd_line;
use std::time::Instant;

//This makes statically compiled musl library
//much much faster. Set to default for x86 systems...
#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[allow(deprecated)]
fn main() {
    let input_options = "INPUT";
    let output_options = "OUTPUT";
    let alg_options = "ALGORITHM";
    let mandatory_options = "REQUIRED";
    let matches = Command::new("oliasm")
        .version("0.0.2")
        .setting(AppSettings::ArgRequiredElseHelp)
        .about("oliasm - assembles a sequence from oligos with uncertain positions.\n\nExample usage :\noliasm -i oligos.tsv -o assembly.tsv\n")
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .value_name("TSV FILE")
            .required(true)
            .help("Oligos, one per line: seq, position, position uncertainty, [batch], [base position]. May be gzipped.")
            .takes_value(true)
            .help_heading(mandatory_options)
            .display_order(1))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Output file. (default: oliasm_out.tsv)")
            .takes_value(true)
            .help_heading(output_options))
        .arg(Arg::new("gzip")
            .long("gzip")
            .help("Gzip the output file.")
            .help_heading(output_options))
        .arg(Arg::new("min_overlap")
            .long("min-overlap")
            .value_name("INT")
            .takes_value(true)
            .help("Minimum number of shared bases between neighbouring oligos. (default: 2)")
            .help_heading(alg_options))
        .arg(Arg::new("nscale")
            .long("nscale")
            .value_name("FLOAT")
            .takes_value(true)
            .help("Position intervals span nscale uncertainties around each measurement. (default: 1)")
            .help_heading(alg_options))
        .arg(Arg::new("with_reverse")
            .long("with-reverse")
            .help("Also link oligos through their reverse complement.")
            .help_heading(input_options))
        .arg(Arg::new("bias_min")
            .long("bias-min")
            .value_name("FLOAT")
            .takes_value(true)
            .allow_hyphen_values(true)
            .help("Lower bound on the bias of a batch. (default: -5)")
            .help_heading(alg_options))
        .arg(Arg::new("bias_max")
            .long("bias-max")
            .value_name("FLOAT")
            .takes_value(true)
            .allow_hyphen_values(true)
            .help("Upper bound on the bias of a batch. (default: 5)")
            .help_heading(alg_options))
        .arg(Arg::new("stretch_min")
            .long("stretch-min")
            .value_name("FLOAT")
            .takes_value(true)
            .help("Lower bound on the stretch of a batch. (default: 0.8)")
            .help_heading(alg_options))
        .arg(Arg::new("stretch_max")
            .long("stretch-max")
            .value_name("FLOAT")
            .takes_value(true)
            .help("Upper bound on the stretch of a batch. (default: 1.2)")
            .help_heading(alg_options))
        .arg(Arg::new("maxstack")
            .long("maxstack")
            .value_name("INT")
            .takes_value(true)
            .help("Maximum number of stacking iterations. (default: 100)")
            .help_heading(alg_options))
        .arg(Arg::new("epsilon")
            .short('e')
            .long("epsilon")
            .value_name("FLOAT")
            .takes_value(true)
            .help("Convergence threshold of the position optimizer. (default: 1e-6)")
            .help_heading(alg_options))
        .arg(Arg::new("n_starts")
            .long("n-starts")
            .value_name("INT")
            .takes_value(true)
            .help("Number of starting points of the position optimizer. (default: 1)")
            .help_heading(alg_options))
        .arg(Arg::new("seed")
            .long("seed")
            .value_name("INT")
            .takes_value(true)
            .help("Seed of the optimizer's random restarts. (default: 0)")
            .help_heading(alg_options))
        .arg(Arg::new("no_shuffle")
            .long("no-shuffle")
            .help("Do not try to reorder ambiguous groups of oligos.")
            .help_heading(alg_options))
        .arg(Arg::new("threads")
            .short('t')
            .long("threads")
            .value_name("INT")
            .takes_value(true)
            .help("Number of threads to use. (default: 10)"))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Debug mode."))
        .arg(Arg::new("trace")
            .long("trace")
            .help("Trace mode."))
        .get_matches();

    let start_t = Instant::now();
    let cli = match parse_cmd_line::parse_cmd_line(&matches) {
        Ok(cli) => cli,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let oligos = match file_reader::read_oligos_tsv(&cli.input) {
        Ok(oligos) => oligos,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let result = match Overseer::new(&oligos, cli.options.clone()).and_then(|overseer| overseer.run()) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    match &result.best_sequence {
        Some(seq) => log::info!("Best sequence: {}", seq),
        None => log::info!("No sequence could be assembled"),
    }

    if let Err(e) = file_writer::write_assembly(&cli.output, &result, cli.gzip) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Total time taken is {:?}", Instant::now() - start_t);
}
