use crate::errors::AsmError;
use crate::types_structs::{Bounds, Options};
use clap::ArgMatches;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub input: String,
    pub output: String,
    pub gzip: bool,
    pub num_threads: usize,
    pub options: Options,
}

fn parse_value<T: FromStr>(matches: &ArgMatches, name: &'static str, default: T) -> Result<T, AsmError> {
    match matches.value_of(name) {
        None => Ok(default),
        Some(val) => val.parse::<T>().map_err(|_| AsmError::InvalidOption {
            name,
            reason: format!("could not parse {:?}", val),
        }),
    }
}

pub fn init_logger(matches: &ArgMatches) {
    // Set up our logger if the user passed the debug flag
    let level = if matches.is_present("trace") {
        log::LevelFilter::Trace
    } else if matches.is_present("debug") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if simple_logger::SimpleLogger::new().with_level(level).init().is_err() {
        eprintln!("Logger was already initialized");
    }
}

pub fn parse_cmd_line(matches: &ArgMatches) -> Result<CliOptions, AsmError> {
    init_logger(matches);

    let input = matches.value_of("input").unwrap_or("").to_string();
    let output = matches.value_of("output").unwrap_or("oliasm_out.tsv").to_string();
    let gzip = matches.is_present("gzip");
    let num_threads = parse_value::<usize>(matches, "threads", 10)?;
    if num_threads == 0 {
        return Err(AsmError::InvalidOption {
            name: "threads",
            reason: "number of threads must be a positive integer".to_string(),
        });
    }

    let defaults = Options::default();
    let min_overlap = parse_value(matches, "min_overlap", defaults.graph.min_overlap)?;
    let nscale = parse_value(matches, "nscale", defaults.graph.nscale)?;
    let mut options = defaults.with_overlap(min_overlap, nscale);

    options.graph.with_reverse = matches.is_present("with_reverse");
    options.shuffle = !matches.is_present("no_shuffle");
    options.scaler.maxstack = parse_value(matches, "maxstack", options.scaler.maxstack)?;
    options.scaler.bbias = Bounds::new(
        parse_value(matches, "bias_min", options.scaler.bbias.lower)?,
        parse_value(matches, "bias_max", options.scaler.bbias.upper)?,
    );
    options.scaler.bstretch = Bounds::new(
        parse_value(matches, "stretch_min", options.scaler.bstretch.lower)?,
        parse_value(matches, "stretch_max", options.scaler.bstretch.upper)?,
    );
    options.shuffler.opti.epsilon = parse_value(matches, "epsilon", options.shuffler.opti.epsilon)?;
    options.shuffler.opti.n_starts = parse_value(matches, "n_starts", options.shuffler.opti.n_starts)?;
    options.shuffler.opti.seed = parse_value(matches, "seed", options.shuffler.opti.seed)?;
    options.validate()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| AsmError::InvalidOption {
            name: "threads",
            reason: e.to_string(),
        })?;

    log::debug!("Options: {:?}", options);
    Ok(CliOptions {
        input,
        output,
        gzip,
        num_threads,
        options,
    })
}
