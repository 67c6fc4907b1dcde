pub mod constants;

pub mod errors;

pub mod types_structs;

pub mod utils_seqs;

pub mod utils_dists;

pub mod overlap_graph;

pub mod cyclic_paths;

pub mod part_perm;

pub mod scores;

pub mod scaler;

pub mod shuffler;

pub mod overseer;

pub mod file_reader;

pub mod file_writer;

pub mod parse_cmd_line;
