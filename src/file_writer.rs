use crate::errors::AsmError;
use crate::overseer::{AssemblyResult, DomainStatus};
use flate2::write::GzEncoder;
use flate2::Compression;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn status_str(status: DomainStatus) -> &'static str {
    match status {
        DomainStatus::Resolved => "resolved",
        DomainStatus::Unresolved => "unresolved",
        DomainStatus::Skipped => "skipped",
    }
}

fn cost_str(cost: Option<f64>) -> String {
    match cost {
        Some(c) => format!("{:.6}", c),
        None => "NA".to_string(),
    }
}

pub fn write_assembly_to<W: Write>(writer: &mut W, result: &AssemblyResult) -> std::io::Result<()> {
    if let Some(seq) = &result.best_sequence {
        writeln!(writer, "#best_sequence\t{}", seq)?;
    }
    writeln!(writer, "#dead_branches\t{}", result.dead)?;

    writeln!(writer, "#candidates")?;
    writeln!(writer, "rank\torder\tnoverlaps\tcost\tcyclic\tsequence")?;
    for (i, cand) in result.candidates.iter().enumerate() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            i,
            cand.order.iter().join(","),
            cand.noverlaps,
            cost_str(cand.cost),
            cand.cyclic,
            cand.sequence
        )?;
    }

    writeln!(writer, "#domains")?;
    writeln!(writer, "oligos\tstatus\tbest\talternatives\tunmerged")?;
    for domain in result.domains.iter() {
        let best = match &domain.best {
            Some(best) => best.iter().join(","),
            None => "NA".to_string(),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            domain.oligos.iter().join(","),
            status_str(domain.status),
            best,
            domain.alternatives,
            domain.unmerged
        )?;
    }

    writeln!(writer, "#cycles")?;
    writeln!(writer, "nodes\tsequence")?;
    for cycle in result.cycles.iter() {
        writeln!(
            writer,
            "{}\t{}",
            cycle.nodes.iter().map(|n| n.iter().join("/")).join(","),
            cycle.sequence
        )?;
    }
    Ok(())
}

pub fn write_assembly<P>(filename: P, result: &AssemblyResult, gzip: bool) -> Result<(), AsmError>
where
    P: AsRef<Path>,
{
    let path = filename.as_ref();
    let to_err = |source: std::io::Error| AsmError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_err)?;
    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_assembly_to(&mut encoder, result).map_err(to_err)?;
        encoder.finish().map_err(to_err)?;
    } else {
        let mut writer = BufWriter::new(file);
        write_assembly_to(&mut writer, result).map_err(to_err)?;
        writer.flush().map_err(to_err)?;
    }
    log::info!("Wrote assembly to {:?}", path);
    Ok(())
}
