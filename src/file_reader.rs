use crate::errors::AsmError;
use crate::types_structs::{build_oligo, Oligo};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

// Buffered reader over a plain or gzipped (.gz) file.
fn open_reader<P>(filename: P) -> Result<Box<dyn BufRead>, AsmError>
where
    P: AsRef<Path>,
{
    let path = filename.as_ref();
    let file = File::open(path).map_err(|source| AsmError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_gz = path.extension().map(|ext| ext == "gz").unwrap_or(false);
    if is_gz {
        Ok(Box::new(io::BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(io::BufReader::new(file)))
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str, line: usize) -> Result<T, AsmError> {
    field.trim().parse::<T>().map_err(|_| AsmError::Parse {
        line,
        reason: format!("could not parse {} from {:?}", name, field),
    })
}

//Missing optional columns may be left empty or written as "-".
fn is_missing(field: Option<&&str>) -> bool {
    match field {
        None => true,
        Some(f) => f.trim().is_empty() || f.trim() == "-",
    }
}

// Tab separated oligos, one per line:
//   seq  pos  poserr  [batch]  [bpos]
// Lines starting with # and blank lines are skipped, as is a header line whose
// first column is "seq".
pub fn parse_oligos<R>(reader: R) -> Result<Vec<Oligo>, AsmError>
where
    R: BufRead,
{
    let mut oligos = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let l = line.map_err(|e| AsmError::Parse {
            line: line_number,
            reason: e.to_string(),
        })?;
        let trimmed = l.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let v: Vec<&str> = trimmed.split('\t').collect();
        if v[0].trim().eq_ignore_ascii_case("seq") {
            continue;
        }
        if v.len() < 3 {
            return Err(AsmError::Parse {
                line: line_number,
                reason: format!("expected at least 3 columns, found {}", v.len()),
            });
        }

        let pos = parse_field::<f64>(v[1], "position", line_number)?;
        let poserr = parse_field::<f64>(v[2], "position uncertainty", line_number)?;
        let mut oligo = build_oligo(oligos.len(), v[0].trim(), pos, poserr)?;
        if !is_missing(v.get(3)) {
            oligo = oligo.with_batch(parse_field::<usize>(v[3], "batch", line_number)?);
        }
        if !is_missing(v.get(4)) {
            oligo = oligo.with_bpos(parse_field::<i64>(v[4], "base position", line_number)?);
        }
        oligos.push(oligo);
    }

    log::debug!("Read {} oligos", oligos.len());
    Ok(oligos)
}

pub fn read_oligos_tsv<P>(filename: P) -> Result<Vec<Oligo>, AsmError>
where
    P: AsRef<Path>,
{
    let reader = open_reader(&filename)?;
    let oligos = parse_oligos(reader)?;
    log::info!("Read {} oligos from {:?}", oligos.len(), filename.as_ref());
    Ok(oligos)
}
