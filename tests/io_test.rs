use flate2::write::GzEncoder;
use flate2::Compression;
use oligo_asm::errors::AsmError;
use oligo_asm::file_reader;
use oligo_asm::file_writer;
use oligo_asm::overseer::Overseer;
use oligo_asm::types_structs::Options;
use std::io::{Read, Write};

#[test]
fn read_oligos_test() {
    let oligos = file_reader::read_oligos_tsv("./tests/data/oligos.tsv").unwrap();
    assert_eq!(oligos.len(), 5);
    assert_eq!(oligos[1].seq(), "agt");
    assert_eq!(oligos[1].pos(), 1.);
    assert_eq!(oligos[1].poserr(), 2.);
    assert_eq!(oligos[1].batch_id(), None);
}

#[test]
fn read_bad_oligos_test() {
    let err = file_reader::read_oligos_tsv("./tests/data/bad_oligos.tsv").unwrap_err();
    assert!(matches!(err, AsmError::InvalidBase { index: 1, base: 'x', .. }));

    let err = file_reader::read_oligos_tsv("./tests/data/does_not_exist.tsv").unwrap_err();
    assert!(matches!(err, AsmError::Io { .. }));
}

#[test]
fn parse_optional_columns_test() {
    let text = "seq\tpos\tposerr\tbatch\tbpos\n\nACG\t0.5\t1\t2\t10\n# comment\ncgt\t1.5\t1\t-\t11\ngtt\t2\t0\n";
    let oligos = file_reader::parse_oligos(text.as_bytes()).unwrap();
    assert_eq!(oligos.len(), 3);
    assert_eq!(oligos[0].seq(), "acg");
    assert_eq!(oligos[0].batch_id(), Some(2));
    assert_eq!(oligos[0].bpos(), Some(10));
    assert_eq!(oligos[1].batch_id(), None);
    assert_eq!(oligos[1].bpos(), Some(11));
    assert_eq!(oligos[2].poserr(), 0.);

    let err = file_reader::parse_oligos("acg\tnot_a_number\t1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, AsmError::Parse { line: 1, .. }));
    let err = file_reader::parse_oligos("acg\t1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, AsmError::Parse { line: 1, .. }));
}

#[test]
fn read_gz_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oligos.tsv.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(b"acg\t0\t1\ncgt\t1\t1\n").unwrap();
    encoder.finish().unwrap();

    let oligos = file_reader::read_oligos_tsv(&path).unwrap();
    assert_eq!(oligos.len(), 2);
    assert_eq!(oligos[1].seq(), "cgt");
}

#[test]
fn write_assembly_test() {
    let oligos = file_reader::read_oligos_tsv("./tests/data/oligos.tsv").unwrap();
    let result = Overseer::new(&oligos, Options::default()).unwrap().run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tsv");
    file_writer::write_assembly(&path, &result, false).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("#best_sequence\tagtgaag\n"));
    assert!(text.contains("0\t1,0,2,3,4\t4\t"));
    assert!(text.contains("0,1,2,3,4\tresolved\t1,0,2,3,4\t5\t0\n"));

    let gz_path = dir.path().join("out.tsv.gz");
    file_writer::write_assembly(&gz_path, &result, true).unwrap();
    let mut decoded = String::new();
    flate2::read::GzDecoder::new(std::fs::File::open(&gz_path).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, text);
}
