use crate::types_structs::Oligo;

// Longest suffix of seq1 which is also a prefix of seq2. A sequence fully
// contained at the start of the other counts as an overlap of its full length.
pub fn tail_overlap<'a>(seq1: &'a str, seq2: &str) -> &'a str {
    let bytes1 = seq1.as_bytes();
    let bytes2 = seq2.as_bytes();
    for i in 0..bytes1.len() {
        let tail = &bytes1[i..];
        if tail.len() > bytes2.len() {
            continue;
        }
        if tail == &bytes2[..tail.len()] {
            return &seq1[i..];
        }
    }
    return "";
}

//Number of bases seq2 shares with the end of seq1 when it follows seq1.
pub fn overlap_len(seq1: &str, seq2: &str) -> usize {
    tail_overlap(seq1, seq2).len()
}

pub fn may_overlap(seq1: &str, seq2: &str, min_overlap: usize) -> bool {
    overlap_len(seq1, seq2) >= min_overlap
}

pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'a' => 't',
            't' => 'a',
            'c' => 'g',
            'g' => 'c',
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            other => other,
        })
        .collect()
}

//Appends next to seq, sharing as many bases as possible.
pub fn add_to_sequence(seq: &str, next: &str) -> String {
    if seq.is_empty() {
        return next.to_string();
    }
    let shared = tail_overlap(seq, next).len();
    let mut toret = String::with_capacity(seq.len() + next.len() - shared);
    toret.push_str(seq);
    toret.push_str(&next[shared..]);
    toret
}

pub fn pile_sequences<'a, I>(seqs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut toret = String::new();
    for seq in seqs {
        toret = add_to_sequence(&toret, seq);
    }
    toret
}

//Number of consecutive pairs in order whose sequences overlap by at least min_overlap.
pub fn noverlaps(order: &[usize], oligos: &[Oligo], min_overlap: usize) -> usize {
    order
        .windows(2)
        .filter(|w| may_overlap(oligos[w[0]].seq(), oligos[w[1]].seq(), min_overlap))
        .count()
}
