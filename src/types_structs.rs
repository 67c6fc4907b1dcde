use crate::constants;
use crate::errors::AsmError;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

pub type OligoId = usize;
pub type BasePosition = i64;

//Gaussian prior on a measured position. The declared scale may be 0 (perfect
//measurement); densities are then evaluated with constants::MIN_POSERR.
#[derive(Debug, Clone)]
pub struct NormDist {
    loc: f64,
    scale: f64,
    inner: Normal,
}

impl NormDist {
    pub fn new(loc: f64, scale: f64) -> Result<NormDist, AsmError> {
        if !loc.is_finite() || !scale.is_finite() || scale < 0. {
            return Err(AsmError::InvalidDistribution { loc, scale });
        }
        let inner = Normal::new(loc, f64::max(scale, constants::MIN_POSERR))
            .map_err(|_| AsmError::InvalidDistribution { loc, scale })?;
        Ok(NormDist { loc, scale, inner })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    //Scale actually used for densities.
    pub fn eff_scale(&self) -> f64 {
        f64::max(self.scale, constants::MIN_POSERR)
    }

    pub fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x)
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        self.inner.ln_pdf(x)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x)
    }

    pub fn interval(&self, nscale: f64) -> (f64, f64) {
        (self.loc - nscale * self.scale, self.loc + nscale * self.scale)
    }
}

impl PartialEq for NormDist {
    fn eq(&self, other: &Self) -> bool {
        self.loc == other.loc && self.scale == other.scale
    }
}

/// A measured oligo: its sequence, the measured position (nm) and the
/// uncertainty on that position. Built once through [`build_oligo`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Oligo {
    seq: String,
    pos: f64,
    poserr: f64,
    bpos: Option<BasePosition>,
    batch_id: Option<usize>,
    dist: NormDist,
}

impl Oligo {
    pub fn seq(&self) -> &str {
        &self.seq
    }

    pub fn pos(&self) -> f64 {
        self.pos
    }

    pub fn poserr(&self) -> f64 {
        self.poserr
    }

    pub fn bpos(&self) -> Option<BasePosition> {
        self.bpos
    }

    pub fn batch_id(&self) -> Option<usize> {
        self.batch_id
    }

    pub fn size(&self) -> usize {
        self.seq.len()
    }

    pub fn dist(&self) -> &NormDist {
        &self.dist
    }

    pub fn interval(&self, nscale: f64) -> (f64, f64) {
        self.dist.interval(nscale)
    }

    pub fn with_batch(mut self, batch_id: usize) -> Oligo {
        self.batch_id = Some(batch_id);
        self
    }

    pub fn with_bpos(mut self, bpos: BasePosition) -> Oligo {
        self.bpos = Some(bpos);
        self
    }
}

//index is only used to report which input record is malformed.
pub fn build_oligo(index: usize, seq: &str, pos: f64, poserr: f64) -> Result<Oligo, AsmError> {
    if seq.is_empty() {
        return Err(AsmError::EmptySequence { index });
    }
    let seq = seq.to_ascii_lowercase();
    if let Some(base) = seq.chars().find(|c| !matches!(c, 'a' | 'c' | 'g' | 't')) {
        return Err(AsmError::InvalidBase { index, base, seq });
    }
    if !pos.is_finite() {
        return Err(AsmError::NonFinite {
            index,
            field: "position",
            value: pos,
        });
    }
    if !poserr.is_finite() {
        return Err(AsmError::NonFinite {
            index,
            field: "position uncertainty",
            value: poserr,
        });
    }
    if poserr < 0. {
        return Err(AsmError::NegativeUncertainty { index, poserr });
    }
    let dist = NormDist::new(pos, poserr)?;

    let toret = Oligo {
        seq: seq,
        pos: pos,
        poserr: poserr,
        bpos: None,
        batch_id: None,
        dist: dist,
    };
    Ok(toret)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Bounds {
        Bounds { lower, upper }
    }

    pub fn contains(&self, val: f64) -> bool {
        val >= self.lower && val <= self.upper
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    fn validate(&self, name: &'static str) -> Result<(), AsmError> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(AsmError::InvalidOption {
                name,
                reason: format!("bounds [{}, {}] must be finite", self.lower, self.upper),
            });
        }
        if self.lower > self.upper {
            return Err(AsmError::InvalidOption {
                name,
                reason: format!("lower bound {} exceeds upper bound {}", self.lower, self.upper),
            });
        }
        Ok(())
    }
}

//Maps a measured position onto a base position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub stretch: f64,
    pub bias: f64,
}

impl Rescale {
    pub fn apply(&self, pos: f64) -> f64 {
        self.stretch * pos + self.bias
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostKind {
    Pdf,
    Percentile,
}

//Which slot is the merge boundary when several slot spans contain the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    LowestDomain,
    HighestDomain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphOptions {
    pub min_overlap: usize,
    pub nscale: f64,
    pub with_reverse: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            min_overlap: constants::MIN_OVERLAP,
            nscale: constants::NSCALE,
            with_reverse: false,
        }
    }
}

impl GraphOptions {
    pub fn validate(&self) -> Result<(), AsmError> {
        validate_min_overlap(self.min_overlap)?;
        validate_nscale(self.nscale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptiOptions {
    pub epsilon: f64,
    pub max_iter: usize,
    pub n_starts: usize,
    pub seed: u64,
    pub cost_kind: CostKind,
}

impl Default for OptiOptions {
    fn default() -> Self {
        OptiOptions {
            epsilon: constants::EPSILON,
            max_iter: constants::MAX_ITER,
            n_starts: constants::N_STARTS,
            seed: constants::SEED,
            cost_kind: CostKind::Pdf,
        }
    }
}

impl OptiOptions {
    pub fn validate(&self) -> Result<(), AsmError> {
        if !(self.epsilon > 0.) || !self.epsilon.is_finite() {
            return Err(AsmError::InvalidOption {
                name: "epsilon",
                reason: format!("{} must be a positive number", self.epsilon),
            });
        }
        if self.max_iter == 0 {
            return Err(AsmError::InvalidOption {
                name: "max_iter",
                reason: "at least one iteration is required".to_string(),
            });
        }
        if self.n_starts == 0 {
            return Err(AsmError::InvalidOption {
                name: "n_starts",
                reason: "at least one starting point is required".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalerOptions {
    pub maxstack: usize,
    pub bbias: Bounds,
    pub bstretch: Bounds,
    pub default_stretch: f64,
    pub nscale: f64,
}

impl Default for ScalerOptions {
    fn default() -> Self {
        ScalerOptions {
            maxstack: constants::MAXSTACK,
            bbias: Bounds::new(constants::BIAS_BOUNDS.0, constants::BIAS_BOUNDS.1),
            bstretch: Bounds::new(constants::STRETCH_BOUNDS.0, constants::STRETCH_BOUNDS.1),
            default_stretch: constants::DEFAULT_STRETCH,
            nscale: constants::NSCALE,
        }
    }
}

impl ScalerOptions {
    pub fn validate(&self) -> Result<(), AsmError> {
        if self.maxstack == 0 {
            return Err(AsmError::InvalidOption {
                name: "maxstack",
                reason: "at least one stacking iteration is required".to_string(),
            });
        }
        self.bbias.validate("bias bounds")?;
        self.bstretch.validate("stretch bounds")?;
        if !self.bstretch.contains(self.default_stretch) {
            return Err(AsmError::InvalidOption {
                name: "default_stretch",
                reason: format!(
                    "{} is outside the stretch bounds [{}, {}]",
                    self.default_stretch, self.bstretch.lower, self.bstretch.upper
                ),
            });
        }
        validate_nscale(self.nscale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShufflerOptions {
    pub min_overlap: usize,
    pub nscale: f64,
    pub max_kperms: usize,
    pub policy: BoundaryPolicy,
    pub opti: OptiOptions,
}

impl Default for ShufflerOptions {
    fn default() -> Self {
        ShufflerOptions {
            min_overlap: constants::MIN_OVERLAP,
            nscale: constants::NSCALE,
            max_kperms: constants::MAX_KPERMS,
            policy: BoundaryPolicy::LowestDomain,
            opti: OptiOptions::default(),
        }
    }
}

impl ShufflerOptions {
    pub fn validate(&self) -> Result<(), AsmError> {
        validate_min_overlap(self.min_overlap)?;
        validate_nscale(self.nscale)?;
        if self.max_kperms == 0 {
            return Err(AsmError::InvalidOption {
                name: "max_kperms",
                reason: "at least one permutation must be allowed".to_string(),
            });
        }
        self.opti.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub graph: GraphOptions,
    pub scaler: ScalerOptions,
    pub shuffler: ShufflerOptions,
    pub shuffle: bool,
    pub max_cycles: usize,
    pub max_cycle_len: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            graph: GraphOptions::default(),
            scaler: ScalerOptions::default(),
            shuffler: ShufflerOptions::default(),
            shuffle: true,
            max_cycles: constants::MAX_CYCLES,
            max_cycle_len: None,
        }
    }
}

impl Options {
    //Keeps the overlap threshold and interval scale identical across components.
    pub fn with_overlap(mut self, min_overlap: usize, nscale: f64) -> Options {
        self.graph.min_overlap = min_overlap;
        self.graph.nscale = nscale;
        self.scaler.nscale = nscale;
        self.shuffler.min_overlap = min_overlap;
        self.shuffler.nscale = nscale;
        self
    }

    pub fn validate(&self) -> Result<(), AsmError> {
        self.graph.validate()?;
        self.scaler.validate()?;
        self.shuffler.validate()?;
        if self.max_cycle_len == Some(0) {
            return Err(AsmError::InvalidOption {
                name: "max_cycle_len",
                reason: "cycles have at least one edge".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_min_overlap(min_overlap: usize) -> Result<(), AsmError> {
    if min_overlap == 0 {
        return Err(AsmError::InvalidOption {
            name: "min_overlap",
            reason: "at least one overlapping base is required".to_string(),
        });
    }
    Ok(())
}

fn validate_nscale(nscale: f64) -> Result<(), AsmError> {
    if !nscale.is_finite() || nscale < 0. {
        return Err(AsmError::InvalidOption {
            name: "nscale",
            reason: format!("{} must be a non-negative number", nscale),
        });
    }
    Ok(())
}
