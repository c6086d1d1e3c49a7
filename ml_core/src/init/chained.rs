use super::ParamGen;

/// A parameter generator that delegates to a sequence of generators, moving on to
/// the next one whenever the current one runs dry.
///
/// Used to give the first-order block and the latent block of a model their own
/// initialization.
pub struct ChainedParamGen {
    param_gens: Vec<Box<dyn ParamGen>>,
    curr: usize,
}

impl ChainedParamGen {
    pub fn new(param_gens: Vec<Box<dyn ParamGen>>) -> Self {
        Self {
            param_gens,
            curr: 0,
        }
    }
}

impl ParamGen for ChainedParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let mut sample = Vec::with_capacity(n);

        while sample.len() < n && self.curr < self.param_gens.len() {
            match self.param_gens[self.curr].sample(n - sample.len()) {
                Some(part) if part.len() == n - sample.len() => sample.extend(part),
                Some(part) => {
                    sample.extend(part);
                    self.curr += 1;
                }
                None => self.curr += 1,
            }
        }

        if sample.is_empty() && n > 0 {
            return None;
        }

        Some(sample)
    }
}
