//! Transform options.

use syntra_core::Expr;
use syntra_poly::Damping;
use syntra_ratfun::Method;

/// Named transform parameters.
///
/// Only the fields a transform actually reads affect its result, but all
/// of them take part in the cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransformOptions {
    /// Evaluate the transform; otherwise return the defining integral or sum.
    pub evaluate: bool,
    /// Assume signals vanish before time zero; inverse unilateral results
    /// then omit the trailing unit step.
    pub causal: bool,
    /// Use the damped-sinusoid closed form for under-damped second-order terms.
    pub damped_sin: bool,
    /// Force the damping branch of quadratic poles.
    pub damping: Option<Damping>,
    /// Merge complex-conjugate pole pairs into real terms.
    pub combine_conjugates: bool,
    /// Residue method.
    pub method: Method,
    /// Drop initial-condition terms from derivative rules.
    pub zero_initial_conditions: bool,
    /// DFT length `N`.
    pub dft_length: Option<Expr>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            evaluate: true,
            causal: false,
            damped_sin: false,
            damping: None,
            combine_conjugates: true,
            method: Method::Sub,
            zero_initial_conditions: false,
            dft_length: None,
        }
    }
}

impl TransformOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `evaluate`.
    #[must_use]
    pub fn with_evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    /// Sets `causal`.
    #[must_use]
    pub fn with_causal(mut self, causal: bool) -> Self {
        self.causal = causal;
        self
    }

    /// Sets `damped_sin`.
    #[must_use]
    pub fn with_damped_sin(mut self, damped_sin: bool) -> Self {
        self.damped_sin = damped_sin;
        self
    }

    /// Sets the damping hint.
    #[must_use]
    pub fn with_damping(mut self, damping: Option<Damping>) -> Self {
        self.damping = damping;
        self
    }

    /// Sets `combine_conjugates`.
    #[must_use]
    pub fn with_combine_conjugates(mut self, combine: bool) -> Self {
        self.combine_conjugates = combine;
        self
    }

    /// Sets the residue method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets `zero_initial_conditions`.
    #[must_use]
    pub fn with_zero_initial_conditions(mut self, zero: bool) -> Self {
        self.zero_initial_conditions = zero;
        self
    }

    /// Sets the DFT length.
    #[must_use]
    pub fn with_dft_length(mut self, n: impl Into<Expr>) -> Self {
        self.dft_length = Some(n.into());
        self
    }
}
