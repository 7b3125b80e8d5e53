//! Human readable rendering.

use std::fmt::{self, Display, Formatter, Write};

use crate::expr::{Expr, ExprNode, Func};

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(e: &Expr) -> u8 {
    match e.node() {
        ExprNode::Add(_) => PREC_ADD,
        ExprNode::Mul(_) => PREC_MUL,
        ExprNode::Number(n) if n.is_negative() || (n.is_exact() && !n.is_integer()) => PREC_MUL,
        ExprNode::Pow { .. } => PREC_POW,
        _ => PREC_ATOM,
    }
}

fn write_wrapped(f: &mut Formatter<'_>, e: &Expr, min_prec: u8) -> fmt::Result {
    if precedence(e) < min_prec {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

fn write_args(f: &mut Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

fn write_product(f: &mut Formatter<'_>, factors: &[Expr]) -> fmt::Result {
    let mut numer: Vec<Expr> = Vec::new();
    let mut denom: Vec<Expr> = Vec::new();
    let mut negative = false;

    for factor in factors {
        match factor.node() {
            ExprNode::Number(n) if n.is_exact() && !n.is_integer() => {
                if let Some((p, q)) = n.to_ratio() {
                    negative ^= p < 0;
                    if p.abs() != 1 {
                        numer.push(Expr::int(p.abs()));
                    }
                    denom.push(Expr::int(q));
                } else {
                    numer.push(factor.clone());
                }
            }
            ExprNode::Number(n) if n.is_negative() => {
                negative = !negative;
                let magnitude = Expr::number(n.abs());
                if !magnitude.is_one() {
                    numer.push(magnitude);
                }
            }
            ExprNode::Pow { base, exp } if exp.has_negative_sign() => {
                denom.push(base.pow(&-exp));
            }
            _ => numer.push(factor.clone()),
        }
    }

    if negative {
        f.write_char('-')?;
    }
    if numer.is_empty() {
        f.write_char('1')?;
    }
    for (i, factor) in numer.iter().enumerate() {
        if i > 0 {
            f.write_char('*')?;
        }
        write_wrapped(f, factor, PREC_MUL)?;
    }
    if !denom.is_empty() {
        f.write_char('/')?;
        if denom.len() == 1 {
            write_wrapped(f, &denom[0], PREC_POW)?;
        } else {
            f.write_char('(')?;
            write_product(f, &denom)?;
            f.write_char(')')?;
        }
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.node() {
            ExprNode::Number(n) => write!(f, "{n}"),
            ExprNode::ImaginaryUnit => f.write_char('j'),
            ExprNode::Pi => f.write_str("pi"),
            ExprNode::Symbol(s) => write!(f, "{s}"),
            ExprNode::Add(terms) => {
                // constants print last
                let ordered = terms
                    .iter()
                    .filter(|t| !t.is_number())
                    .chain(terms.iter().filter(|t| t.is_number()));
                for (i, term) in ordered.enumerate() {
                    if i == 0 {
                        write!(f, "{term}")?;
                    } else if term.has_negative_sign() {
                        write!(f, " - {}", -term)?;
                    } else {
                        write!(f, " + {term}")?;
                    }
                }
                Ok(())
            }
            ExprNode::Mul(factors) => write_product(f, factors),
            ExprNode::Pow { base, exp } => {
                if exp.has_negative_sign() {
                    return write_product(f, &[self.clone()]);
                }
                if *exp == Expr::rational(1, 2) {
                    return write!(f, "sqrt({base})");
                }
                write_wrapped(f, base, PREC_ATOM)?;
                f.write_str("**")?;
                write_wrapped(f, exp, PREC_ATOM)
            }
            ExprNode::Func { func, args } => {
                write!(f, "{}(", func.name())?;
                write_args(f, args)?;
                if let Func::DiracDelta(k) = func {
                    if *k > 0 {
                        write!(f, ", {k}")?;
                    }
                }
                f.write_char(')')
            }
            ExprNode::Undefined { name, args } => {
                write!(f, "{name}(")?;
                write_args(f, args)?;
                f.write_char(')')
            }
            ExprNode::Derivative { expr, var, order } => {
                if *order == 1 {
                    write!(f, "Derivative({expr}, {var})")
                } else {
                    write!(f, "Derivative({expr}, ({var}, {order}))")
                }
            }
            ExprNode::Integral {
                body,
                var,
                lower,
                upper,
            } => write!(f, "Integral({body}, ({var}, {lower}, {upper}))"),
            ExprNode::Sum {
                body,
                var,
                lower,
                upper,
            } => write!(f, "Sum({body}, ({var}, {lower}, {upper}))"),
            ExprNode::Equality { lhs, rhs } => write!(f, "Eq({lhs}, {rhs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_sum_puts_constant_last() {
        let s = Expr::sym("s");
        assert_eq!((&s + 2).to_string(), "s + 2");
        assert_eq!((&s - 2).to_string(), "s - 2");
    }

    #[test]
    fn test_display_fraction() {
        let s = Expr::sym("s");
        assert_eq!((Expr::one() / (&s + 1)).to_string(), "1/(s + 1)");
        assert_eq!((Expr::int(3) / &s).to_string(), "3/s");
        assert_eq!(Expr::rational(-1, 2).to_string(), "-1/2");
    }

    #[test]
    fn test_display_functions() {
        let t = Expr::sym("t");
        assert_eq!((-&t).exp().to_string(), "exp(-t)");
        assert_eq!(t.heaviside().to_string(), "Heaviside(t)");
        assert_eq!(t.powi(2).to_string(), "t**2");
    }
}
