//! Arithmetic operators on expressions.
//!
//! All operators route through the canonical constructors, so `a + b`
//! and `Expr::add_all([a, b])` produce the same tree.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::expr::Expr;

fn add(a: &Expr, b: &Expr) -> Expr {
    Expr::add_all([a.clone(), b.clone()])
}

fn sub(a: &Expr, b: &Expr) -> Expr {
    Expr::add_all([a.clone(), neg(b)])
}

fn mul(a: &Expr, b: &Expr) -> Expr {
    Expr::mul_all([a.clone(), b.clone()])
}

fn div(a: &Expr, b: &Expr) -> Expr {
    Expr::mul_all([a.clone(), b.recip()])
}

fn neg(a: &Expr) -> Expr {
    Expr::mul_all([Expr::int(-1), a.clone()])
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                $func(self, rhs)
            }
        }

        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                $func(&self, &rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                $func(&self, rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                $func(self, &rhs)
            }
        }

        impl $trait<i64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: i64) -> Expr {
                $func(&self, &Expr::int(rhs))
            }
        }

        impl $trait<i64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: i64) -> Expr {
                $func(self, &Expr::int(rhs))
            }
        }

        impl $trait<Expr> for i64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                $func(&Expr::int(self), &rhs)
            }
        }

        impl $trait<&Expr> for i64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                $func(&Expr::int(self), rhs)
            }
        }
    };
}

impl_binop!(Add, add, add);
impl_binop!(Sub, sub, sub);
impl_binop!(Mul, mul, mul);
impl_binop!(Div, div, div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        neg(&self)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        neg(self)
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        Expr::add_all(iter)
    }
}

impl std::iter::Product for Expr {
    fn product<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        Expr::mul_all(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_canonicalise() {
        let x = Expr::sym("x");
        assert!((&x - &x).is_zero());
        assert!((&x / &x).is_one());
        assert_eq!(&x + &x, 2 * &x);
        assert_eq!(-(-x.clone()), x);
    }

    #[test]
    fn test_iterator_sum_and_product() {
        let total: Expr = (1..=4).map(Expr::int).sum();
        assert_eq!(total, Expr::int(10));
        let prod: Expr = (1..=4).map(Expr::int).product();
        assert_eq!(prod, Expr::int(24));
    }
}
