use {
    crate::field::{PrimeField, PrimeFieldElement, Uint},
    anyhow::{ensure, Result},
    std::{
        fmt::{self, Formatter},
        ops::{Add, AddAssign, Mul, Neg},
    },
};

/// Raw curve domain parameters, in file order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CurveParameters {
    pub p: Uint,
    pub a: Uint,
    pub b: Uint,
    pub gx: Uint,
    pub gy: Uint,
    pub n: Uint,
    pub h: Uint,
}

/// A short Weierstrass curve y^2 = x^3 + ax + b over GF(p), with a
/// distinguished generator of prime order n.
///
/// Immutable after construction; all point and signature operations borrow
/// it. Whether the generator actually lies on the curve, or n is its true
/// order, is never checked (see [`EllipticCurve::is_on_curve`] for the
/// opt-in predicate).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EllipticCurve {
    base_field: PrimeField,
    scalar_field: PrimeField,
    // Curve parameters in Montgomery form.
    // Ideally we would store these as PrimeFieldElement, but that would
    // require a self-reference to the base field.
    a_monty: Uint,
    b_monty: Uint,
    cofactor: Uint,
    generator_monty: (Uint, Uint),
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EllipticCurvePoint<'a> {
    curve: &'a EllipticCurve,
    coordinates: Coordinates<'a>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Coordinates<'a> {
    Infinity,
    Affine(PrimeFieldElement<'a>, PrimeFieldElement<'a>),
}

impl EllipticCurve {
    pub fn from_parameters(params: &CurveParameters) -> Result<Self> {
        // Only what the arithmetic itself cannot tolerate is rejected.
        // Generator, order and singularity checks are out of scope.
        ensure!(
            params.p != Uint::ZERO && params.p.bit(0),
            "Field modulus must be odd"
        );
        ensure!(
            params.n != Uint::ZERO && params.n.bit(0),
            "Group order must be odd"
        );
        ensure!(
            params.p != params.n,
            "Base and scalar fields must be different"
        );
        ensure!(params.n > Uint::from(2), "Group order is too small");

        let base_field = PrimeField::from_modulus(params.p);
        let scalar_field = PrimeField::from_modulus(params.n);

        let a = base_field.el_reduce(params.a);
        let b = base_field.el_reduce(params.b);
        let gx = base_field.el_reduce(params.gx);
        let gy = base_field.el_reduce(params.gy);

        Ok(Self {
            base_field,
            scalar_field,
            a_monty: a.as_uint_monty(),
            b_monty: b.as_uint_monty(),
            cofactor: params.h,
            generator_monty: (gx.as_uint_monty(), gy.as_uint_monty()),
        })
    }

    pub fn base_field(&self) -> &PrimeField {
        &self.base_field
    }

    pub fn scalar_field(&self) -> &PrimeField {
        &self.scalar_field
    }

    pub fn cofactor(&self) -> Uint {
        self.cofactor
    }

    pub fn a(&self) -> PrimeFieldElement {
        self.base_field.el_from_monty(self.a_monty)
    }

    pub fn b(&self) -> PrimeFieldElement {
        self.base_field.el_from_monty(self.b_monty)
    }

    pub fn generator(&self) -> EllipticCurvePoint {
        EllipticCurvePoint {
            curve: self,
            coordinates: Coordinates::Affine(
                self.base_field.el_from_monty(self.generator_monty.0),
                self.base_field.el_from_monty(self.generator_monty.1),
            ),
        }
    }

    pub fn pt_infinity(&self) -> EllipticCurvePoint {
        EllipticCurvePoint {
            curve: self,
            coordinates: Coordinates::Infinity,
        }
    }

    /// Construct a point from affine coordinates, reducing them mod p.
    ///
    /// The curve equation is deliberately not checked; externally supplied
    /// points (key files) are taken at face value. Use [`Self::is_on_curve`]
    /// when validation is wanted.
    pub fn pt_from_affine(&self, x: Uint, y: Uint) -> EllipticCurvePoint {
        EllipticCurvePoint {
            curve: self,
            coordinates: Coordinates::Affine(
                self.base_field.el_reduce(x),
                self.base_field.el_reduce(y),
            ),
        }
    }

    /// Opt-in curve membership check: y^2 = x^3 + ax + b.
    ///
    /// The point at infinity is the group identity and counts as on-curve.
    pub fn is_on_curve(&self, point: &EllipticCurvePoint) -> bool {
        match point.coordinates {
            Coordinates::Infinity => true,
            Coordinates::Affine(x, y) => y.pow(2) == x.pow(3) + self.a() * x + self.b(),
        }
    }
}

impl<'a> EllipticCurvePoint<'a> {
    pub fn curve(&self) -> &EllipticCurve {
        self.curve
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.coordinates, Coordinates::Infinity)
    }

    pub fn x(&self) -> Option<PrimeFieldElement<'a>> {
        match self.coordinates {
            Coordinates::Infinity => None,
            Coordinates::Affine(x, _) => Some(x),
        }
    }

    pub fn y(&self) -> Option<PrimeFieldElement<'a>> {
        match self.coordinates {
            Coordinates::Infinity => None,
            Coordinates::Affine(_, y) => Some(y),
        }
    }

    /// Point doubling.
    ///
    /// A point with y = 0 has order two; its double is the point at
    /// infinity, not representable by the tangent formula.
    pub fn double(self) -> Self {
        match self.coordinates {
            Coordinates::Infinity => self,
            Coordinates::Affine(x, y) => {
                if y.is_zero() {
                    return self.curve.pt_infinity();
                }
                let field = self.curve.base_field();
                // Tangent slope (3x^2 + a) / 2y.
                // The division only fails off-curve or with a composite
                // modulus, neither of which we guard against.
                let lambda = ((field.el_from_u64(3) * x.pow(2) + self.curve.a())
                    / (field.el_from_u64(2) * y))
                    .unwrap();
                let x3 = lambda.pow(2) - field.el_from_u64(2) * x;
                let y3 = lambda * (x - x3) - y;
                EllipticCurvePoint {
                    curve: self.curve,
                    coordinates: Coordinates::Affine(x3, y3),
                }
            }
        }
    }
}

macro_rules! forward_fmt {
    ($($trait:path),+) => {
        $(
            impl $trait for EllipticCurvePoint<'_> {
                fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                    match self.coordinates {
                        Coordinates::Infinity => write!(f, "Infinity"),
                        Coordinates::Affine(x, y) => {
                            write!(f, "(")?;
                            <PrimeFieldElement<'_> as $trait>::fmt(&x, f)?;
                            write!(f, ", ")?;
                            <PrimeFieldElement<'_> as $trait>::fmt(&y, f)?;
                            write!(f, ")")
                        }
                    }
                }
            }
        )+
    };
}

forward_fmt!(fmt::Debug, fmt::Display, fmt::LowerHex, fmt::UpperHex);

impl Add for EllipticCurvePoint<'_> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        assert_eq!(self.curve, other.curve);
        match (self.coordinates, other.coordinates) {
            (Coordinates::Infinity, _) => other,
            (_, Coordinates::Infinity) => self,
            (Coordinates::Affine(x1, y1), Coordinates::Affine(x2, y2)) => {
                // https://hyperelliptic.org/EFD/g1p/auto-shortw.html
                if x1 == x2 {
                    if y1 == y2 {
                        self.double()
                    } else {
                        // Equal x with distinct y means other = -self.
                        self.curve.pt_infinity()
                    }
                } else {
                    // Chord slope (y2 - y1) / (x2 - x1).
                    let lambda = ((y2 - y1) / (x2 - x1)).unwrap();
                    let x3 = lambda.pow(2) - x1 - x2;
                    let y3 = lambda * (x1 - x3) - y1;
                    EllipticCurvePoint {
                        curve: self.curve,
                        coordinates: Coordinates::Affine(x3, y3),
                    }
                }
            }
        }
    }
}

impl AddAssign for EllipticCurvePoint<'_> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Neg for EllipticCurvePoint<'_> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self.coordinates {
            Coordinates::Infinity => self,
            Coordinates::Affine(x, y) => EllipticCurvePoint {
                curve: self.curve,
                coordinates: Coordinates::Affine(x, -y),
            },
        }
    }
}

impl Mul<Uint> for EllipticCurvePoint<'_> {
    type Output = Self;

    /// Double-and-add scalar multiplication.
    ///
    /// Correct for every non-negative scalar, including zero (identity) and
    /// the group order (n * G = infinity). Not constant-time.
    fn mul(self, scalar: Uint) -> Self::Output {
        let mut result = self.curve.pt_infinity();
        let mut base = self;
        for i in 0..scalar.bit_len() {
            if scalar.bit(i) {
                result += base;
            }
            base = base.double();
        }
        result
    }
}

impl<'a> Mul<EllipticCurvePoint<'a>> for Uint {
    type Output = EllipticCurvePoint<'a>;

    fn mul(self, point: EllipticCurvePoint<'a>) -> Self::Output {
        point * self
    }
}
