use {
    ruint::aliases::U64,
    std::{
        fmt::{self, Formatter},
        ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub},
    },
};

// All externally exchanged values are 256-bit big-endian integers.
pub type Uint = ruint::Uint<256, 4>;

/// Field of integers modulo an odd prime.
///
/// Primality is not checked; the arithmetic only requires an odd modulus
/// (Montgomery restriction). Non-prime moduli make `inv` partial.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct PrimeField {
    modulus: Uint,

    // Precomputed values for Montgomery multiplication.
    montgomery_r: Uint,  // R = 2^256 mod modulus
    montgomery_r2: Uint, // R^2, or R in Montgomery form
    montgomery_r3: Uint, // R^3, or R^2 in Montgomery form
    mod_inv: u64,        // -1 / modulus mod 2^64
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PrimeFieldElement<'a> {
    field: &'a PrimeField,
    value: Uint,
}

impl PrimeField {
    pub fn from_modulus(modulus: Uint) -> Self {
        assert_ne!(modulus, Uint::ZERO);
        assert!(modulus.bit(0), "Montgomery arithmetic requires an odd modulus");
        let mod_inv = U64::wrapping_from(modulus)
            .inv_ring()
            .unwrap()
            .wrapping_neg()
            .to();
        let montgomery_r = Uint::from(2).pow_mod(Uint::from(Uint::BITS), modulus);
        let montgomery_r2 = montgomery_r.mul_mod(montgomery_r, modulus);
        let montgomery_r3 = montgomery_r2.mul_mod(montgomery_r, modulus);
        Self {
            modulus,
            mod_inv,
            montgomery_r,
            montgomery_r2,
            montgomery_r3,
        }
    }

    pub fn modulus(&self) -> Uint {
        self.modulus
    }

    pub fn zero(&self) -> PrimeFieldElement {
        PrimeFieldElement {
            field: self,
            value: Uint::ZERO,
        }
    }

    pub fn one(&self) -> PrimeFieldElement {
        PrimeFieldElement {
            field: self,
            value: self.montgomery_r,
        }
    }

    #[inline]
    pub fn el_from_u64(&self, value: u64) -> PrimeFieldElement {
        self.el_from_uint(Uint::from(value))
    }

    #[inline]
    pub fn el_from_uint(&self, value: Uint) -> PrimeFieldElement {
        assert!(value < self.modulus);
        // Convert to Montgomery form by multiplying with R.
        PrimeFieldElement {
            field: self,
            value: self.mont_mul(value, self.montgomery_r2),
        }
    }

    #[inline]
    pub fn el_from_monty(&self, value: Uint) -> PrimeFieldElement {
        assert!(value < self.modulus);
        PrimeFieldElement { field: self, value }
    }

    /// Reduce an arbitrary integer into the field.
    ///
    /// This is the entry point for externally supplied scalars and digests,
    /// which may exceed the modulus. An input congruent to zero reduces to
    /// the zero element; callers that care must check.
    #[inline]
    pub fn el_reduce(&self, value: Uint) -> PrimeFieldElement {
        self.el_from_uint(value % self.modulus)
    }

    /// Montgomery multiplication
    #[inline]
    fn mont_mul(&self, a: Uint, b: Uint) -> Uint {
        a.mul_redc(b, self.modulus, self.mod_inv)
    }
}

impl PrimeFieldElement<'_> {
    pub fn field(&self) -> &PrimeField {
        self.field
    }

    #[inline]
    pub fn to_uint(self) -> Uint {
        self.field.mont_mul(self.value, Uint::from(1))
    }

    #[inline]
    pub fn as_uint_monty(self) -> Uint {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value == Uint::ZERO
    }

    /// Exponentiation
    ///
    /// Run time may depend on the exponent.
    #[inline]
    pub fn pow(self, exponent: u64) -> Self {
        match exponent {
            0 => self.field.one(),
            1 => self,
            2 => self * self,
            3 => self * self * self,
            n if n % 2 == 0 => (self * self).pow(n / 2),
            n => self * self.pow(n - 1),
        }
    }

    /// Inversion
    ///
    /// Run time may depend on the value. Returns `None` for zero and for
    /// values sharing a factor with a non-prime modulus.
    #[inline]
    pub fn inv(self) -> Option<Self> {
        self.value
            .inv_mod(self.field.modulus)
            .map(|value| PrimeFieldElement {
                field: self.field,
                value: self.field.mont_mul(value, self.field.montgomery_r3),
            })
    }
}

macro_rules! forward_fmt {
    ($($trait:path),+) => {
        $(
            impl $trait for PrimeFieldElement<'_> {
                fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                    <Uint as $trait>::fmt(&self.to_uint(), f)
                }
            }
        )+
    };
}

forward_fmt!(
    fmt::Debug,
    fmt::Display,
    fmt::Binary,
    fmt::Octal,
    fmt::LowerHex,
    fmt::UpperHex
);

impl Add for PrimeFieldElement<'_> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        assert_eq!(self.field, other.field);
        Self {
            field: self.field,
            value: self.value.add_mod(other.value, self.field.modulus),
        }
    }
}

impl Sub for PrimeFieldElement<'_> {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        assert_eq!(self.field, other.field);
        self + (-other)
    }
}

impl Mul for PrimeFieldElement<'_> {
    type Output = Self;

    #[inline]
    fn mul(self, other: Self) -> Self {
        assert_eq!(self.field, other.field);
        Self {
            field: self.field,
            value: self.field.mont_mul(self.value, other.value),
        }
    }
}

impl Neg for PrimeFieldElement<'_> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        // Zero is its own negation; modulus - 0 would leave the field.
        if self.value == Uint::ZERO {
            self
        } else {
            Self {
                field: self.field,
                value: self.field.modulus - self.value,
            }
        }
    }
}

impl Div for PrimeFieldElement<'_> {
    type Output = Option<Self>;

    /// Division
    ///
    /// Run time may depend on the value of the divisor.
    #[inline]
    fn div(self, other: Self) -> Option<Self> {
        assert_eq!(self.field, other.field);
        other.inv().map(|inv| self * inv)
    }
}

impl AddAssign for PrimeFieldElement<'_> {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl MulAssign for PrimeFieldElement<'_> {
    #[inline]
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}
