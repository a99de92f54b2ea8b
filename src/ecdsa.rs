use {
    crate::{
        curve::{EllipticCurve, EllipticCurvePoint},
        field::Uint,
    },
    anyhow::{bail, Result},
    rand::{CryptoRng, RngCore},
};

/// An ECDSA signature; r and s are expected in [1, n-1].
///
/// Note that [`verify`] enforces the stricter lower bound 2 (see there).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    pub r: Uint,
    pub s: Uint,
}

/// A private scalar together with its derived public point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeyPair<'a> {
    pub private: Uint,
    pub public: EllipticCurvePoint<'a>,
}

impl<'a> KeyPair<'a> {
    pub fn from_private(curve: &'a EllipticCurve, private: Uint) -> Self {
        Self {
            private,
            public: derive_public_key(curve, private),
        }
    }
}

/// Derive the public point d * G from a private scalar.
///
/// The scalar is reduced mod n and otherwise unchecked: d = 0 (mod n)
/// silently yields the point at infinity as public key. Rejecting such
/// scalars is left to the caller.
pub fn derive_public_key(curve: &EllipticCurve, private: Uint) -> EllipticCurvePoint {
    curve.generator() * (private % curve.scalar_field().modulus())
}

/// Give up on signing after this many degenerate nonces. For an honest rng
/// the retry branch is never taken; the cap only guards against a broken
/// random source spinning forever.
const MAX_NONCE_ATTEMPTS: usize = 100;

/// ECDSA signature generation (SEC 1 section 4.1.3).
///
/// The digest is the message hash interpreted as an integer, reduced mod n.
/// A fresh nonce k in [2, n-1] is drawn per attempt; attempts where r = 0 or
/// s = 0 are discarded and retried with a new nonce.
pub fn sign(
    curve: &EllipticCurve,
    mut rng: impl CryptoRng + RngCore,
    private: Uint,
    digest: Uint,
) -> Result<Signature> {
    let field = curve.scalar_field();
    let n = field.modulus();
    let d = field.el_reduce(private);
    let m = field.el_reduce(digest);

    for _ in 0..MAX_NONCE_ATTEMPTS {
        // k = random(256 bits) mod (n - 2) + 2, covering [2, n-1].
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let k = Uint::from_be_bytes(bytes) % (n - Uint::from(2)) + Uint::from(2);

        // r = (k * G).x mod n
        let q = curve.generator() * k;
        let x1 = match q.x() {
            Some(x1) => x1,
            None => continue,
        };
        let r = x1.to_uint() % n;
        if r == Uint::ZERO {
            continue;
        }

        // s = k^-1 * (m + d * r) mod n
        let k_inv = match field.el_reduce(k).inv() {
            Some(k_inv) => k_inv,
            None => continue,
        };
        let s = k_inv * (m + d * field.el_from_uint(r));
        if s.is_zero() {
            continue;
        }

        return Ok(Signature { r, s: s.to_uint() });
    }
    bail!("No usable nonce after {MAX_NONCE_ATTEMPTS} attempts; broken random source?")
}

/// ECDSA signature verification (SEC 1 section 4.1.4).
///
/// Deviation from the standard: r and s are required in [2, n) rather than
/// [1, n-1]. The lower bound of 2 is deliberate and pinned by tests;
/// signatures with r = 1 or s = 1 (which no honest signer produces on a
/// real curve) are rejected.
pub fn verify(public: EllipticCurvePoint, digest: Uint, signature: &Signature) -> bool {
    let curve = public.curve();
    let field = curve.scalar_field();
    let n = field.modulus();

    let two = Uint::from(2);
    if signature.r < two || signature.r >= n || signature.s < two || signature.s >= n {
        return false;
    }

    // w = s^-1 mod n; only fails when n is not prime.
    let w = match field.el_from_uint(signature.s).inv() {
        Some(w) => w,
        None => return false,
    };
    let u1 = field.el_reduce(digest) * w;
    let u2 = field.el_from_uint(signature.r) * w;

    // X = u1 * G + u2 * Q
    let x = curve.generator() * u1.to_uint() + public * u2.to_uint();
    match x.x() {
        Some(x1) => x1.to_uint() % n == signature.r,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::curve::CurveParameters,
        hex_literal::hex,
        rand::{thread_rng, Rng},
    };

    fn u(bytes: [u8; 32]) -> Uint {
        Uint::from_be_bytes(bytes)
    }

    // NIST P-256 (secp256r1) domain parameters.
    fn p256() -> EllipticCurve {
        EllipticCurve::from_parameters(&CurveParameters {
            p: u(hex!(
                "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"
            )),
            a: u(hex!(
                "ffffffff00000001000000000000000000000000fffffffffffffffffffffffc"
            )),
            b: u(hex!(
                "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"
            )),
            gx: u(hex!(
                "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"
            )),
            gy: u(hex!(
                "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"
            )),
            n: u(hex!(
                "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"
            )),
            h: Uint::from(1),
        })
        .unwrap()
    }

    fn random_scalar(curve: &EllipticCurve) -> Uint {
        let mut rng = thread_rng();
        loop {
            let d = u(rng.gen::<[u8; 32]>()) % curve.scalar_field().modulus();
            if d != Uint::ZERO {
                return d;
            }
        }
    }

    #[test]
    fn test_p256_generator() {
        let curve = p256();
        let g = curve.generator();
        assert!(curve.is_on_curve(&g));
        // The order annihilates the generator.
        assert_eq!(g * curve.scalar_field().modulus(), curve.pt_infinity());
    }

    #[test]
    fn test_derive_public_key_trivial_scalars() {
        let curve = p256();
        assert_eq!(derive_public_key(&curve, Uint::from(1)), curve.generator());
        // d = 0 (mod n) reduces to the identity point; documented gap.
        assert!(derive_public_key(&curve, Uint::ZERO).is_infinity());
        assert!(derive_public_key(&curve, curve.scalar_field().modulus()).is_infinity());
    }

    /// Independently computed vector: d * G, SHA-256("sample") and the
    /// signature for a fixed nonce.
    #[test]
    fn test_known_answer_verify() {
        let curve = p256();
        let public = curve.pt_from_affine(
            u(hex!(
                "60fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb6"
            )),
            u(hex!(
                "7903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299"
            )),
        );
        assert!(curve.is_on_curve(&public));
        let digest = u(hex!(
            "af2bdbe1aa9b6ec1e2ade1d694f41fc71a831d0268e9891562113d8a62add1bf"
        ));
        let signature = Signature {
            r: u(hex!(
                "2b42f576d07f4165ff65d1f3b1500f81e44c316f1f0b3ef57325b69aca46104f"
            )),
            s: u(hex!(
                "63f1f981ac18efe01c1b36a449d4aa9f1d3c230c95c3631a5337075098d97b31"
            )),
        };
        assert!(verify(public, digest, &signature));
        assert!(!verify(public, digest + Uint::from(1), &signature));
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let curve = p256();
        let mut rng = thread_rng();
        for _ in 0..100 {
            let keypair = KeyPair::from_private(&curve, random_scalar(&curve));
            let digest = u(rng.gen::<[u8; 32]>());
            let signature = sign(&curve, &mut rng, keypair.private, digest).unwrap();
            assert!(verify(keypair.public, digest, &signature));
        }
    }

    #[test]
    fn test_tampering_falsifies() {
        let curve = p256();
        let mut rng = thread_rng();
        let keypair = KeyPair::from_private(&curve, random_scalar(&curve));
        let digest = u(rng.gen::<[u8; 32]>());
        let signature = sign(&curve, &mut rng, keypair.private, digest).unwrap();
        assert!(verify(keypair.public, digest, &signature));

        for bit in [0usize, 13, 128, 255] {
            let flip = Uint::from(1) << bit;
            let bad_r = Signature {
                r: signature.r ^ flip,
                s: signature.s,
            };
            let bad_s = Signature {
                r: signature.r,
                s: signature.s ^ flip,
            };
            assert!(!verify(keypair.public, digest, &bad_r));
            assert!(!verify(keypair.public, digest, &bad_s));
            assert!(!verify(keypair.public, digest ^ flip, &signature));
        }
    }

    #[test]
    fn test_fresh_nonce_per_signature() {
        let curve = p256();
        let mut rng = thread_rng();
        let keypair = KeyPair::from_private(&curve, random_scalar(&curve));
        let digest = u(rng.gen::<[u8; 32]>());
        let first = sign(&curve, &mut rng, keypair.private, digest).unwrap();
        let second = sign(&curve, &mut rng, keypair.private, digest).unwrap();
        assert_ne!(first, second);
        assert!(verify(keypair.public, digest, &first));
        assert!(verify(keypair.public, digest, &second));
    }

    #[test]
    fn test_verify_rejects_out_of_range_components() {
        let curve = p256();
        let n = curve.scalar_field().modulus();
        let mut rng = thread_rng();
        let keypair = KeyPair::from_private(&curve, random_scalar(&curve));
        let digest = u(rng.gen::<[u8; 32]>());
        let good = sign(&curve, &mut rng, keypair.private, digest).unwrap();

        // r = 1 and s = 1 are rejected as well: the lower bound is 2.
        for bad in [Uint::ZERO, Uint::from(1), n, n + Uint::from(1)] {
            assert!(!verify(keypair.public, digest, &Signature { r: bad, s: good.s }));
            assert!(!verify(keypair.public, digest, &Signature { r: good.r, s: bad }));
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let curve = p256();
        let mut rng = thread_rng();
        let signer = KeyPair::from_private(&curve, random_scalar(&curve));
        let other = KeyPair::from_private(&curve, random_scalar(&curve));
        let digest = u(rng.gen::<[u8; 32]>());
        let signature = sign(&curve, &mut rng, signer.private, digest).unwrap();
        assert!(!verify(other.public, digest, &signature));
    }
}
