//! Fixed-width hex persistence and message digesting.
//!
//! All integers travel as newline-separated ASCII hex, zero-padded to 64
//! characters (one 256-bit big-endian value per line). Each file format has
//! a string-level parser plus a thin path-level wrapper, so parsing stays
//! testable without touching the filesystem.

use {
    crate::{
        curve::{CurveParameters, EllipticCurve},
        ecdsa::Signature,
        field::Uint,
    },
    anyhow::{anyhow, ensure, Context, Result},
    sha2::{Digest, Sha256},
    std::{fs, io, path::Path},
};

/// Width of one hex-encoded value.
pub const HEX_WIDTH: usize = 64;

pub fn encode_uint(value: Uint) -> String {
    hex::encode(value.to_be_bytes::<32>())
}

/// Decode a hex line. Shorter input is accepted as if zero-padded;
/// surrounding whitespace is ignored.
pub fn decode_uint(line: &str) -> Result<Uint> {
    let line = line.trim();
    ensure!(!line.is_empty(), "Empty value");
    ensure!(
        line.len() <= HEX_WIDTH,
        "Value exceeds {HEX_WIDTH} hex digits"
    );
    Uint::from_str_radix(line, 16).map_err(|e| anyhow!("Invalid hex value: {e}"))
}

/// Curve parameter file: 7 lines p, a, b, Gx, Gy, n, h.
pub fn parse_curve(text: &str) -> Result<CurveParameters> {
    let mut lines = text.lines();
    let mut next = |name: &str| -> Result<Uint> {
        let line = lines
            .next()
            .with_context(|| format!("Missing {name} line"))?;
        decode_uint(line).with_context(|| format!("Bad {name} value"))
    };
    Ok(CurveParameters {
        p: next("p")?,
        a: next("a")?,
        b: next("b")?,
        gx: next("Gx")?,
        gy: next("Gy")?,
        n: next("n")?,
        h: next("h")?,
    })
}

pub fn load_curve(path: &Path) -> Result<EllipticCurve> {
    let text = read(path)?;
    EllipticCurve::from_parameters(&parse_curve(&text)?)
}

/// Private key file: a single hex scalar.
pub fn parse_private_key(text: &str) -> Result<Uint> {
    decode_uint(first_line(text)?).context("Bad private key value")
}

pub fn load_private_key(path: &Path) -> Result<Uint> {
    parse_private_key(&read(path)?)
}

pub fn save_private_key(path: &Path, private: Uint) -> Result<()> {
    write(path, format!("{}\n", encode_uint(private)))
}

/// Public key file: x on the first line, y on the second.
pub fn parse_public_key(text: &str) -> Result<(Uint, Uint)> {
    let mut lines = text.lines();
    let x = decode_uint(lines.next().context("Missing x line")?).context("Bad x value")?;
    let y = decode_uint(lines.next().context("Missing y line")?).context("Bad y value")?;
    Ok((x, y))
}

pub fn load_public_key(path: &Path) -> Result<(Uint, Uint)> {
    parse_public_key(&read(path)?)
}

pub fn save_public_key(path: &Path, (x, y): (Uint, Uint)) -> Result<()> {
    write(path, format!("{}\n{}\n", encode_uint(x), encode_uint(y)))
}

/// Signature file: r on the first line, s on the second.
pub fn parse_signature(text: &str) -> Result<Signature> {
    let mut lines = text.lines();
    let r = decode_uint(lines.next().context("Missing r line")?).context("Bad r value")?;
    let s = decode_uint(lines.next().context("Missing s line")?).context("Bad s value")?;
    Ok(Signature { r, s })
}

pub fn load_signature(path: &Path) -> Result<Signature> {
    parse_signature(&read(path)?)
}

pub fn save_signature(path: &Path, signature: &Signature) -> Result<()> {
    write(
        path,
        format!(
            "{}\n{}\n",
            encode_uint(signature.r),
            encode_uint(signature.s)
        ),
    )
}

/// SHA-256 the file contents and interpret the digest as a big-endian
/// integer. Recomputed fresh for every sign and verify flow.
pub fn digest_file(path: &Path) -> Result<Uint> {
    let mut file =
        fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Ok(Uint::from_be_bytes(hasher.finalize().into()))
}

fn first_line(text: &str) -> Result<&str> {
    text.lines().next().context("Empty file")
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot open {}", path.display()))
}

fn write(path: &Path, contents: String) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    #[test]
    fn test_hex_round_trip() {
        for value in [
            Uint::ZERO,
            Uint::from(1),
            Uint::from(0xdeadbeef_u64),
            Uint::MAX,
            Uint::from_be_bytes(hex!(
                "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"
            )),
        ] {
            let encoded = encode_uint(value);
            assert_eq!(encoded.len(), HEX_WIDTH);
            assert_eq!(decode_uint(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_short_and_padded() {
        assert_eq!(decode_uint("ff").unwrap(), Uint::from(255));
        assert_eq!(decode_uint(" 0a \n").unwrap(), Uint::from(10));
        assert_eq!(decode_uint(&"0".repeat(64)).unwrap(), Uint::ZERO);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_uint("").is_err());
        assert!(decode_uint("  ").is_err());
        assert!(decode_uint("xyz").is_err());
        assert!(decode_uint(&"f".repeat(65)).is_err());
    }

    #[test]
    fn test_parse_curve_file() {
        let params = parse_curve(include_str!("../testdata/nistp256.curve")).unwrap();
        assert_eq!(
            params.p,
            Uint::from_be_bytes(hex!(
                "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"
            ))
        );
        assert_eq!(
            params.n,
            Uint::from_be_bytes(hex!(
                "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"
            ))
        );
        assert_eq!(params.h, Uint::from(1));
        assert!(EllipticCurve::from_parameters(&params).is_ok());
    }

    #[test]
    fn test_parse_curve_missing_line() {
        assert!(parse_curve("ff\n01\n01\n").is_err());
    }

    #[test]
    fn test_parse_key_and_signature() {
        let (x, y) = parse_public_key("05\n04\n").unwrap();
        assert_eq!((x, y), (Uint::from(5), Uint::from(4)));
        let signature = parse_signature("0a\n0b\n").unwrap();
        assert_eq!(signature.r, Uint::from(10));
        assert_eq!(signature.s, Uint::from(11));
        assert_eq!(parse_private_key("2a\n").unwrap(), Uint::from(42));
        assert!(parse_public_key("05\n").is_err());
        assert!(parse_signature("").is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join("ecdsa-tool-test-signature");
        let signature = Signature {
            r: Uint::from(12345),
            s: Uint::from(67890),
        };
        save_signature(&path, &signature).unwrap();
        assert_eq!(load_signature(&path).unwrap(), signature);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_digest_file() {
        let path = std::env::temp_dir().join("ecdsa-tool-test-digest");
        fs::write(&path, "abc").unwrap();
        // SHA-256("abc")
        let expected = Uint::from_be_bytes(hex!(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ));
        assert_eq!(digest_file(&path).unwrap(), expected);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_digest_missing_file() {
        assert!(digest_file(Path::new("/no/such/file")).is_err());
    }
}
