#![allow(dead_code)]

mod curve;
mod ecdsa;
mod field;
mod files;

use {
    crate::{
        curve::{EllipticCurve, EllipticCurvePoint},
        ecdsa::KeyPair,
        files::encode_uint,
    },
    anyhow::Result,
    std::{
        io::{self, Write},
        path::Path,
    },
};

fn main() -> Result<()> {
    loop {
        println!();
        println!("1. Generate keys");
        println!("2. Sign a message");
        println!("3. Verify a signature");
        println!("4. Quit");
        let choice = prompt("Choice: ")?;
        let result = match choice.as_str() {
            "1" => generate_keys(),
            "2" => sign_message(),
            "3" => verify_signature(),
            "4" => return Ok(()),
            _ => {
                eprintln!("Unknown choice");
                continue;
            }
        };
        // A failed flow returns to the menu instead of aborting.
        if let Err(e) = result {
            eprintln!("Error: {e:#}");
        }
    }
}

fn generate_keys() -> Result<()> {
    let curve = retry_path("Curve parameter file: ", files::load_curve)?;
    print_curve(&curve);

    let private = retry("Private key (hex): ", files::decode_uint)?;
    let keypair = KeyPair::from_private(&curve, private);
    println!("Private key = {}", encode_uint(keypair.private));
    println!("Public key:");
    print_point(&keypair.public);
    if keypair.public.is_infinity() {
        eprintln!("Warning: private key is zero mod n; the public key is the identity point");
    }

    let path = prompt("Save private key to: ")?;
    files::save_private_key(Path::new(&path), keypair.private)?;
    let path = prompt("Save public key to: ")?;
    let (x, y) = match (keypair.public.x(), keypair.public.y()) {
        (Some(x), Some(y)) => (x.to_uint(), y.to_uint()),
        _ => Default::default(),
    };
    files::save_public_key(Path::new(&path), (x, y))
}

fn sign_message() -> Result<()> {
    let curve = retry_path("Curve parameter file: ", files::load_curve)?;
    print_curve(&curve);

    let private = retry_path("Private key file: ", files::load_private_key)?;
    println!("Private key = {}", encode_uint(private));

    let digest = retry_path("Message file: ", files::digest_file)?;
    println!("Message digest = {}", encode_uint(digest));

    let signature = ecdsa::sign(&curve, rand::thread_rng(), private, digest)?;
    println!("Signature:");
    println!("r = {}", encode_uint(signature.r));
    println!("s = {}", encode_uint(signature.s));

    let path = prompt("Save signature to: ")?;
    files::save_signature(Path::new(&path), &signature)
}

fn verify_signature() -> Result<()> {
    let curve = retry_path("Curve parameter file: ", files::load_curve)?;
    print_curve(&curve);

    let (x, y) = retry_path("Public key file: ", files::load_public_key)?;
    let public = curve.pt_from_affine(x, y);
    println!("Public key:");
    print_point(&public);

    let signature = retry_path("Signature file: ", files::load_signature)?;
    println!("r = {}", encode_uint(signature.r));
    println!("s = {}", encode_uint(signature.s));

    let digest = retry_path("Message file: ", files::digest_file)?;
    println!("Message digest = {}", encode_uint(digest));

    if ecdsa::verify(public, digest, &signature) {
        println!("Signature is valid");
    } else {
        println!("Signature is INVALID");
    }
    Ok(())
}

fn print_curve(curve: &EllipticCurve) {
    println!("p = {}", encode_uint(curve.base_field().modulus()));
    println!("a = {}", encode_uint(curve.a().to_uint()));
    println!("b = {}", encode_uint(curve.b().to_uint()));
    println!("Generator:");
    print_point(&curve.generator());
    println!("n = {}", encode_uint(curve.scalar_field().modulus()));
    println!("h = {}", encode_uint(curve.cofactor()));
}

fn print_point(point: &EllipticCurvePoint) {
    match (point.x(), point.y()) {
        (Some(x), Some(y)) => {
            println!("x = {}", encode_uint(x.to_uint()));
            println!("y = {}", encode_uint(y.to_uint()));
        }
        _ => println!("Point at infinity"),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Keep prompting until the input parses.
fn retry<T>(label: &str, f: impl Fn(&str) -> Result<T>) -> Result<T> {
    loop {
        let input = prompt(label)?;
        match f(&input) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }
}

/// Keep prompting until the file at the given path loads.
fn retry_path<T>(label: &str, f: impl Fn(&Path) -> Result<T>) -> Result<T> {
    retry(label, |input| f(Path::new(input)))
}
