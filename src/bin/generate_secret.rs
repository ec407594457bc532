//! Generate a token signing secret
//!
//! Usage:
//!   cargo run --bin generate_secret
//!
//! Prints 32 random bytes from the OS CSPRNG, hex-encoded, ready for
//! `DID_AUTH_TOKEN_SECRET`.

use rand::RngCore;
use rand::rngs::OsRng;

fn main() {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    let secret = hex::encode(secret);

    println!("{}", secret);
    eprintln!("Set it in the environment of the gateway:");
    eprintln!("  export DID_AUTH_TOKEN_SECRET={}", secret);
}
