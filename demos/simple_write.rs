//! Example: Writing data-table files on a PLC
//!
//! Run with: cargo run --example simple_write
//!
//! This example demonstrates:
//! - Writing integers and floats
//! - Writing whole binary words
//! - Masked single-bit writes
//! - Verifying a write by reading back

use ab_df1::{Client, ClientConfig};

fn main() -> ab_df1::Result<()> {
    // =========================================================================
    // Connect to PLC
    // =========================================================================

    let config = ClientConfig::new(0x00, 0x01);
    let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), config)?;

    // =========================================================================
    // Writing Integers
    // =========================================================================

    println!("=== Writing Integers ===\n");

    // Write a single element
    client.write_integers(7, 0, &[1234])?;
    println!("Wrote 1234 to N7:0");

    // Write a block of elements
    client.write_integers(7, 10, &[100, 200, 300, 400, 500])?;
    println!("Wrote [100, 200, 300, 400, 500] to N7:10..15");

    // Negative values are ordinary two's-complement words on the wire
    client.write_integers(7, 20, &[-1, -32768])?;
    println!("Wrote [-1, -32768] to N7:20..22");

    // Read back to verify
    let readback = client.read_integers(7, 10, 5)?;
    println!("Read back N7:10..15 = {readback:?}");

    // =========================================================================
    // Writing Floats
    // =========================================================================

    println!("\n=== Writing Floats ===\n");

    client.write_floats(8, 0, &[1.5, -2.25, 3.14159])?;
    println!("Wrote three floats to F8:0..3");

    // =========================================================================
    // Writing Binary Words
    // =========================================================================

    println!("\n=== Writing Binary Words ===\n");

    // Whole-word writes replace all 16 bits
    client.write_binary(3, 0, &[0b1010_1010_0000_1111])?;
    println!("Wrote 0xAA0F to B3:0");

    // Output image words work the same way
    client.write_outputs(0, 0, &[0x00FF])?;
    println!("Wrote 0x00FF to O0:0");

    // =========================================================================
    // Masked Bit Writes
    // =========================================================================

    println!("\n=== Masked Bit Writes ===\n");

    // Single-bit writes run as masked writes on the PLC, so the other
    // fifteen bits of the word are never disturbed.
    client.write_bit(3, 4, 2, true)?;
    println!("Set B3:4/2 to ON");

    client.write_bit(3, 4, 2, false)?;
    println!("Set B3:4/2 to OFF");

    let word = client.read_binary(3, 4, 1)?[0];
    println!("B3:4 is now 0x{word:04X}");

    println!("\nWrite example completed!");
    Ok(())
}
