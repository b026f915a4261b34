//! Example: Reading data-table files from a PLC
//!
//! Run with: cargo run --example simple_read
//!
//! This example demonstrates:
//! - Connecting through a TCP serial device server
//! - Reading integers, floats, and binary words
//! - Analyzing bits of a binary word
//! - Reading timer and counter elements
//! - Link diagnostics (echo and diagnostic status)

use ab_df1::utils::{get_bit, word_to_bits};
use ab_df1::{Client, ClientConfig, CounterField, TimerField, TimerFlag};

fn main() -> ab_df1::Result<()> {
    // =========================================================================
    // Connect to PLC
    // =========================================================================

    // Station 0 talking to station 1. The address is the serial device
    // server in front of the PLC's channel 0 port.
    let config = ClientConfig::new(0x00, 0x01);
    let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), config)?;

    // =========================================================================
    // Reading Integers
    // =========================================================================

    println!("=== Reading Integers ===\n");

    // Read a single element from N7
    let values = client.read_integers(7, 0, 1)?;
    println!("N7:0 = {} (0x{:04X})", values[0], values[0]);

    // Read a block of elements
    let values = client.read_integers(7, 10, 5)?;
    println!("N7:10..15 = {values:?}");

    // =========================================================================
    // Reading Floats
    // =========================================================================

    println!("\n=== Reading Floats ===\n");

    let reals = client.read_floats(8, 0, 2)?;
    println!("F8:0 = {:.3}", reals[0]);
    println!("F8:1 = {:.3}", reals[1]);

    // =========================================================================
    // Reading Binary Words and Bits
    // =========================================================================

    println!("\n=== Reading Binary Words ===\n");

    let word = client.read_binary(3, 4, 1)?[0];
    println!("B3:4 = 0x{word:04X} (0b{word:016b})");

    // Individual bit addressing goes through the containing word
    println!("B3:4/2 = {}", get_bit(word, 2));

    // List every bit that is on
    let bits = word_to_bits(word);
    for (i, state) in bits.iter().enumerate() {
        if *state {
            println!("  bit {i} is ON");
        }
    }

    // Output and input image files read the same way
    let outputs = client.read_outputs(0, 0, 1)?;
    let inputs = client.read_inputs(1, 0, 1)?;
    println!("O0:0 = 0x{:04X}", outputs[0]);
    println!("I1:0 = 0x{:04X}", inputs[0]);

    // =========================================================================
    // Timers and Counters
    // =========================================================================

    println!("\n=== Timers and Counters ===\n");

    let elapsed = client.read_timer_field(4, 0, TimerField::Accumulator)?;
    let target = client.read_timer_field(4, 0, TimerField::Preset)?;
    println!("T4:0 at {elapsed}/{target}");

    if client.read_timer_flag(4, 0, TimerFlag::Timing)? {
        println!("T4:0 is timing");
    }
    if client.read_timer_flag(4, 0, TimerFlag::Done)? {
        println!("T4:0 is done");
    }

    let count = client.read_counter_field(5, 0, CounterField::Accumulator)?;
    println!("C5:0 has counted {count}");

    // =========================================================================
    // Link Diagnostics
    // =========================================================================

    println!("\n=== Link Diagnostics ===\n");

    // The PLC loops the payload back unchanged
    let echoed = client.echo(&[0xDE, 0xAD, 0xBE, 0xEF])?;
    println!("echo returned {echoed:02X?}");

    // Controller-specific identity and mode block
    let status = client.diagnostic_status()?;
    println!("diagnostic status: {status:02X?}");

    println!("\nRead example completed!");
    Ok(())
}
