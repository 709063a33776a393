//! Attach to the segment published by `write_segment` and read it

use std::time::Instant;
use wea::{attach_shared_array, shared_array_exists, Error};

const SEGMENT: &str = "/wea_example_matrix";

fn main() -> wea::Result<()> {
    if !shared_array_exists(SEGMENT) {
        println!("Segment '{SEGMENT}' not found!");
        println!("   Run 'cargo run --example write_segment' first");
        return Ok(());
    }

    let start = Instant::now();
    let segment = match attach_shared_array(SEGMENT) {
        Ok(segment) => segment,
        Err(Error::NotFound(name)) => {
            println!("Segment '{name}' was removed before it could be attached");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    println!(
        "Attached in {:.3}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    println!("\nSegment Information:");
    println!("   Element type: {}", segment.element_type());
    println!("   Shape: {:?}", segment.shape());
    println!("   Elements: {}", segment.len());
    println!("   Payload offset: {}", segment.payload_offset());

    let view = segment.view::<f64>()?;
    let start = Instant::now();
    let sum: f64 = view.sum();
    println!("\nSum of all elements: {sum} ({:?})", start.elapsed());
    if let Some(last) = view.iter().last() {
        println!("Last element: {last}");
    }

    segment.close();
    Ok(())
}
