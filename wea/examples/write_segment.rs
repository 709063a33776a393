//! Publish a column-major matrix in shared memory for other processes

use ndarray::Array2;
use std::time::Instant;
use wea::{create_shared_array, ElementType};

const SEGMENT: &str = "/wea_example_matrix";

fn main() -> wea::Result<()> {
    let (nrows, ncols) = (1_000, 500);
    println!("Creating shared segment {SEGMENT} for a {nrows} x {ncols} float64 matrix...");

    let start = Instant::now();
    let mut segment = create_shared_array(SEGMENT, ElementType::Float64, &[nrows, ncols])?;
    println!(
        "Segment of {} bytes created in {:?} (payload at offset {})",
        segment.segment_size(),
        start.elapsed(),
        segment.payload_offset()
    );

    let start = Instant::now();
    let source = Array2::from_shape_fn((nrows, ncols), |(i, j)| (i * ncols + j) as f64);
    segment.assign_from(&source)?;
    println!("Payload written in {:?}", start.elapsed());

    println!("\nRun 'cargo run --example read_segment' to read it back,");
    println!("then 'wea unlink --shm {SEGMENT}' to remove it.");

    // Detach only; the segment stays available to readers
    segment.close();
    Ok(())
}
